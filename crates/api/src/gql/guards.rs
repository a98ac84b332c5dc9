use async_graphql::{Context, Result, ID};
use uuid::Uuid;

use infra::models::UserRow;
use infra::repos::{MembershipRepo, UserRepo};
use infra::Role;

use crate::auth::Claims;
use crate::error::{gql, AppError};
use crate::state::AppState;

/// Parse a client-supplied ID into a Uuid, rejecting malformed input as a
/// validation error rather than a server fault.
pub fn parse_id(id: &ID) -> Result<Uuid> {
    Uuid::parse_str(id.as_str())
        .map_err(|_| gql(AppError::validation("id", "malformed id")))
}

/// The verified JWT claims for this request, or an UNAUTHENTICATED error.
pub fn claims<'a>(ctx: &'a Context<'a>) -> Result<&'a Claims> {
    ctx.data::<Claims>().map_err(|_| gql(AppError::Unauthorized))
}

/// The authenticated user's id without touching the database.
pub fn current_user_id(ctx: &Context<'_>) -> Result<Uuid> {
    claims(ctx)?.user_id().map_err(gql)
}

/// Load the authenticated user's row; a token for a vanished user reads
/// as unauthenticated.
pub async fn current_user(ctx: &Context<'_>) -> Result<UserRow> {
    let user_id = current_user_id(ctx)?;
    let state = ctx.data::<AppState>()?;
    let user = UserRepo::new(state.db.clone())
        .get_by_id(user_id)
        .await
        .map_err(gql)?;
    user.ok_or_else(|| gql(AppError::Unauthorized))
}

/// Require the authenticated user to hold at least `required` rank in the
/// club; returns the caller's id and actual role.
pub async fn require_club_role(
    ctx: &Context<'_>,
    club_id: Uuid,
    required: Role,
) -> Result<(Uuid, Role)> {
    let user_id = current_user_id(ctx)?;
    let state = ctx.data::<AppState>()?;
    let role = MembershipRepo::new(state.db.clone())
        .role_of(user_id, club_id)
        .await
        .map_err(gql)?;

    match role {
        Some(role) if role.at_least(required) => Ok((user_id, role)),
        Some(_) | None => Err(gql(AppError::Forbidden(format!(
            "requires {} rank in this club",
            required.label()
        )))),
    }
}
