use async_graphql::{Context, Object, Result, ID};
use chrono::{DateTime, Utc};

use infra::pagination::LimitOffset;
use infra::repos::{ApplicationRepo, ClubRepo, MembershipRepo, TournamentRepo, UserRepo};
use infra::Role;

use crate::error::gql;
use crate::gql::guards::{self, parse_id};
use crate::gql::types::{Application, Club, MemberRole, Membership, Tournament, User};
use crate::state::AppState;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Current server time (UTC).
    async fn server_time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// The authenticated user's own profile.
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let user = guards::current_user(ctx).await?;
        Ok(user.into())
    }

    /// A single user; unknown ids read as null so listings can fall back
    /// gracefully.
    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<User>> {
        guards::claims(ctx)?;
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&id)?;
        let row = UserRepo::new(state.db.clone())
            .get_by_id(user_id)
            .await
            .map_err(gql)?;
        Ok(row.map(User::from))
    }

    async fn users(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>> {
        guards::claims(ctx)?;
        let state = ctx.data::<AppState>()?;
        let rows = UserRepo::new(state.db.clone())
            .list(search, LimitOffset::clamped(limit, offset))
            .await
            .map_err(gql)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn clubs(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Club>> {
        let state = ctx.data::<AppState>()?;
        let rows = ClubRepo::new(state.db.clone())
            .list(LimitOffset::clamped(limit, offset))
            .await
            .map_err(gql)?;
        Ok(rows.into_iter().map(Club::from).collect())
    }

    async fn club(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Club>> {
        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&id)?;
        let row = ClubRepo::new(state.db.clone())
            .get(club_id)
            .await
            .map_err(gql)?;
        Ok(row.map(Club::from))
    }

    /// The caller's memberships, optionally narrowed to one role.
    async fn my_clubs(&self, ctx: &Context<'_>, role: Option<MemberRole>) -> Result<Vec<Membership>> {
        let user_id = guards::current_user_id(ctx)?;
        let state = ctx.data::<AppState>()?;
        let rows = MembershipRepo::new(state.db.clone())
            .for_user(user_id, role.map(Role::from))
            .await
            .map_err(gql)?;
        Ok(rows.into_iter().filter_map(Membership::try_from_row).collect())
    }

    /// A club's roster, strongest rank first. Restricted to the club's own
    /// members.
    async fn club_members(&self, ctx: &Context<'_>, club_id: ID) -> Result<Vec<Membership>> {
        let club_id = parse_id(&club_id)?;
        guards::require_club_role(ctx, club_id, Role::Member).await?;
        let state = ctx.data::<AppState>()?;
        let rows = MembershipRepo::new(state.db.clone())
            .for_club(club_id)
            .await
            .map_err(gql)?;
        Ok(rows.into_iter().filter_map(Membership::try_from_row).collect())
    }

    /// The caller's applications across all clubs, newest first.
    async fn my_applications(&self, ctx: &Context<'_>) -> Result<Vec<Application>> {
        let user_id = guards::current_user_id(ctx)?;
        let state = ctx.data::<AppState>()?;
        let rows = ApplicationRepo::new(state.db.clone())
            .for_user(user_id)
            .await
            .map_err(gql)?;
        Ok(rows.into_iter().map(Application::from).collect())
    }

    /// Pending applications to a club, newest first. Officers and the
    /// owner only.
    async fn pending_applications(&self, ctx: &Context<'_>, club_id: ID) -> Result<Vec<Application>> {
        let club_id = parse_id(&club_id)?;
        guards::require_club_role(ctx, club_id, Role::Officer).await?;
        let state = ctx.data::<AppState>()?;
        let rows = ApplicationRepo::new(state.db.clone())
            .pending_for_club(club_id)
            .await
            .map_err(gql)?;
        Ok(rows.into_iter().map(Application::from).collect())
    }

    /// Tournaments visible to the caller: those of one club (members
    /// only), or of every club the caller belongs to.
    async fn tournaments(
        &self,
        ctx: &Context<'_>,
        club_id: Option<ID>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Tournament>> {
        let state = ctx.data::<AppState>()?;
        let repo = TournamentRepo::new(state.db.clone());
        let page = LimitOffset::clamped(limit, offset);

        let rows = match club_id {
            Some(club_id) => {
                let club_id = parse_id(&club_id)?;
                guards::require_club_role(ctx, club_id, Role::Member).await?;
                repo.list_for_club(club_id, page).await.map_err(gql)?
            }
            None => {
                let user_id = guards::current_user_id(ctx)?;
                repo.list_for_user(user_id, page).await.map_err(gql)?
            }
        };
        Ok(rows.into_iter().map(Tournament::from).collect())
    }

    async fn tournament(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Tournament>> {
        guards::claims(ctx)?;
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&id)?;
        let row = TournamentRepo::new(state.db.clone())
            .get(tournament_id)
            .await
            .map_err(gql)?;
        Ok(row.map(Tournament::from))
    }
}
