use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

/// The caller's verified identity, if any. Inserted into every request so
/// the GraphQL handler can feed claims into the resolver context;
/// unauthenticated requests proceed and fail only at resolvers that
/// require a user.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<Claims>);

/// Extracts and validates a Bearer token from the Authorization header.
/// Invalid or missing tokens leave the request anonymous rather than
/// rejecting it outright.
pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .and_then(|token| state.jwt_service().verify_token(token).ok());

    request.extensions_mut().insert(Identity(claims));

    Ok(next.run(request).await)
}
