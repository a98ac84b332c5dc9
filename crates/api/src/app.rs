use std::time::Duration;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    middleware::from_fn_with_state,
    response::{Html, IntoResponse},
    routing::get,
    Extension, Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::gql::AppSchema;
use crate::middleware::{jwt_middleware, Identity};
use crate::state::AppState;

/// Build the axum router: liveness probe plus the GraphQL endpoint, with
/// bearer tokens resolved into the request before the schema runs.
pub fn build_router(state: AppState, schema: AppSchema) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/graphql", get(graphiql).post(graphql_handler))
        .layer(Extension(schema))
        .layer(from_fn_with_state(state.clone(), jwt_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
}

async fn graphql_handler(
    Extension(schema): Extension<AppSchema>,
    Extension(identity): Extension<Identity>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(claims) = identity.0 {
        request = request.data(claims);
    }
    schema.execute(request).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Liveness + quick DB probe.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    infra::db::ping(&state.db).await?;
    Ok("ok")
}
