use async_graphql::dataloader::DataLoader;
use async_graphql::{EmptySubscription, Schema};

use super::loaders::{ClubLoader, UserLoader};
use super::{MutationRoot, QueryRoot};
use crate::state::AppState;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema and inject shared state (AppState) into the
/// context.
pub fn build_schema(state: AppState) -> AppSchema {
    let club_loader = DataLoader::new(ClubLoader::new(state.db.clone()), tokio::spawn);
    let user_loader = DataLoader::new(UserLoader::new(state.db.clone()), tokio::spawn);

    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state) // AppState is Clone; available in resolvers via ctx.data::<AppState>()
        .data(club_loader)
        .data(user_loader)
        .finish()
}
