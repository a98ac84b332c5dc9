//! Tournament creation rules and roster management against a live
//! database.

mod common;

use async_graphql::Variables;
use chrono::{Duration, Utc};
use common::*;
use serde_json::json;
use uuid::Uuid;

use api::auth::Claims;
use api::gql::{build_schema, AppSchema};

fn tomorrow() -> String {
    (Utc::now() + Duration::days(1)).date_naive().to_string()
}

async fn create_tournament(
    schema: &AppSchema,
    claims: Claims,
    club_id: Uuid,
    name: &str,
    capacity: i32,
) -> async_graphql::Response {
    let query = r#"
        mutation CreateTournament($input: CreateTournamentInput!) {
            createTournament(input: $input) {
                id
                name
                capacity
                deadline
                contestantCount
            }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "clubId": club_id.to_string(),
            "name": name,
            "description": "Open rapid play",
            "deadline": tomorrow(),
            "capacity": capacity
        }
    }));
    execute_graphql(schema, query, Some(variables), Some(claims)).await
}

async fn enter(
    schema: &AppSchema,
    claims: Claims,
    tournament_id: &str,
) -> async_graphql::Response {
    let query = r#"
        mutation Enter($tournamentId: ID!) {
            enterTournament(tournamentId: $tournamentId) {
                entered
                entry { id }
            }
        }
    "#;
    let variables = Variables::from_json(json!({ "tournamentId": tournament_id }));
    execute_graphql(schema, query, Some(variables), Some(claims)).await
}

async fn withdraw(
    schema: &AppSchema,
    claims: Claims,
    tournament_id: &str,
) -> async_graphql::Response {
    let query = r#"
        mutation Withdraw($tournamentId: ID!) {
            withdrawTournament(tournamentId: $tournamentId)
        }
    "#;
    let variables = Variables::from_json(json!({ "tournamentId": tournament_id }));
    execute_graphql(schema, query, Some(variables), Some(claims)).await
}

#[tokio::test]
async fn owners_and_officers_schedule_tournaments() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (owner, owner_claims) = create_test_user(&state, "arbiter").await;
    let club_id = create_test_club(&state, owner.id, "open").await;

    let name = format!("Spring Open {}", unique_suffix());
    let response = create_tournament(&schema, owner_claims, club_id, &name, 8).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    assert_eq!(data["createTournament"]["name"], name);
    assert_eq!(data["createTournament"]["capacity"], 8);
    assert_eq!(data["createTournament"]["contestantCount"], 0);
}

#[tokio::test]
async fn outsiders_may_not_schedule_tournaments() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (owner, _) = create_test_user(&state, "landlord").await;
    let (_, outsider_claims) = create_test_user(&state, "walkin").await;
    let club_id = create_test_club(&state, owner.id, "closed").await;

    let name = format!("Uninvited Open {}", unique_suffix());
    let response = create_tournament(&schema, outsider_claims, club_id, &name, 8).await;
    assert_eq!(error_code(&response).as_deref(), Some("FORBIDDEN"));
}

#[tokio::test]
async fn tournament_names_are_globally_unique() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (owner_one, claims_one) = create_test_user(&state, "org1").await;
    let (owner_two, claims_two) = create_test_user(&state, "org2").await;
    let club_one = create_test_club(&state, owner_one.id, "first").await;
    let club_two = create_test_club(&state, owner_two.id, "second").await;

    let name = format!("Winter Classic {}", unique_suffix());
    let response = create_tournament(&schema, claims_one, club_one, &name, 8).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    // Same name in a different club still collides.
    let response = create_tournament(&schema, claims_two, club_two, &name, 8).await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION"));
    assert_eq!(error_field(&response).as_deref(), Some("name"));
}

#[tokio::test]
async fn entering_twice_keeps_a_single_entry() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (owner, owner_claims) = create_test_user(&state, "runner").await;
    let club_id = create_test_club(&state, owner.id, "entry").await;
    let name = format!("Idempotent Open {}", unique_suffix());
    let response = create_tournament(&schema, owner_claims.clone(), club_id, &name, 8).await;
    let data = response.data.into_json().unwrap();
    let tournament_id = data["createTournament"]["id"].as_str().unwrap().to_string();

    let response = enter(&schema, owner_claims.clone(), &tournament_id).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["enterTournament"]["entered"], true);
    let first_entry_id = data["enterTournament"]["entry"]["id"].clone();

    let response = enter(&schema, owner_claims.clone(), &tournament_id).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["enterTournament"]["entered"], false);
    assert_eq!(data["enterTournament"]["entry"]["id"], first_entry_id);

    let count = infra::repos::TournamentRepo::new(state.db.clone())
        .contestant_count(tournament_id.parse().unwrap())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn full_tournaments_refuse_further_entries() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (owner, owner_claims) = create_test_user(&state, "doorman").await;
    let (_, second_claims) = create_test_user(&state, "second").await;
    let (_, third_claims) = create_test_user(&state, "third").await;
    let club_id = create_test_club(&state, owner.id, "full").await;

    let name = format!("Tiny Open {}", unique_suffix());
    let response = create_tournament(&schema, owner_claims.clone(), club_id, &name, 2).await;
    let data = response.data.into_json().unwrap();
    let tournament_id = data["createTournament"]["id"].as_str().unwrap().to_string();

    for claims in [owner_claims, second_claims] {
        let response = enter(&schema, claims, &tournament_id).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
    }

    let response = enter(&schema, third_claims, &tournament_id).await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION"));
    assert_eq!(error_field(&response).as_deref(), Some("capacity"));
}

#[tokio::test]
async fn withdrawing_without_an_entry_is_not_found() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (owner, owner_claims) = create_test_user(&state, "quitter").await;
    let club_id = create_test_club(&state, owner.id, "leave").await;
    let name = format!("Departure Open {}", unique_suffix());
    let response = create_tournament(&schema, owner_claims.clone(), club_id, &name, 8).await;
    let data = response.data.into_json().unwrap();
    let tournament_id = data["createTournament"]["id"].as_str().unwrap().to_string();

    let response = enter(&schema, owner_claims.clone(), &tournament_id).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let response = withdraw(&schema, owner_claims.clone(), &tournament_id).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["withdrawTournament"], true);

    let response = withdraw(&schema, owner_claims, &tournament_id).await;
    assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
}
