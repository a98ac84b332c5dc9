//! The application workflow: submit, list pending, resolve, and the
//! accept-creates-exactly-one-membership guarantee.

mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;
use uuid::Uuid;

use api::auth::Claims;
use api::gql::{build_schema, AppSchema};
use api::AppState;
use infra::repos::MembershipRepo;
use infra::Role;

async fn apply(
    schema: &AppSchema,
    claims: Claims,
    club_id: Uuid,
    statement: &str,
) -> async_graphql::Response {
    let query = r#"
        mutation Apply($input: ApplyToClubInput!) {
            applyToClub(input: $input) {
                id
                status
                statement
            }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": { "clubId": club_id.to_string(), "statement": statement }
    }));
    execute_graphql(schema, query, Some(variables), Some(claims)).await
}

async fn resolve(
    schema: &AppSchema,
    claims: Claims,
    application_id: &str,
    accept: bool,
) -> async_graphql::Response {
    let query = r#"
        mutation Resolve($applicationId: ID!, $accept: Boolean!) {
            resolveApplication(applicationId: $applicationId, accept: $accept) {
                id
                status
            }
        }
    "#;
    let variables = Variables::from_json(json!({
        "applicationId": application_id,
        "accept": accept
    }));
    execute_graphql(schema, query, Some(variables), Some(claims)).await
}

async fn membership_count(state: &AppState, user_id: Uuid, club_id: Uuid) -> usize {
    MembershipRepo::new(state.db.clone())
        .get(user_id, club_id)
        .await
        .unwrap()
        .into_iter()
        .count()
}

#[tokio::test]
async fn accepting_an_application_creates_one_membership() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (owner, owner_claims) = create_test_user(&state, "chair").await;
    let (applicant, applicant_claims) = create_test_user(&state, "hopeful").await;
    let club_id = create_test_club(&state, owner.id, "apps").await;

    let response = apply(&schema, applicant_claims, club_id, "Hello").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["applyToClub"]["status"], "PENDING");
    let application_id = data["applyToClub"]["id"].as_str().unwrap().to_string();

    let response = resolve(&schema, owner_claims.clone(), &application_id, true).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["resolveApplication"]["status"], "ACCEPTED");

    let membership = MembershipRepo::new(state.db.clone())
        .get(applicant.id, club_id)
        .await
        .unwrap()
        .expect("membership created on accept");
    assert_eq!(Role::from_rank(membership.role), Some(Role::Member));
    assert_eq!(membership.statement, "Hello");

    // Re-resolving a resolved application changes nothing and creates no
    // second membership.
    let response = resolve(&schema, owner_claims, &application_id, true).await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION"));
    assert_eq!(membership_count(&state, applicant.id, club_id).await, 1);
}

#[tokio::test]
async fn rejecting_an_application_creates_no_membership() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (owner, owner_claims) = create_test_user(&state, "strict").await;
    let (applicant, applicant_claims) = create_test_user(&state, "unlucky").await;
    let club_id = create_test_club(&state, owner.id, "gate").await;

    let response = apply(&schema, applicant_claims, club_id, "Please?").await;
    let data = response.data.into_json().unwrap();
    let application_id = data["applyToClub"]["id"].as_str().unwrap().to_string();

    let response = resolve(&schema, owner_claims, &application_id, false).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["resolveApplication"]["status"], "REJECTED");

    assert_eq!(membership_count(&state, applicant.id, club_id).await, 0);
}

#[tokio::test]
async fn duplicate_applications_are_rejected() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (owner, _) = create_test_user(&state, "host").await;
    let (_, applicant_claims) = create_test_user(&state, "eager").await;
    let club_id = create_test_club(&state, owner.id, "dupes").await;

    let response = apply(&schema, applicant_claims.clone(), club_id, "First").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let response = apply(&schema, applicant_claims, club_id, "Second").await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION"));
}

#[tokio::test]
async fn pending_applications_are_newest_first_and_officer_only() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (owner, owner_claims) = create_test_user(&state, "listkeeper").await;
    let (_, first_claims) = create_test_user(&state, "early").await;
    let (_, second_claims) = create_test_user(&state, "late").await;
    let club_id = create_test_club(&state, owner.id, "queue").await;

    apply(&schema, first_claims.clone(), club_id, "I was first").await;
    apply(&schema, second_claims, club_id, "I was second").await;

    let query = r#"
        query Pending($clubId: ID!) {
            pendingApplications(clubId: $clubId) {
                statement
                status
            }
        }
    "#;
    let variables = Variables::from_json(json!({ "clubId": club_id.to_string() }));

    // A plain applicant holds no rank in the club and may not see the queue.
    let response = execute_graphql(&schema, query, Some(variables.clone()), Some(first_claims)).await;
    assert_eq!(error_code(&response).as_deref(), Some("FORBIDDEN"));

    let response = execute_graphql(&schema, query, Some(variables), Some(owner_claims)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let pending = data["pendingApplications"].as_array().unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0]["statement"], "I was second");
    assert_eq!(pending[1]["statement"], "I was first");
}
