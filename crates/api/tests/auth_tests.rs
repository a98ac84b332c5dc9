//! Account lifecycle: register, log in, profile edits and password
//! changes, end to end through the schema.

mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;

use api::gql::build_schema;

#[tokio::test]
async fn register_then_login_round_trip() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let email = format!("signup-{}@test.org", unique_suffix());
    let register = r#"
        mutation Register($input: RegisterInput!) {
            register(input: $input) {
                token
                user { email name experience }
            }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "email": email.clone(),
            "name": "Jebediah Kerman",
            "experience": "INTERMEDIATE",
            "bio": "Loves the Sicilian",
            "password": "Password123"
        }
    }));

    let response = execute_graphql(&schema, register, Some(variables.clone()), None).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert!(!data["register"]["token"].as_str().unwrap().is_empty());
    assert_eq!(data["register"]["user"]["email"], email);
    assert_eq!(data["register"]["user"]["experience"], "INTERMEDIATE");

    // The email is now taken.
    let response = execute_graphql(&schema, register, Some(variables), None).await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION"));
    assert_eq!(error_field(&response).as_deref(), Some("email"));

    let login = r#"
        mutation Login($input: LoginInput!) {
            login(input: $input) {
                token
                user { email }
            }
        }
    "#;

    let response = execute_graphql(
        &schema,
        login,
        Some(Variables::from_json(json!({
            "input": { "email": email.clone(), "password": "Password123" }
        }))),
        None,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let response = execute_graphql(
        &schema,
        login,
        Some(Variables::from_json(json!({
            "input": { "email": email, "password": "WrongPassword1" }
        }))),
        None,
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("UNAUTHENTICATED"));
}

#[tokio::test]
async fn profile_updates_are_reflected_in_me() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let (user, claims) = create_test_user(&state, "editor").await;

    let update = r#"
        mutation Update($input: UpdateProfileInput!) {
            updateProfile(input: $input) {
                name
                experience
                bio
            }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "email": user.email,
            "name": "Renamed Kerman",
            "experience": "GRANDMASTER",
            "bio": "Now with a bio"
        }
    }));

    let response = execute_graphql(&schema, update, Some(variables), Some(claims.clone())).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let response = execute_graphql(&schema, "query { me { name experience bio } }", None, Some(claims)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["me"]["name"], "Renamed Kerman");
    assert_eq!(data["me"]["experience"], "GRANDMASTER");
    assert_eq!(data["me"]["bio"], "Now with a bio");
}

#[tokio::test]
async fn change_password_requires_the_current_one() {
    let Some(state) = setup_test_db().await else { return };
    let schema = build_schema(state.clone());

    let email = format!("rotate-{}@test.org", unique_suffix());
    let register = r#"
        mutation Register($input: RegisterInput!) {
            register(input: $input) { user { id } }
        }
    "#;
    let response = execute_graphql(
        &schema,
        register,
        Some(Variables::from_json(json!({
            "input": {
                "email": email.clone(),
                "name": "Rotator",
                "experience": "BEGINNER",
                "password": "Password123"
            }
        }))),
        None,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let user_id = data["register"]["user"]["id"].as_str().unwrap().parse().unwrap();
    let claims = test_claims(user_id, &email);

    let change = r#"
        mutation Change($input: ChangePasswordInput!) {
            changePassword(input: $input)
        }
    "#;

    let response = execute_graphql(
        &schema,
        change,
        Some(Variables::from_json(json!({
            "input": { "currentPassword": "NotIt1", "newPassword": "NewPassword1" }
        }))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("UNAUTHENTICATED"));

    let response = execute_graphql(
        &schema,
        change,
        Some(Variables::from_json(json!({
            "input": { "currentPassword": "Password123", "newPassword": "NewPassword1" }
        }))),
        Some(claims),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    // The new password now logs in.
    let login = r#"
        mutation Login($input: LoginInput!) {
            login(input: $input) { token }
        }
    "#;
    let response = execute_graphql(
        &schema,
        login,
        Some(Variables::from_json(json!({
            "input": { "email": email, "password": "NewPassword1" }
        }))),
        None,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
}
