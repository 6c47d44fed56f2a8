use crate::helpers::spawn_app;
use serde_json::{json, Value};

#[tokio::test(flavor = "multi_thread")]
async fn a_valid_id_token_should_be_exchanged_for_the_user_id() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;

    // Acts
    let response = app
        .post_json("/auth/signin", &json!({ "idToken": user.access_token }))
        .await;

    // Asserts
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["uid"], user.id.to_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn an_invalid_id_token_should_be_unauthorized() {
    // Arranges
    let app = spawn_app().await;

    // Acts
    let response = app
        .post_json("/auth/signin", &json!({ "idToken": "not-a-token" }))
        .await;

    // Asserts
    assert_eq!(401, response.status().as_u16());
}
