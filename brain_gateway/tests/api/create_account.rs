use crate::helpers::spawn_app;
use brain_gateway::controllers::LogInAccountBodyData;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread")]
async fn a_valid_user_account_should_be_created() {
    // Arranges
    let app = spawn_app().await;
    let (test_email, test_password) = app.get_test_user_credentials();

    // Acts
    let response = app
        .post_sign_up(&json!({
            "email": test_email,
            "password": test_password,
            "displayName": "Ada"
        }))
        .await;

    // Asserts the API response
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let uid = Uuid::parse_str(body["uid"].as_str().unwrap()).unwrap();
    assert!(!uid.is_nil());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_valid_user_will_be_able_to_use_their_password_for_credentials() {
    // Arranges
    let app = spawn_app().await;
    let (test_email, test_password) = app.get_test_user_credentials();
    let response = app
        .post_sign_up(&json!({ "email": test_email, "password": test_password }))
        .await;
    let body: Value = response.json().await.unwrap();

    // Acts
    let response = app
        .post_log_in(&LogInAccountBodyData {
            email: test_email,
            password: test_password,
        })
        .await;

    // Asserts
    assert_eq!(200, response.status().as_u16());
    let log_in_body: Value = response.json().await.unwrap();
    assert_eq!(log_in_body["uid"], body["uid"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn an_email_can_only_be_used_by_one_account() {
    // Arranges
    let app = spawn_app().await;
    let (test_email, test_password) = app.get_test_user_credentials();
    let body = json!({ "email": test_email, "password": test_password });
    assert_eq!(201, app.post_sign_up(&body).await.status().as_u16());

    // Acts
    let response = app.post_sign_up(&body).await;

    // Asserts
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_account_data_should_be_rejected_with_a_redacted_message() {
    // Arranges
    let app = spawn_app().await;
    let (test_email, test_password) = app.get_test_user_credentials();
    let test_cases = vec![
        (
            json!({ "email": "not-an-email", "password": test_password }),
            "Invalid email",
        ),
        (
            json!({ "email": test_email, "password": "12345" }),
            "Invalid password",
        ),
        (
            json!({ "email": test_email, "password": test_password, "displayName": "a".repeat(129) }),
            "Invalid display name",
        ),
    ];

    for (body, expected_error) in test_cases {
        // Acts
        let response = app.post_sign_up(&body).await;

        // Asserts
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}",
            body
        );
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], expected_error);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_fields_should_be_rejected() {
    // Arranges
    let app = spawn_app().await;

    // Acts
    let response = app.post_sign_up(&json!({ "email": "ada@example.com" })).await;

    // Asserts
    assert_eq!(400, response.status().as_u16());
}
