use crate::helpers::spawn_app;
use brain_gateway::controllers::{LogInAccountBodyData, LogInAccountResponse};
use serde_json::Value;

#[tokio::test(flavor = "multi_thread")]
async fn a_valid_user_account_should_get_a_valid_access_token() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;

    // Acts
    let response = app
        .post_log_in(&LogInAccountBodyData {
            email: user.email.clone(),
            password: user.password.clone(),
        })
        .await;

    // Asserts the API response
    assert_eq!(200, response.status().as_u16());

    let json_response = response.json::<LogInAccountResponse>().await.unwrap();
    assert!(!json_response.access_token.is_empty());
    assert_eq!(json_response.uid, user.id);

    let token_user_id = app.decode_access_token(&json_response.access_token);
    assert_eq!(token_user_id, user.id);
}

#[tokio::test(flavor = "multi_thread")]
async fn the_email_is_not_case_sensitive() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;

    // Acts
    let response = app
        .post_log_in(&LogInAccountBodyData {
            email: user.email.to_uppercase(),
            password: user.password.clone(),
        })
        .await;

    // Asserts
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_wrong_password_and_an_unknown_email_get_the_same_response() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;
    let (unknown_email, _) = app.get_test_user_credentials();

    // Acts
    let wrong_password = app
        .post_log_in(&LogInAccountBodyData {
            email: user.email.clone(),
            password: format!("{}-wrong", user.password),
        })
        .await;
    let unknown_user = app
        .post_log_in(&LogInAccountBodyData {
            email: unknown_email,
            password: user.password.clone(),
        })
        .await;

    // Asserts
    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_user.status().as_u16());
    let wrong_password: Value = wrong_password.json().await.unwrap();
    let unknown_user: Value = unknown_user.json().await.unwrap();
    assert_eq!(wrong_password, unknown_user);
}
