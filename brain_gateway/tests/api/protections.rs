use crate::helpers::{spawn_app, spawn_app_with};
use serde_json::{json, Value};

#[tokio::test(flavor = "multi_thread")]
async fn requests_over_the_rate_limit_are_rejected() {
    // Arranges
    let app = spawn_app_with(|c| c.application.rate_limit.max_requests = 3).await;
    let health_url = format!("{}/health", &app.address);

    for _ in 0..3 {
        let response = app
            .api_client
            .get(&health_url)
            .send()
            .await
            .expect("Failed to execute request");
        assert!(response.status().is_success());
    }

    // Acts
    let response = app
        .api_client
        .get(&health_url)
        .send()
        .await
        .expect("Failed to execute request");

    // Asserts
    assert_eq!(429, response.status().as_u16());
    let retry_after: u64 = response
        .headers()
        .get("Retry-After")
        .expect("No Retry-After header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 900);
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "Too many requests, please try again later.");
}

#[tokio::test(flavor = "multi_thread")]
async fn an_oversized_body_is_rejected_with_a_413() {
    // Arranges
    let app = spawn_app_with(|c| c.application.max_body_size_bytes = 1024).await;
    let (email, _) = app.get_test_user_credentials();
    let body = json!({ "email": email, "password": "a".repeat(2048) });

    // Acts
    let response = app.post_sign_up(&body).await;

    // Asserts
    assert_eq!(413, response.status().as_u16());
    let error: Value = response.json().await.unwrap();
    assert!(error["error"].is_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_body_under_the_limit_is_accepted() {
    // Arranges
    let app = spawn_app_with(|c| c.application.max_body_size_bytes = 1024).await;
    let (email, password) = app.get_test_user_credentials();

    // Acts
    let response = app
        .post_sign_up(&json!({ "email": email, "password": password }))
        .await;

    // Asserts
    assert_eq!(201, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_malformed_json_body_is_rejected_with_a_400() {
    // Arranges
    let app = spawn_app().await;

    // Acts
    let response = app
        .api_client
        .post(&format!("{}/auth/signup", &app.address))
        .header("Content-Type", "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .expect("Failed to execute request");

    // Asserts
    assert_eq!(400, response.status().as_u16());
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "Invalid JSON body");
}

#[tokio::test(flavor = "multi_thread")]
async fn security_headers_are_set_on_every_response() {
    // Arranges
    let app = spawn_app().await;
    let requests = vec![
        app.api_client.get(&format!("{}/health", &app.address)),
        // Rejected by the authentication middleware
        app.api_client.get(&format!("{}/content", &app.address)),
    ];

    for request in requests {
        // Acts
        let response = request.send().await.expect("Failed to execute request");

        // Asserts
        let headers = response.headers();
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "SAMEORIGIN");
        assert_eq!(headers.get("Referrer-Policy").unwrap(), "no-referrer");
        assert!(headers.get("Strict-Transport-Security").is_some());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn the_configured_origin_is_allowed() {
    // Arranges
    let app = spawn_app().await;

    // Acts
    let response = app
        .api_client
        .get(&format!("{}/health", &app.address))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .expect("Failed to execute request");

    // Asserts
    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("Access-Control-Allow-Origin")
            .unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response
            .headers()
            .get("Access-Control-Allow-Credentials")
            .unwrap(),
        "true"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn a_preflight_request_from_the_configured_origin_is_answered() {
    // Arranges
    let app = spawn_app().await;

    // Acts
    let response = app
        .api_client
        .request(
            reqwest::Method::OPTIONS,
            &format!("{}/content", &app.address),
        )
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization, content-type")
        .send()
        .await
        .expect("Failed to execute request");

    // Asserts
    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("Access-Control-Allow-Origin")
            .unwrap(),
        "http://localhost:3000"
    );
}
