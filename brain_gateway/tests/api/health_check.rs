use crate::helpers::spawn_app;
use serde_json::Value;

#[tokio::test(flavor = "multi_thread")]
async fn health_check_works() {
    // Arranges
    let app = spawn_app().await;

    // Acts
    let response = app
        .api_client
        .get(&format!("{}/health", &app.address))
        .send()
        .await
        .expect("Failed to execute request");

    // Asserts
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert!(body["ts"].is_string());
}
