use crate::helpers::{deep_work_content, spawn_app};
use serde_json::{json, Value};

#[tokio::test(flavor = "multi_thread")]
async fn a_user_only_finds_their_own_contents() {
    // Arranges
    let app = spawn_app().await;
    let u1 = app.create_test_user().await;
    let u2 = app.create_test_user().await;
    let created: Value = app
        .post_content(&u1, &deep_work_content())
        .await
        .json()
        .await
        .unwrap();

    // Acts
    let u1_results = app.search_ids(&u1, "focus techniques").await;
    let u2_results = app.search_ids(&u2, "focus techniques").await;

    // Asserts
    assert_eq!(u1_results, vec![created["id"].as_str().unwrap().to_string()]);
    assert!(u2_results.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn results_carry_their_score_and_metadata() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;
    app.post_content(&user, &deep_work_content()).await;

    // Acts
    let response = app.post_search(&user, "focus techniques").await;

    // Asserts
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let result = &body["results"][0];
    assert!(result["score"].as_f64().unwrap() > 0.0);
    assert_eq!(
        result["metadata"],
        json!({
            "ownerId": user.id.to_string(),
            "type": "document",
            "title": "Deep Work",
            "tags": ["focus"]
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn the_most_similar_content_ranks_first() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;
    app.post_content(
        &user,
        &json!({
            "type": "tweet",
            "title": "Banana bread",
            "content": "A recipe with ripe bananas and walnuts"
        }),
    )
    .await;
    let created: Value = app
        .post_content(&user, &deep_work_content())
        .await
        .json()
        .await
        .unwrap();

    // Acts
    let results = app.search_ids(&user, "Deep Work focus techniques").await;

    // Asserts
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], created["id"].as_str().unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn at_most_ten_results_are_returned() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;
    for i in 0..12 {
        app.post_content(
            &user,
            &json!({ "type": "tweet", "title": format!("Note {}", i), "content": "focus" }),
        )
        .await;
    }

    // Acts
    let results = app.search_ids(&user, "focus").await;

    // Asserts
    assert_eq!(results.len(), 10);
}

#[tokio::test(flavor = "multi_thread")]
async fn an_empty_query_is_rejected() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;

    for body in [json!({ "q": "" }), json!({ "q": "   " }), json!({})] {
        // Acts
        let response = app
            .api_client
            .post(&format!("{}/search", &app.address))
            .bearer_auth(&user.access_token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        // Asserts
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}",
            body
        );
    }
}
