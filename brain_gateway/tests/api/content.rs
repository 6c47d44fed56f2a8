use crate::helpers::{deep_work_content, spawn_app, spawn_app_with_unavailable_content_store};
use brain_gateway::controllers::INTERNAL_ERROR_MESSAGE;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread")]
async fn a_created_content_is_listed_with_identical_fields() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;

    // Acts
    let response = app.post_content(&user, &deep_work_content()).await;

    // Asserts
    assert_eq!(201, response.status().as_u16());
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["type"], "document");
    assert_eq!(created["title"], "Deep Work");
    assert_eq!(created["content"], "Focus techniques for knowledge workers");
    assert_eq!(created["tags"], json!(["focus"]));
    assert_eq!(created["ownerId"], user.id.to_string());
    assert_eq!(created["indexStatus"], "indexed");

    let response = app.get_contents(&user).await;
    assert_eq!(200, response.status().as_u16());
    let listed: Value = response.json().await.unwrap();
    assert_eq!(listed["contents"], json!([created]));
}

#[tokio::test(flavor = "multi_thread")]
async fn the_same_content_twice_gets_two_ids() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;

    // Acts
    app.post_content(&user, &deep_work_content()).await;
    app.post_content(&user, &deep_work_content()).await;

    // Asserts
    let ids = app.get_content_ids(&user).await;
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test(flavor = "multi_thread")]
async fn contents_are_only_listed_to_their_owner() {
    // Arranges
    let app = spawn_app().await;
    let owner = app.create_test_user().await;
    let other_user = app.create_test_user().await;

    // Acts
    app.post_content(&owner, &deep_work_content()).await;

    // Asserts
    assert_eq!(app.get_content_ids(&owner).await.len(), 1);
    assert!(app.get_content_ids(&other_user).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_contents_are_rejected_without_being_stored() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;
    let test_cases = vec![
        (
            json!({ "type": "document", "title": "", "content": "" }),
            vec!["title", "content"],
        ),
        (
            json!({ "type": "podcast", "title": "Deep Work", "content": "Focus" }),
            vec!["type"],
        ),
        (
            json!({ "title": "Deep Work", "content": "Focus" }),
            vec!["type"],
        ),
        (
            json!({ "type": "link", "title": "Deep Work", "content": "Focus", "link": "not a url" }),
            vec!["link"],
        ),
    ];

    for (body, expected_fields) in test_cases {
        // Acts
        let response = app.post_content(&user, &body).await;

        // Asserts
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}",
            body
        );
        let error: Value = response.json().await.unwrap();
        let fields: Vec<&str> = error["invalidFields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|field| field["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, expected_fields);
    }

    assert!(app.get_content_ids(&user).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn content_routes_require_a_valid_access_token() {
    // Arranges
    let app = spawn_app().await;
    let content_url = format!("{}/content", &app.address);
    let requests = vec![
        app.api_client.get(&content_url),
        app.api_client.post(&content_url).json(&deep_work_content()),
        app.api_client
            .get(&content_url)
            .bearer_auth("not-a-valid-token"),
        app.api_client
            .get(&content_url)
            .header("Authorization", "Basic dXNlcjpwYXNz"),
        app.api_client
            .delete(&format!("{}/{}", &content_url, Uuid::new_v4())),
        app.api_client
            .post(&format!("{}/search", &app.address))
            .json(&json!({ "q": "focus" })),
    ];

    for request in requests {
        // Acts
        let response = request.send().await.expect("Failed to execute request");

        // Asserts
        assert_eq!(401, response.status().as_u16());
        let error: Value = response.json().await.unwrap();
        assert!(error["error"].is_string());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn a_deleted_content_is_neither_listed_nor_searchable() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;
    let created: Value = app
        .post_content(&user, &deep_work_content())
        .await
        .json()
        .await
        .unwrap();
    let content_id = created["id"].as_str().unwrap();

    // Acts
    let response = app.delete_content(&user, content_id).await;

    // Asserts
    assert_eq!(204, response.status().as_u16());
    assert!(app.get_content_ids(&user).await.is_empty());
    assert!(app.search_ids(&user, "focus techniques").await.is_empty());
    assert!(!app
        .content_point_repository
        .contains(Uuid::parse_str(content_id).unwrap()));
}

#[tokio::test(flavor = "multi_thread")]
async fn a_content_of_another_user_cannot_be_deleted() {
    // Arranges
    let app = spawn_app().await;
    let owner = app.create_test_user().await;
    let other_user = app.create_test_user().await;
    let created: Value = app
        .post_content(&owner, &deep_work_content())
        .await
        .json()
        .await
        .unwrap();
    let content_id = created["id"].as_str().unwrap();

    // Acts
    let response = app.delete_content(&other_user, content_id).await;

    // Asserts
    assert_eq!(404, response.status().as_u16());
    assert_eq!(app.get_content_ids(&owner).await, vec![content_id.to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_an_unknown_content_is_not_found() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;

    // Acts
    let response = app
        .delete_content(&user, &Uuid::new_v4().to_string())
        .await;

    // Asserts
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_content_not_indexed_is_listed_and_searchable_once_reindexed() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;
    app.content_point_repository.set_failing(true);

    // Acts: the vector index is down while creating the content
    let response = app.post_content(&user, &deep_work_content()).await;

    // Asserts the failure is reported with what is needed to retry
    assert_eq!(500, response.status().as_u16());
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["indexStatus"], "pending");
    let content_id = error["id"].as_str().unwrap().to_string();
    app.content_point_repository.set_failing(false);

    // The content is stored, but not searchable yet
    let listed: Value = app.get_contents(&user).await.json().await.unwrap();
    assert_eq!(listed["contents"][0]["id"], content_id);
    assert_eq!(listed["contents"][0]["indexStatus"], "pending");
    assert!(app.search_ids(&user, "focus techniques").await.is_empty());

    // Acts: retries the index step
    let response = app.reindex_content(&user, &content_id).await;

    // Asserts
    assert_eq!(200, response.status().as_u16());
    let reindexed: Value = response.json().await.unwrap();
    assert_eq!(reindexed["indexStatus"], "indexed");
    assert_eq!(app.search_ids(&user, "focus techniques").await, vec![content_id]);
}

#[tokio::test(flavor = "multi_thread")]
async fn reindexing_a_content_of_another_user_is_not_found() {
    // Arranges
    let app = spawn_app().await;
    let owner = app.create_test_user().await;
    let other_user = app.create_test_user().await;
    let created: Value = app
        .post_content(&owner, &deep_work_content())
        .await
        .json()
        .await
        .unwrap();

    // Acts
    let response = app
        .reindex_content(&other_user, created["id"].as_str().unwrap())
        .await;

    // Asserts
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn internal_errors_are_not_leaked() {
    // Arranges
    let app = spawn_app().await;
    let user = app.create_test_user().await;
    app.content_point_repository.set_failing(true);

    // Acts
    let response = app.post_search(&user, "focus").await;

    // Asserts
    assert_eq!(500, response.status().as_u16());
    let error: Value = response.json().await.unwrap();
    assert!(!error["error"]
        .as_str()
        .unwrap()
        .contains("simulated outage"));
}

#[tokio::test(flavor = "multi_thread")]
async fn a_content_store_outage_is_an_opaque_error_without_index_write() {
    // Arranges
    let app = spawn_app_with_unavailable_content_store().await;
    let user = app.create_test_user().await;

    // Acts
    let response = app.post_content(&user, &deep_work_content()).await;

    // Asserts
    assert_eq!(500, response.status().as_u16());
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], INTERNAL_ERROR_MESSAGE);
    assert!(error.get("id").is_none());
    assert!(error.get("indexStatus").is_none());
    assert!(app.content_point_repository.is_empty());
}
