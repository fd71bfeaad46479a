use anyhow::Result;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use vistoria_core::api_routes::{self, utils as route_utils};
use vistoria_server::{handlers::images::OUTCOME_HEADER, infra::config::Config};

#[path = "support/mod.rs"]
mod support;

use support::{SUBJECT_HEADER, build_test_app, build_test_app_with, image_body};

async fn create_image(server: &TestServer, subject: &str, title: &str, is_public: bool) -> Value {
    let response = server
        .post(api_routes::v1::images::COLLECTION)
        .add_header(SUBJECT_HEADER, subject)
        .json(&image_body(title, is_public))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

fn image_path(id: &str) -> String {
    route_utils::replace_param(api_routes::v1::images::ITEM, "{id}", id)
}

#[tokio::test]
async fn create_requires_identity() -> Result<()> {
    let app = build_test_app()?;

    let response = app
        .server
        .post(api_routes::v1::images::COLLECTION)
        .json(&image_body("Anonymous", true))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.image_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn created_public_image_appears_in_feed_with_author() -> Result<()> {
    let app = build_test_app()?;

    let created = create_image(&app.server, "user_ada", "Harbor Sunset", true).await;
    assert_eq!(created["isPublic"], true);
    assert!(created["sharedAt"].is_string());
    assert_eq!(created["version"], 1);
    assert_eq!(app.store.user_count().await, 1);

    let response = app.server.get(api_routes::v1::images::COLLECTION).await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["totalShared"], 1);
    assert_eq!(body["data"]["totalPages"], 1);
    let first = &body["data"]["data"][0];
    assert_eq!(first["title"], "Harbor Sunset");
    assert_eq!(first["author"]["externalId"], "user_ada");
    Ok(())
}

#[tokio::test]
async fn private_images_stay_out_of_the_feed() -> Result<()> {
    let app = build_test_app()?;

    let created = create_image(&app.server, "user_ada", "Draft", false).await;
    assert_eq!(created["isPublic"], false);
    assert!(created["sharedAt"].is_null());

    let body: Value = app
        .server
        .get(api_routes::v1::images::COLLECTION)
        .await
        .json();
    assert_eq!(body["data"]["totalShared"], 0);
    assert_eq!(body["data"]["data"].as_array().map(Vec::len), Some(0));

    let mine: Value = app
        .server
        .get(api_routes::v1::users::CURRENT_IMAGES)
        .add_header(SUBJECT_HEADER, "user_ada")
        .await
        .json();
    assert_eq!(mine["data"]["data"][0]["title"], "Draft");
    Ok(())
}

#[tokio::test]
async fn feed_search_matches_case_insensitively() -> Result<()> {
    let app = build_test_app()?;
    create_image(&app.server, "user_ada", "Harbor Sunset", true).await;
    create_image(&app.server, "user_ada", "Forest Morning", true).await;

    let response = app
        .server
        .get(api_routes::v1::images::COLLECTION)
        .add_query_param("query", "SUNSET")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();

    let titles: Vec<&str> = body["data"]["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|item| item["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["Harbor Sunset"]);
    // The shared total ignores the search query.
    assert_eq!(body["data"]["totalShared"], 2);
    Ok(())
}

#[tokio::test]
async fn feed_paginates_with_configured_default() -> Result<()> {
    let mut config = Config::default();
    config.catalog.default_page_size = 2;
    let app = build_test_app_with(config)?;
    for title in ["One", "Two", "Three"] {
        create_image(&app.server, "user_ada", title, true).await;
    }

    let first: Value = app
        .server
        .get(api_routes::v1::images::COLLECTION)
        .await
        .json();
    assert_eq!(first["data"]["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(first["data"]["totalPages"], 2);

    let second: Value = app
        .server
        .get(api_routes::v1::images::COLLECTION)
        .add_query_param("page", 2)
        .await
        .json();
    assert_eq!(second["data"]["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn zero_limit_is_rejected() -> Result<()> {
    let app = build_test_app()?;

    app.server
        .get(api_routes::v1::images::COLLECTION)
        .add_query_param("limit", 0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_paging_uses_error_envelope() -> Result<()> {
    let app = build_test_app()?;

    for (key, value) in [("limit", "-1"), ("page", "abc")] {
        let response = app
            .server
            .get(api_routes::v1::images::COLLECTION)
            .add_query_param(key, value)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["status"], 400, "{key}={value}");
    }
    Ok(())
}

#[tokio::test]
async fn get_image_handles_unknown_and_malformed_ids() -> Result<()> {
    let app = build_test_app()?;

    app.server
        .get(&image_path("7f1c1d9e-0000-4000-8000-000000000000"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = app.server.get(&image_path("not-a-uuid")).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["status"], 400);
    Ok(())
}

#[tokio::test]
async fn only_the_owner_can_update() -> Result<()> {
    let app = build_test_app()?;
    let created = create_image(&app.server, "user_ada", "Original", false).await;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    app.server
        .put(&image_path(&id))
        .add_header(SUBJECT_HEADER, "user_grace")
        .json(&image_body("Hijacked", true))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .put(&image_path(&id))
        .add_header(SUBJECT_HEADER, "user_ada")
        .json(&image_body("Renamed", true))
        .await;
    response.assert_status_ok();
    let updated = &response.json::<Value>()["data"];
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["isPublic"], true);
    assert!(updated["sharedAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn delete_always_redirects_home() -> Result<()> {
    let app = build_test_app()?;
    let created = create_image(&app.server, "user_ada", "Doomed", true).await;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let anonymous = app.server.delete(&image_path(&id)).await;
    anonymous.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(anonymous.header("location"), "/");
    assert_eq!(anonymous.header(OUTCOME_HEADER), "unauthorized");

    let stranger = app
        .server
        .delete(&image_path(&id))
        .add_header(SUBJECT_HEADER, "user_grace")
        .await;
    stranger.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(stranger.header(OUTCOME_HEADER), "unauthorized");
    assert_eq!(app.store.image_count().await, 1);

    let owner = app
        .server
        .delete(&image_path(&id))
        .add_header(SUBJECT_HEADER, "user_ada")
        .await;
    owner.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(owner.header("location"), "/");
    assert_eq!(owner.header(OUTCOME_HEADER), "ok");
    assert_eq!(app.store.image_count().await, 0);

    let again = app
        .server
        .delete(&image_path(&id))
        .add_header(SUBJECT_HEADER, "user_ada")
        .await;
    assert_eq!(again.header(OUTCOME_HEADER), "not_found");

    let survivor = create_image(&app.server, "user_ada", "Survivor", true).await;
    let survivor_id = survivor["id"].as_str().unwrap_or_default().to_string();
    app.store.set_unavailable(true);
    let outage = app
        .server
        .delete(&image_path(&survivor_id))
        .add_header(SUBJECT_HEADER, "user_ada")
        .await;
    outage.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(outage.header("location"), "/");
    assert_eq!(outage.header(OUTCOME_HEADER), "store_unavailable");

    app.store.set_unavailable(false);
    assert_eq!(app.store.image_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn identity_outage_on_protected_routes_is_503() -> Result<()> {
    let app = build_test_app()?;
    app.store.set_unavailable(true);

    let response = app
        .server
        .post(api_routes::v1::images::COLLECTION)
        .add_header(SUBJECT_HEADER, "user_ada")
        .json(&image_body("Offline", true))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"]["status"], 503);
    Ok(())
}

#[tokio::test]
async fn upload_result_fills_asset_fields_and_tags() -> Result<()> {
    let app = build_test_app()?;
    let mut body = image_body("Uploaded", true);
    body["upload"] = json!({
        "public_id": "vistoria/uploaded-xyz",
        "secure_url": "https://media.example/uploaded-xyz.jpg",
        "width": 640,
        "height": 480,
        "tags": ["fallback"],
        "categorization": {
            "imagga_tagging": {
                "data": [
                    { "tag": { "en": "harbor" }, "confidence": 92.0 },
                    { "tag": { "en": "boat" }, "confidence": 12.0 },
                ]
            }
        }
    });

    let response = app
        .server
        .post(api_routes::v1::images::COLLECTION)
        .add_header(SUBJECT_HEADER, "user_ada")
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = &response.json::<Value>()["data"];

    assert_eq!(created["publicId"], "vistoria/uploaded-xyz");
    assert_eq!(created["secureURL"], "https://media.example/uploaded-xyz.jpg");
    assert_eq!(created["width"], 640);
    assert_eq!(created["tags"], json!(["harbor"]));
    Ok(())
}

#[tokio::test]
async fn malformed_upload_result_is_rejected() -> Result<()> {
    let app = build_test_app()?;
    let mut body = image_body("Broken", true);
    body["upload"] = json!({ "secure_url": "https://media.example/x.jpg" });

    let response = app
        .server
        .post(api_routes::v1::images::COLLECTION)
        .add_header(SUBJECT_HEADER, "user_ada")
        .json(&body)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["status"], 400);
    assert_eq!(app.store.image_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn mutations_publish_invalidations() -> Result<()> {
    let app = build_test_app()?;
    let mut events = app.state.invalidations.subscribe();

    create_image(&app.server, "user_ada", "Announced", true).await;

    let event = events.recv().await?;
    assert_eq!(
        event.paths,
        vec!["/", "/profile", "/transformations/add/recolor"]
    );
    Ok(())
}

#[tokio::test]
async fn unavailable_store_maps_to_503() -> Result<()> {
    let app = build_test_app()?;
    app.store.set_unavailable(true);

    let response = app.server.get(api_routes::v1::images::COLLECTION).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Catalog store unavailable");

    app.server
        .get("/health")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn health_reports_store_status() -> Result<()> {
    let app = build_test_app()?;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "healthy");
    Ok(())
}
