#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Result, anyhow};
use axum_test::TestServer;
use serde_json::{Value, json};
use vistoria_core::testing::InMemoryCatalogStore;
use vistoria_server::{
    AppState,
    infra::config::{Config, models::DEFAULT_SUBJECT_HEADER},
    routes::create_app,
};

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: Arc<InMemoryCatalogStore>,
}

pub fn build_test_app() -> Result<TestApp> {
    build_test_app_with(Config::default())
}

pub fn build_test_app_with(config: Config) -> Result<TestApp> {
    let store = Arc::new(InMemoryCatalogStore::new());
    let state = AppState::new(Arc::new(config), store.clone(), store.clone());

    let server = TestServer::builder()
        .build(create_app(state.clone()))
        .map_err(|err| anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        state,
        store,
    })
}

pub const SUBJECT_HEADER: &str = DEFAULT_SUBJECT_HEADER;

pub fn image_body(title: &str, is_public: bool) -> Value {
    json!({
        "image": {
            "title": title,
            "transformationType": "recolor",
            "publicId": format!("vistoria/{}", title.to_lowercase().replace(' ', "-")),
            "secureURL": "https://media.example/original.png",
            "width": 1024,
            "height": 768,
            "prompt": format!("{title} prompt"),
            "color": "teal",
            "tags": ["generated"],
            "isPublic": is_public,
        },
        "path": "/transformations/add/recolor",
    })
}
