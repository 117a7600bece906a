use axum::{http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

/// Every route the service mounts, in the order they are listed by `GET /`.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/health"),
    ("GET", "/users"),
    ("POST", "/users"),
    ("GET", "/users/:id"),
    ("PUT", "/users/:id"),
    ("DELETE", "/users/:id"),
    ("GET", "/users/:id/favorites"),
    ("POST", "/users/:id/favorites/people/:people_id"),
    ("DELETE", "/users/:id/favorites/people/:people_id"),
    ("POST", "/users/:id/favorites/planet/:planet_id"),
    ("DELETE", "/users/:id/favorites/planet/:planet_id"),
    ("GET", "/people"),
    ("POST", "/people"),
    ("GET", "/people/:id"),
    ("PUT", "/people/:id"),
    ("DELETE", "/people/:id"),
    ("GET", "/planets"),
    ("POST", "/planets"),
    ("GET", "/planets/:id"),
    ("PUT", "/planets/:id"),
    ("DELETE", "/planets/:id"),
    ("GET", "/favorites"),
    ("POST", "/favorites"),
    ("GET", "/favorites/:id"),
    ("DELETE", "/favorites/:id"),
];

#[derive(Debug, Serialize)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Sitemap {
    pub routes: Vec<RouteInfo>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sitemap))
        .route("/health", get(health))
}

pub async fn sitemap() -> Json<Sitemap> {
    let routes = ROUTES
        .iter()
        .map(|&(method, path)| RouteInfo { method, path })
        .collect();
    Json(Sitemap { routes })
}

/// Static liveness probe; never touches the store.
pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
