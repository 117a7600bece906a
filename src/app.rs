use axum::Router;
use tower_http::{cors::CorsLayer, normalize_path::NormalizePath, trace::TraceLayer};

use crate::state::AppState;
use crate::{catalog, favorites, site, users};

/// Assembles the service. Trailing slashes are trimmed before routing.
pub fn build_app(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .merge(site::router())
        .merge(users::router())
        .merge(catalog::router())
        .merge(favorites::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        );
    NormalizePath::trim_trailing_slash(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> NormalizePath<Router> {
        build_app(AppState::fake())
    }

    async fn send(
        app: &NormalizePath<Router>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &NormalizePath<Router>, uri: &str, body: Value) -> i64 {
        let (status, value) = send(app, Method::POST, uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{uri}: {value}");
        value["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn sitemap_lists_routes() {
        let (status, body) = send(&app(), Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        let routes = body["routes"].as_array().unwrap();
        assert!(routes.contains(&json!({ "method": "GET", "path": "/health" })));
        assert!(routes.contains(&json!({ "method": "POST", "path": "/favorites" })));
    }

    #[tokio::test]
    async fn trailing_slash_is_tolerated() {
        let (status, _) = send(&app(), Method::GET, "/health/", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn create_user_returns_public_fields_and_location() {
        let app = app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": " Leia@Alderaan.org", "password": "hope" }).to_string(),
            ))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()[header::LOCATION], "/users/1");

        let (_, body) = send(&app, Method::GET, "/users/1", None).await;
        assert_eq!(
            body,
            json!({ "id": 1, "email": "leia@alderaan.org", "is_active": true })
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let app = app();
        let user = json!({ "email": "han@falcon.io", "password": "shot-first" });
        create(&app, "/users", user.clone()).await;
        let (status, body) = send(&app, Method::POST, "/users", Some(user)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Email already registered");
        assert_eq!(body["constraint"], "user_email_key");
    }

    #[tokio::test]
    async fn malformed_input_is_a_validation_error() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({ "email": "not-an-email", "password": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid email");

        let (status, body) = send(&app, Method::POST, "/people", Some(json!({ "uid": "1" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, _) = send(&app, Method::GET, "/planets/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_entities_are_not_found() {
        let (status, body) = send(&app(), Method::GET, "/people/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["entity"], "people");
        assert_eq!(body["id"], 99);
    }

    #[tokio::test]
    async fn catalog_update_replaces_record() {
        let app = app();
        let id = create(&app, "/planets", json!({ "uid": "1", "name": "Tatooin" })).await;
        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/planets/{id}"),
            Some(json!({ "uid": "1", "name": "Tatooine" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": id, "uid": "1", "name": "Tatooine" }));
    }

    #[tokio::test]
    async fn user_update_keeps_or_rehashes_credential() {
        let app = app();
        let id = create(&app, "/users", json!({ "email": "a@b.io", "password": "pw" })).await;
        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/users/{id}"),
            Some(json!({ "email": "c@d.io", "password": "pw", "is_active": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": id, "email": "c@d.io", "is_active": false }));
    }

    #[tokio::test]
    async fn favorite_to_missing_person_is_rejected() {
        let app = app();
        let user = create(&app, "/users", json!({ "email": "a@b.io", "password": "pw" })).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/favorites",
            Some(json!({ "user_id": user, "people_id": 404 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["constraint"], "favorite_people_id_fkey");
    }

    #[tokio::test]
    async fn favorite_needs_exactly_one_target() {
        let app = app();
        let user = create(&app, "/users", json!({ "email": "a@b.io", "password": "pw" })).await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/favorites",
            Some(json!({ "user_id": user, "people_id": 1, "planet_id": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn favorites_flow_and_user_cascade() {
        let app = app();
        let user = create(&app, "/users", json!({ "email": "leia@alderaan.org", "password": "pw" })).await;
        let luke = create(&app, "/people", json!({ "uid": "1", "name": "Luke Skywalker" })).await;
        let naboo = create(&app, "/planets", json!({ "uid": "8", "name": "Naboo" })).await;

        let (status, fav) = send(
            &app,
            Method::POST,
            &format!("/users/{user}/favorites/people/{luke}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(fav["type"], "people");
        assert_eq!(fav["name"], "Luke Skywalker");

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/users/{user}/favorites/people/{luke}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["constraint"], "uq_user_people_fav");

        let (status, fav) = send(
            &app,
            Method::POST,
            "/favorites",
            Some(json!({ "user_id": user, "planet_id": naboo })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(fav["type"], "planet");
        assert_eq!(fav["uid"], "8");

        let (_, list) = send(&app, Method::GET, &format!("/users/{user}/favorites"), None).await;
        assert_eq!(list.as_array().unwrap().len(), 2);

        let (status, _) = send(&app, Method::DELETE, &format!("/users/{user}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, all) = send(&app, Method::GET, "/favorites", None).await;
        assert_eq!(all, json!([]));
        let (status, _) = send(&app, Method::GET, &format!("/users/{user}/favorites"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn removing_a_pair_favorite() {
        let app = app();
        let user = create(&app, "/users", json!({ "email": "a@b.io", "password": "pw" })).await;
        let hoth = create(&app, "/planets", json!({ "uid": "4", "name": "Hoth" })).await;
        let path = format!("/users/{user}/favorites/planet/{hoth}");

        create(&app, &path, Value::Null).await;
        let (status, _) = send(&app, Method::DELETE, &path, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, &path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
