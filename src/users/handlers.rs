use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    error::AppResult,
    extract::{ApiJson, ApiPath},
    state::AppState,
    store::UserFields,
    users::{
        dto::{UserRequest, UserResponse},
        password::{hash_password, verify_password},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UserRequest>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<UserResponse>)> {
    let payload = payload.validated()?;
    let password = hash_password(&payload.password, &state.config.secret_key)?;

    let user = state
        .store
        .create_user(UserFields {
            email: payload.email,
            password,
            is_active: payload.is_active,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "user created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/users/{}", user.id))],
        Json(user.into()),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<UserResponse>> {
    let user = state.store.get_user(id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UserRequest>,
) -> AppResult<Json<UserResponse>> {
    let payload = payload.validated()?;
    let existing = state.store.get_user(id).await?;

    // An unchanged credential keeps its stored hash.
    let secret = &state.config.secret_key;
    let password = if verify_password(&payload.password, &existing.password, secret)? {
        existing.password
    } else {
        hash_password(&payload.password, secret)?
    };

    let user = state
        .store
        .update_user(
            id,
            UserFields {
                email: payload.email,
                password,
                is_active: payload.is_active,
            },
        )
        .await?;

    info!(user_id = user.id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.store.delete_user(id).await?;
    info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
