use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    error::AppResult,
    extract::{ApiJson, ApiPath},
    favorites::dto::{FavoriteRequest, FavoriteResponse},
    state::AppState,
    store::{FavoriteTarget, NewFavorite},
};

type Created = (StatusCode, [(header::HeaderName, String); 1], Json<FavoriteResponse>);

pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites).post(create_favorite))
        .route("/favorites/:id", get(get_favorite).delete(delete_favorite))
}

/// Per-user routes, in the `/users/:id/favorites/<kind>/:target_id` shape.
pub fn user_favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:id/favorites", get(list_user_favorites))
        .route(
            "/users/:id/favorites/people/:people_id",
            post(add_people_favorite).delete(remove_people_favorite),
        )
        .route(
            "/users/:id/favorites/planet/:planet_id",
            post(add_planet_favorite).delete(remove_planet_favorite),
        )
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<FavoriteResponse>>> {
    let favorites = state.store.list_favorites().await?;
    Ok(Json(favorites.into_iter().map(FavoriteResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_favorite(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<FavoriteRequest>,
) -> AppResult<Created> {
    insert(&state, payload.into_new()?).await
}

#[instrument(skip(state))]
pub async fn get_favorite(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<FavoriteResponse>> {
    Ok(Json(state.store.get_favorite(id).await?.into()))
}

#[instrument(skip(state))]
pub async fn delete_favorite(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.store.delete_favorite(id).await?;
    info!(favorite_id = id, "favorite deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_user_favorites(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i32>,
) -> AppResult<Json<Vec<FavoriteResponse>>> {
    let favorites = state.store.list_user_favorites(user_id).await?;
    Ok(Json(favorites.into_iter().map(FavoriteResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn add_people_favorite(
    State(state): State<AppState>,
    ApiPath((user_id, people_id)): ApiPath<(i32, i32)>,
) -> AppResult<Created> {
    let target = FavoriteTarget::People(people_id);
    insert(&state, NewFavorite { user_id, target }).await
}

#[instrument(skip(state))]
pub async fn add_planet_favorite(
    State(state): State<AppState>,
    ApiPath((user_id, planet_id)): ApiPath<(i32, i32)>,
) -> AppResult<Created> {
    let target = FavoriteTarget::Planet(planet_id);
    insert(&state, NewFavorite { user_id, target }).await
}

#[instrument(skip(state))]
pub async fn remove_people_favorite(
    State(state): State<AppState>,
    ApiPath((user_id, people_id)): ApiPath<(i32, i32)>,
) -> AppResult<StatusCode> {
    remove(&state, user_id, FavoriteTarget::People(people_id)).await
}

#[instrument(skip(state))]
pub async fn remove_planet_favorite(
    State(state): State<AppState>,
    ApiPath((user_id, planet_id)): ApiPath<(i32, i32)>,
) -> AppResult<StatusCode> {
    remove(&state, user_id, FavoriteTarget::Planet(planet_id)).await
}

async fn insert(state: &AppState, new: NewFavorite) -> AppResult<Created> {
    let favorite = state.store.create_favorite(new).await?;
    info!(favorite_id = favorite.id, user_id = new.user_id, target = ?new.target, "favorite created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/favorites/{}", favorite.id))],
        Json(favorite.into()),
    ))
}

async fn remove(state: &AppState, user_id: i32, target: FavoriteTarget) -> AppResult<StatusCode> {
    state.store.delete_favorite_for(user_id, target).await?;
    info!(user_id, target = ?target, "favorite removed");
    Ok(StatusCode::NO_CONTENT)
}
