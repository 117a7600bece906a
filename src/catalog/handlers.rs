use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    catalog::dto::{EntryRequest, EntryResponse},
    error::AppResult,
    extract::{ApiJson, ApiPath},
    state::AppState,
    store::CatalogKind,
};

/// Mounts list/create under `base` and get/update/delete under `base/:id`.
pub fn entry_routes(kind: CatalogKind, base: &'static str) -> Router<AppState> {
    Router::new()
        .route(
            base,
            get(move |state: State<AppState>| list_entries(state, kind)).post(
                move |state: State<AppState>, body: ApiJson<EntryRequest>| {
                    create_entry(state, body, kind, base)
                },
            ),
        )
        .route(
            &format!("{base}/:id"),
            get(move |state: State<AppState>, id: ApiPath<i32>| get_entry(state, id, kind))
                .put(
                    move |state: State<AppState>, id: ApiPath<i32>, body: ApiJson<EntryRequest>| {
                        update_entry(state, id, body, kind)
                    },
                )
                .delete(move |state: State<AppState>, id: ApiPath<i32>| {
                    delete_entry(state, id, kind)
                }),
        )
}

#[instrument(skip(state))]
async fn list_entries(
    State(state): State<AppState>,
    kind: CatalogKind,
) -> AppResult<Json<Vec<EntryResponse>>> {
    let entries = state.store.list_entries(kind).await?;
    Ok(Json(entries.into_iter().map(EntryResponse::from).collect()))
}

#[instrument(skip(state, payload))]
async fn create_entry(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<EntryRequest>,
    kind: CatalogKind,
    base: &'static str,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<EntryResponse>)> {
    let entry = state.store.create_entry(kind, payload.into_fields()?).await?;
    info!(table = kind.table(), id = entry.id, uid = %entry.uid, "entry created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("{base}/{}", entry.id))],
        Json(entry.into()),
    ))
}

#[instrument(skip(state))]
async fn get_entry(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    kind: CatalogKind,
) -> AppResult<Json<EntryResponse>> {
    Ok(Json(state.store.get_entry(kind, id).await?.into()))
}

#[instrument(skip(state, payload))]
async fn update_entry(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<EntryRequest>,
    kind: CatalogKind,
) -> AppResult<Json<EntryResponse>> {
    let entry = state
        .store
        .update_entry(kind, id, payload.into_fields()?)
        .await?;
    info!(table = kind.table(), id, "entry updated");
    Ok(Json(entry.into()))
}

#[instrument(skip(state))]
async fn delete_entry(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    kind: CatalogKind,
) -> AppResult<StatusCode> {
    state.store.delete_entry(kind, id).await?;
    info!(table = kind.table(), id, "entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
