use crate::state::AppState;
use crate::store::CatalogKind;
use axum::Router;

pub mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::entry_routes(CatalogKind::People, "/people"))
        .merge(handlers::entry_routes(CatalogKind::Planet, "/planets"))
}
