use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod password;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
