pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod sheet;
pub mod summary;
pub mod upload;
pub mod validator;
pub mod whitelist;

use crate::state::AppState;
use axum::Router;

pub fn router(upload_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes(upload_max_bytes))
}
