mod dto;
pub mod handlers;
mod repo;
mod stage;

pub use stage::CkdStage;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::profile_routes())
}
