mod category;
pub(crate) mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

pub use category::FoodCategory;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::food_routes())
}
