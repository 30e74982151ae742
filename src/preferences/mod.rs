mod dto;
pub mod handlers;
mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use handlers::load_preferences;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::preference_routes())
}
