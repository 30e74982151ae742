pub mod handlers;
pub mod rules;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::recommender_routes())
}
