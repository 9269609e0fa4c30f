use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod templates;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::form_routes())
}
