use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod password;
pub mod service;
pub mod token;
pub mod validate;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
