use axum::Router;

use crate::state::AppState;

mod dto;
pub mod extractors;
pub mod google;
pub mod handlers;
pub mod jwt;
pub mod lockout;
pub mod password;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
