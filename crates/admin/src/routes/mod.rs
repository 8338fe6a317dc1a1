//! HTTP route handlers for the admin JSON API.

pub mod assets;
pub mod bulk;
pub mod forecast;
pub mod orders;
pub mod styles;
pub mod template;

use axum::Router;

use crate::state::AppState;

/// Assemble every API route.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(styles::routes())
        .merge(orders::routes())
        .merge(forecast::routes())
        .merge(bulk::routes())
        .merge(template::routes())
        .merge(assets::routes())
}
