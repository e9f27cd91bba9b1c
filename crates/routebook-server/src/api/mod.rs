//! API routes for the Routebook server.

pub mod error;
pub mod request_id;
mod routes;

use crate::config::Config;
use crate::state::AppState;
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use routes::{route_location, API_PREFIX};

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}

/// Wrap a router in the standard middleware stack.
pub fn with_middleware(router: Router<Arc<AppState>>, config: &Config) -> Router<Arc<AppState>> {
    let router = router
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http());

    let router = if config.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.layer(middleware::from_fn(request_id::ensure_request_id))
}

/// Build the complete application for `state`.
pub fn app(state: Arc<AppState>) -> Router {
    with_middleware(routes(), state.config()).with_state(state)
}
