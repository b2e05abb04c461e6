//! Router assembly.
//!
//! Three route groups with different gate policies: `public` (no token,
//! no rate limit), `open` (no token, rate limited) and `protected`
//! (bearer token, rate limited). Cross-cutting layers wrap the whole
//! tree.

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::middleware;

mod protected;
mod public;

pub use protected::protected_routes;
pub use public::{open_routes, public_routes};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let open = public::open_routes().layer(from_fn_with_state(
        app_state.clone(),
        middleware::rate_limit_middleware,
    ));

    public::public_routes()
        .merge(open)
        .merge(protected::protected_routes(app_state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(middleware::add_security_headers))
                .layer(from_fn(middleware::request_logger_middleware))
                .layer(from_fn(middleware::metrics_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    axum::http::StatusCode::REQUEST_TIMEOUT,
                    std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS),
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}
