use crate::handlers;
use crate::middleware::gateway_headers;
use crate::state::AppState;
use axum::{middleware, routing::get, Router};

/// The DoH endpoint mounted at `path`; every other path is a 404.
pub fn create_doh_routes(state: AppState, path: &str) -> Router {
    Router::new()
        .route(
            path,
            get(handlers::handle_doh)
                .post(handlers::handle_doh)
                .options(handlers::handle_doh),
        )
        .layer(middleware::map_response(gateway_headers))
        .with_state(state)
}
