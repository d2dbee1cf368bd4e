pub mod codec;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod negotiation;
pub mod params;
pub mod routes;
pub mod state;

pub use errors::ApiError;
pub use routes::create_doh_routes;
pub use state::AppState;
