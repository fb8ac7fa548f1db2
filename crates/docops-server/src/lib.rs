//! DocOps server — HTTP API over the analyzer and the case store.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
