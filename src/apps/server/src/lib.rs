//! Campus Assistant HTTP server
//!
//! `POST /api/chat` streams an AI SDK UI message stream; `GET /health` reports
//! liveness.

pub mod logging;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
