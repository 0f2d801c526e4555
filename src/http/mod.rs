//! HTTP surface: the `/v1/jeju_onul` pipeline endpoint and the stubbed v2
//! routes (§5).

pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
