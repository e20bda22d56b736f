//! HTTP front end
//!
//! Receives sensor readings and voice text as JSON, hands them to the
//! bridge pool, and reports per-display outcomes.
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /health` | service status and open connection count |
//! | `POST /sensor` | temperature/humidity/moisture from a sensor unit |
//! | `POST /voice` | text for the voice box |
//! | `GET /status` | last known readings per device |

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;

/// Build the router over shared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/sensor", post(handlers::sensor))
        .route("/voice", post(handlers::voice))
        .route("/status", get(handlers::status))
        .with_state(state)
}
