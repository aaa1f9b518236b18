use axum::{extract::State, http::StatusCode};

use lms_core::health::readiness;

use crate::state::AppState;

/// Handler for `GET /readyz`: ready once the database answers.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness("database", state.db.ping().await)
}
