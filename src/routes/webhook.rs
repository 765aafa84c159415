use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::router;
use crate::state::AppState;
use crate::telegram::Update;

/// Transport push endpoint. Always acknowledges with 200 so the transport
/// does not retry; handler failures are dealt with inside the dispatcher.
pub async fn receive_update(
    State(state): State<AppState>,
    Json(update): Json<Update>,
) -> StatusCode {
    tracing::debug!(update_id = update.update_id, "update received");
    router::handle_update(&state, update).await;
    StatusCode::OK
}
