use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthData {
    pub status: String,
}

pub async fn health_check() -> Json<HealthData> {
    Json(HealthData {
        status: "ok".to_string(),
    })
}
