use axum::{
    extract::State,
    Json,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scrape: Option<LastScrapeInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LastScrapeInfo {
    pub finished_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub jobs: usize,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let last_scrape = state
        .last_scrape
        .read()
        .await
        .map(|scrape| LastScrapeInfo {
            finished_at: scrape.finished_at,
            duration_seconds: scrape.duration.as_secs_f64(),
            jobs: scrape.jobs,
        });

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        target: state.target().to_string(),
        last_scrape,
    })
}
