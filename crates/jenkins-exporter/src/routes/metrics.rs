use axum::{
    extract::State,
    http::header,
    response::{
        IntoResponse,
        Response,
    },
};
use jenkins_exporter_core::exposition::text_content_type;

use crate::error::ApiResult;
use crate::state::AppState;

/// Runs one scrape cycle against Jenkins. If the client goes away the
/// future is dropped and outstanding Jenkins calls are cancelled with it.
pub async fn scrape(State(state): State<AppState>) -> ApiResult<Response> {
    let scrape = state.collector.collect().await?;
    let body = state.collector.render(&scrape)?;

    state.record_scrape(scrape.duration, scrape.jobs.len()).await;

    Ok(([(header::CONTENT_TYPE, text_content_type())], body).into_response())
}
