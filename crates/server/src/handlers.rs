//! Route handlers. Each one is a thin JSON shell over [`ServiceState`].

use crate::error::{ApiError, ApiResult};
use crate::state::ServiceState;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trendcast_core::{AppError, Table, TrendRecord, TrendWriteup, TrendingSong};

pub type SharedState = Arc<ServiceState>;

#[derive(Debug, Default, Deserialize)]
pub struct TopicRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HashtagsResponse {
    pub hashtags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub message: String,
    pub trends_count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rag_initialized: bool,
    pub trends_count: usize,
    pub model: String,
}

/// The body is read as JSON whatever its `Content-Type`. An empty body
/// counts as `{}`, and so does one that is not the expected JSON.
fn topic(body: &Bytes) -> TopicRequest {
    if body.iter().all(u8::is_ascii_whitespace) {
        return TopicRequest::default();
    }
    match Json::<TopicRequest>::from_bytes(body) {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(%rejection, "Unparsable request body; using default topic");
            TopicRequest::default()
        }
    }
}

/// POST /generate-hashtags
pub async fn generate_hashtags(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<Json<HashtagsResponse>> {
    let request = topic(&body);
    let hashtags = state.hashtags(request.prompt.as_deref()).await?;
    Ok(Json(HashtagsResponse { hashtags }))
}

/// POST /generate-content
pub async fn generate_content(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<Json<ContentResponse>> {
    let request = topic(&body);
    let content = state.content(request.prompt.as_deref()).await?;
    Ok(Json(ContentResponse { content }))
}

/// POST /askai
pub async fn ask_ai(
    State(state): State<SharedState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Json<ContentResponse>> {
    let Json(request) = body.map_err(|rejection| {
        AppError::Validation(format!("Expected a JSON body with a prompt: {}", rejection))
    })?;

    let prompt = request.prompt.unwrap_or_default();
    let content = state
        .ask(&prompt, request.content.as_deref().unwrap_or_default().trim())
        .await?;
    Ok(Json(ContentResponse { content }))
}

/// POST /reload-data
pub async fn reload_data(State(state): State<SharedState>) -> ApiResult<Json<ReloadResponse>> {
    let trends_count = state.reload().await.map_err(ApiError::internal)?;
    Ok(Json(ReloadResponse {
        message: "Trend index reloaded".to_string(),
        trends_count,
    }))
}

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let index = state.index();
    Json(HealthResponse {
        status: "healthy",
        rag_initialized: index.is_initialized(),
        trends_count: index.len(),
        model: state.model().to_string(),
    })
}

async fn read_table<T: DeserializeOwned>(state: &ServiceState, table: Table) -> ApiResult<Json<Vec<T>>> {
    let rows = state.store().read(table).await?;
    Ok(Json(rows))
}

/// GET /trends/twitter
pub async fn twitter_trends(State(state): State<SharedState>) -> ApiResult<Json<Vec<TrendRecord>>> {
    read_table(&state, Table::TwitterTrends).await
}

/// GET /trends/reels
pub async fn current_reels(State(state): State<SharedState>) -> ApiResult<Json<Vec<TrendWriteup>>> {
    read_table(&state, Table::CurrentReels).await
}

/// GET /trends/reels/archived
pub async fn archived_reels(State(state): State<SharedState>) -> ApiResult<Json<Vec<TrendWriteup>>> {
    read_table(&state, Table::ArchivedReels).await
}

/// GET /trends/audio
pub async fn trending_audio(State(state): State<SharedState>) -> ApiResult<Json<Vec<TrendingSong>>> {
    read_table(&state, Table::TrendingAudio).await
}
