use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::errors::{Result, TrendAnalysisError};
use crate::models::{CompositeResult, SummaryItem};
use crate::AppState;

#[derive(Deserialize)]
pub struct DetailQuery {
    pub keyword: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache_size: usize,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub status: String,
    pub generated_at: String,
    pub count: usize,
    pub data: Vec<SummaryItem>,
}

type ApiError = (StatusCode, Json<Value>);

// Проверка здоровья сервиса
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        cache_size: state.analysis.cache_size().await,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// Сводка по всем поддерживаемым ключевым словам для главного экрана
pub async fn trends_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    tracing::info!(keywords = state.keywords.len(), "Строим сводку трендов");

    let results = state.analysis.summary(&state.keywords).await;
    let data: Vec<SummaryItem> = results.iter().map(SummaryItem::from).collect();

    Json(SummaryResponse {
        status: "ok".to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        count: data.len(),
        data,
    })
}

// Полная разбивка по одному ключевому слову
pub async fn trends_detail(
    State(state): State<AppState>,
    Query(query): Query<DetailQuery>,
) -> std::result::Result<Json<CompositeResult>, ApiError> {
    let keyword = resolve_keyword(query.keyword.as_deref(), &state.keywords).map_err(|e| {
        tracing::warn!("Некорректный запрос детализации: {}", e);
        reject(e, &state.keywords)
    })?;

    Ok(Json(state.analysis.analyze(&keyword).await))
}

/// Нормализует пробелы и проверяет, что ключевое слово поддерживается
pub fn resolve_keyword(raw: Option<&str>, supported: &[String]) -> Result<String> {
    let keyword = raw
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if keyword.is_empty() {
        return Err(TrendAnalysisError::MissingKeyword);
    }
    if !supported.iter().any(|k| *k == keyword) {
        return Err(TrendAnalysisError::UnsupportedKeyword(keyword));
    }
    Ok(keyword)
}

fn reject(err: TrendAnalysisError, supported: &[String]) -> ApiError {
    match err {
        TrendAnalysisError::UnsupportedKeyword(keyword) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("Keyword '{}' is not in the supported list.", keyword),
                "supported_keywords": supported,
            })),
        ),
        TrendAnalysisError::MissingKeyword => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing 'keyword' query parameter." })),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": other.to_string() })),
        ),
    }
}

// Создание маршрутов
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/trends/summary", get(trends_summary))
        .route("/api/trends/detail", get(trends_detail))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
