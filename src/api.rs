//! REST API for TranscriptChain
//!
//! Stages incoming courses, commits them as transcript blocks and exposes the
//! read side of the chain: block listing, lookup by index and validation.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use crate::blockchain::{format_timestamp, Block};
use crate::crypto::digest_to_hex;
use crate::error::{ChainError, TamperCause};
use crate::ledger::Ledger;
use crate::transcript::{Course, Transcript, TranscriptHeader};

const MAX_PAGE_LIMIT: usize = 100;

/// Shared handler state. The single lock serializes every access to the ledger.
#[derive(Clone, Default)]
pub struct ApiState {
    pub ledger: Arc<RwLock<Ledger>>,
}

impl ApiState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Ledger(ChainError),
    InvalidInput(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Ledger(e @ ChainError::InvalidCourse(_))
            | ApiError::Ledger(e @ ChainError::InvalidTranscript(_))
            | ApiError::Ledger(e @ ChainError::EmptyStagingArea) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Ledger(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::Ledger(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// JSON rendering of a block with hex digests and the hashed timestamp text.
#[derive(Serialize)]
pub struct BlockView<'a> {
    pub index: usize,
    pub timestamp: String,
    pub prev_hash: String,
    pub merkle_root: String,
    pub hash: String,
    pub transcript: &'a Transcript,
}

impl<'a> BlockView<'a> {
    fn new(index: usize, block: &'a Block) -> Self {
        BlockView {
            index,
            timestamp: format_timestamp(block.timestamp()),
            prev_hash: digest_to_hex(block.prev_hash()),
            merkle_root: digest_to_hex(block.merkle_root()),
            hash: block.hash_hex(),
            transcript: block.transcript(),
        }
    }
}

#[derive(Serialize)]
struct BlocksResponse<'a> {
    blocks: Vec<BlockView<'a>>,
    total: usize,
    page: usize,
    limit: usize,
}

#[derive(Serialize)]
struct CoursesResponse<'a> {
    count: usize,
    courses: &'a [Course],
}

#[derive(Serialize)]
struct StagedResponse {
    message: String,
    staged: usize,
}

#[derive(Serialize)]
struct ValidationResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<TamperCause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Deserialize)]
struct PaginationQuery {
    #[serde(default)]
    page: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

// ============================================================================
// Middleware
// ============================================================================

/// Logs method, path, status and duration of every request.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints nested under `/api`.
pub fn build_api_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    let api_routes = Router::new()
        // Staging endpoints
        .route("/courses", get(get_staged_courses).post(stage_course))
        // Chain endpoints
        .route("/blocks", get(get_blocks).post(commit_block))
        .route("/blocks/:index", get(get_block_by_index))
        .route("/chain/validate", get(validate_chain))
        // System endpoints
        .route("/health", get(health_check))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

/// Bind to `addr` and serve until the process exits.
pub async fn run_api_server(
    state: ApiState,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_api_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "api.listening");

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    Json(serde_json::json!({
        "status": "healthy",
        "height": ledger.chain().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn stage_course(
    State(state): State<ApiState>,
    payload: Result<Json<Course>, JsonRejection>,
) -> Result<(StatusCode, Json<StagedResponse>), ApiError> {
    let Json(course) = payload?;

    let mut ledger = state.ledger.write().await;
    ledger.stage_course(course)?;

    Ok((
        StatusCode::CREATED,
        Json(StagedResponse {
            message: "Course added successfully".to_string(),
            staged: ledger.staged_courses().len(),
        }),
    ))
}

async fn get_staged_courses(State(state): State<ApiState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let courses = ledger.staged_courses();
    Json(CoursesResponse {
        count: courses.len(),
        courses,
    })
    .into_response()
}

async fn commit_block(
    State(state): State<ApiState>,
    payload: Result<Json<TranscriptHeader>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(header) = payload?;

    let mut ledger = state.ledger.write().await;
    let index = ledger.chain().len();
    let block = ledger.commit(header)?;

    Ok((StatusCode::CREATED, Json(BlockView::new(index, block))).into_response())
}

async fn get_blocks(
    State(state): State<ApiState>,
    Query(pagination): Query<PaginationQuery>,
) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let blocks = ledger.chain().blocks();
    let limit = pagination.limit.clamp(1, MAX_PAGE_LIMIT);
    let start = pagination.page.saturating_mul(limit);

    let page: Vec<BlockView> = blocks
        .iter()
        .enumerate()
        .skip(start)
        .take(limit)
        .map(|(index, block)| BlockView::new(index, block))
        .collect();

    Json(BlocksResponse {
        blocks: page,
        total: blocks.len(),
        page: pagination.page,
        limit,
    })
    .into_response()
}

async fn get_block_by_index(
    State(state): State<ApiState>,
    Path(index): Path<i64>,
) -> Result<Response, ApiError> {
    let ledger = state.ledger.read().await;
    let block = ledger
        .chain()
        .get_block(index)
        .ok_or_else(|| ApiError::NotFound(format!("Block {} not found", index)))?;

    // get_block only succeeds for 0 <= index < len
    Ok(Json(BlockView::new(index as usize, block)).into_response())
}

async fn validate_chain(State(state): State<ApiState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let response = match ledger.validate() {
        Ok(()) => ValidationResponse {
            valid: true,
            index: None,
            cause: None,
            message: None,
        },
        Err(e) => ValidationResponse {
            valid: false,
            index: Some(e.index),
            cause: Some(e.cause),
            message: Some(e.to_string()),
        },
    };
    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use serde_json::Value;

    fn committed_ledger(students: &[&str]) -> Ledger {
        let mut ledger = Ledger::new();
        for student_id in students {
            ledger
                .stage_course(Course::new("CPE102", "Computer Programming I", "1/2023", 3, "B+"))
                .unwrap();
            ledger
                .commit(TranscriptHeader {
                    student_id: student_id.to_string(),
                    student_name: "Teerachot Sonnok".to_string(),
                    faculty: "Engineering".to_string(),
                    major: "Computer Engineering".to_string(),
                    university: "Khon Kaen University".to_string(),
                    gpa: 3.75,
                })
                .unwrap();
        }
        ledger
    }

    async fn validate(ledger: Ledger) -> Value {
        let server = TestServer::new(build_api_router(ApiState::new(ledger))).unwrap();
        let response = server.get("/api/chain/validate").await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    #[tokio::test]
    async fn test_validate_reports_tampered_hash() {
        let mut ledger = committed_ledger(&["B6419936"]);
        ledger.chain_mut().block_mut(1).transcript.student_id = "B6477777".to_string();

        let body = validate(ledger).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["index"], 1);
        assert_eq!(body["cause"], "tampered_hash");
        assert_eq!(body["message"], "block 1 is invalid: invalid block hash");
    }

    #[tokio::test]
    async fn test_validate_reports_tampered_merkle_root() {
        let mut ledger = committed_ledger(&["B6419936"]);
        ledger.chain_mut().block_mut(1).transcript.courses[0].grade = "A".to_string();

        let body = validate(ledger).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["index"], 1);
        assert_eq!(body["cause"], "tampered_merkle_root");
    }

    #[tokio::test]
    async fn test_validate_reports_broken_link() {
        let mut ledger = committed_ledger(&["B6419936", "B6419937"]);
        let foreign = committed_ledger(&["X0000001", "X0000002"]).chain().blocks()[2].clone();
        ledger.chain_mut().replace_block(2, foreign);

        let body = validate(ledger).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["index"], 2);
        assert_eq!(body["cause"], "broken_link");
    }

    #[tokio::test]
    async fn test_validate_omits_failure_fields_when_valid() {
        let body = validate(committed_ledger(&["B6419936"])).await;
        assert_eq!(body["valid"], true);
        assert!(body.get("index").is_none());
        assert!(body.get("cause").is_none());
    }
}
