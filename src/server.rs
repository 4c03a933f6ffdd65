//! JSON HTTP server for the context store and issue lister.
//!
//! This is the backend the file-management UI drives: context file CRUD,
//! the direct-drop ingestion path, scenario reset, and the repository issue
//! listing, all over plain JSON.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/context` | List context file names |
//! | `GET`    | `/context/{name}` | Read one context file |
//! | `POST`   | `/context` | Create or overwrite from add-dialog fields |
//! | `POST`   | `/context/drop` | Direct drop: write with no confirm step |
//! | `DELETE` | `/context/{name}` | Delete a context file |
//! | `POST`   | `/context/reset` | Empty the context directory |
//! | `GET`    | `/issues` | List repository issues (open/closed/all) |
//! | `GET`    | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "context file not found: x.md" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `no_remote` (412),
//! `issue_error` (502), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based UIs can
//! call the API directly.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::ingest::{self, DroppedItem, DroppedPayload};
use crate::issues::{self, IssueError};
use crate::models::{ContextFile, FileKind};
use crate::store::{ContextStore, StoreError};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<ContextStore>,
}

/// Starts the HTTP server.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let store = ContextStore::open(&config.project.context_dir)?;

    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::new(store),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/context", get(handle_list).post(handle_create))
        .route("/context/drop", post(handle_drop))
        .route("/context/reset", post(handle_reset))
        .route("/context/{name}", get(handle_read).delete(handle_delete))
        .route("/issues", get(handle_issues))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("context-keep server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => not_found(e.to_string()),
            StoreError::InvalidName(_) => bad_request(e.to_string()),
            StoreError::Io(_) => internal(e.to_string()),
        }
    }
}

impl From<IssueError> for AppError {
    fn from(e: IssueError) -> Self {
        match e {
            IssueError::NoRemote => AppError {
                status: StatusCode::PRECONDITION_FAILED,
                code: "no_remote".to_string(),
                message: e.to_string(),
            },
            IssueError::Command(_) | IssueError::Parse(_) => AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "issue_error".to_string(),
                message: e.to_string(),
            },
        }
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /context ============

/// JSON response body for `GET /context`.
#[derive(Serialize)]
struct ListResponse {
    files: Vec<String>,
}

async fn handle_list(State(state): State<AppState>) -> Result<Json<ListResponse>, AppError> {
    let files = state.store.list()?;
    Ok(Json(ListResponse { files }))
}

// ============ GET /context/{name} ============

async fn handle_read(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ContextFile>, AppError> {
    let file = state.store.read(&name)?;
    Ok(Json(file))
}

// ============ POST /context ============

/// Add-dialog payload: explicit name and content, kind optional (derived
/// from the name when omitted).
#[derive(Deserialize)]
struct CreateRequest {
    name: String,
    content: String,
    kind: Option<FileKind>,
}

async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<ContextFile>), AppError> {
    let kind = req
        .kind
        .unwrap_or_else(|| crate::classify::kind_of(&req.name));
    let file =
        ingest::manual(&req.name, &req.content, kind).map_err(|e| bad_request(e.to_string()))?;
    state.store.write(&file)?;
    Ok((StatusCode::CREATED, Json(file)))
}

// ============ POST /context/drop ============

/// Direct-drop payload. A text drop carries `content`; a binary drop
/// carries base64 `data`. Exactly one must be present.
#[derive(Deserialize)]
struct DropRequest {
    name: String,
    content: Option<String>,
    data: Option<String>,
}

async fn handle_drop(
    State(state): State<AppState>,
    Json(req): Json<DropRequest>,
) -> Result<(StatusCode, Json<ContextFile>), AppError> {
    let payload = match (req.content, req.data) {
        (Some(text), None) => DroppedPayload::Text(text),
        (None, Some(data)) => {
            use base64::{engine::general_purpose::STANDARD, Engine as _};
            let bytes = STANDARD
                .decode(data.as_bytes())
                .map_err(|e| bad_request(format!("data is not valid base64: {}", e)))?;
            DroppedPayload::Bytes(bytes)
        }
        _ => return Err(bad_request("exactly one of 'content' or 'data' required")),
    };

    let item = DroppedItem {
        name: req.name,
        payload,
    };
    let file =
        ingest::drop_onto_view(&state.store, &item).map_err(|e| bad_request(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(file)))
}

// ============ DELETE /context/{name} ============

async fn handle_delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete(&name)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ POST /context/reset ============

async fn handle_reset(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.reset()?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ GET /issues ============

async fn handle_issues(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let report = issues::fetch_issues(&state.config.issues)?;
    Ok(Json(serde_json::json!({
        "open": report.open,
        "closed": report.closed,
        "all": report.combined(),
    })))
}
