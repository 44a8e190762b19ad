//! HTTP surface for the document intake service.
//!
//! This module exposes a compact Axum router:
//!
//! - `GET /` and `GET /health` – Liveness probes.
//! - `POST /documents/upload` – Accept a multipart `file`, store it, run the processing pipeline,
//!   and return the persisted record including `ai_workflow` and (when an extractor ran)
//!   `processing_results`.
//! - `GET /documents` – List stored records.
//! - `GET /documents/:id` – Fetch one record.
//! - `GET /files/*key` – Serve stored bytes; this is the URL space `storage_url` points into.
//! - `GET /metrics` – Intake counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.

use crate::documents::{DocumentRecord, StoreError};
use crate::intake::{IntakeApi, IntakeError, Upload};
use crate::metrics::MetricsSnapshot;
use crate::storage::StorageError;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Name of the multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// Build the HTTP router exposing the intake API surface.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: IntakeApi + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route(
            "/documents/upload",
            post(upload_document::<S>).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/documents", get(list_documents::<S>))
        .route("/documents/:id", get(get_document::<S>))
        .route("/files/*key", get(get_file::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Document intake service is running" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Store an uploaded file and run it through the pipeline.
///
/// The first multipart field named `file` is used; other fields are ignored. A missing content
/// type is passed through as-is so the pipeline can record why the upload was skipped.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<DocumentRecord>, AppError>
where
    S: IntakeApi,
{
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::BadRequest(error.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let original_filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::BadRequest(error.body_text()))?;
        upload = Some(Upload {
            original_filename,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or(AppError::Intake(IntakeError::MissingFile))?;
    let record = service.upload(upload).await?;
    tracing::info!(
        id = %record.id,
        content_type = %record.document.content_type,
        extracted = record
            .document
            .processing_results
            .as_ref()
            .map(|results| results.success()),
        "Upload request completed"
    );
    Ok(Json(record))
}

async fn list_documents<S>(
    State(service): State<Arc<S>>,
) -> Result<Json<Vec<DocumentRecord>>, AppError>
where
    S: IntakeApi,
{
    Ok(Json(service.list_documents().await?))
}

async fn get_document<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentRecord>, AppError>
where
    S: IntakeApi,
{
    Ok(Json(service.get_document(&id).await?))
}

/// Serve the raw bytes stored under `key`.
async fn get_file<S>(
    State(service): State<Arc<S>>,
    Path(key): Path<String>,
) -> Result<Response, AppError>
where
    S: IntakeApi,
{
    let bytes = service.open_file(&key).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: IntakeApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload",
                method: "POST",
                path: "/documents/upload",
                description: "Upload a file as multipart field `file`. The response is the stored record with `ai_workflow` and, when text or an image was processed, `processing_results`.",
            },
            CommandDescriptor {
                name: "list_documents",
                method: "GET",
                path: "/documents",
                description: "Return stored document records, oldest first (at most 100).",
            },
            CommandDescriptor {
                name: "get_document",
                method: "GET",
                path: "/documents/{id}",
                description: "Return one stored document record.",
            },
            CommandDescriptor {
                name: "get_file",
                method: "GET",
                path: "/files/{key}",
                description: "Return the raw bytes stored under a storage key.",
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return intake counters useful for observability dashboards.",
            },
        ],
    })
}

enum AppError {
    BadRequest(String),
    Intake(IntakeError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Intake(error) => {
                let status = match &error {
                    IntakeError::MissingFile
                    | IntakeError::MissingFilename
                    | IntakeError::Store(StoreError::InvalidId(_))
                    | IntakeError::Storage(StorageError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
                    IntakeError::NotFound(_) | IntakeError::Storage(StorageError::NotFound(_)) => {
                        StatusCode::NOT_FOUND
                    }
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %error, "Request failed");
                }
                (status, error.to_string())
            }
        };
        (status, Json(json!({ "detail": message }))).into_response()
    }
}

impl From<IntakeError> for AppError {
    fn from(inner: IntakeError) -> Self {
        Self::Intake(inner)
    }
}
