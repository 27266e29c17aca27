use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use std::io::ErrorKind;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use dbf_reader::{DbfError, DbfReader, Record};

use crate::state::app_state::{AppState, SharedReader};
use crate::utils::conf_helper;

#[derive(Serialize)]
pub struct ReaderSummary {
    pub id: String,
    pub path: String,
    pub record_count: u32,
    pub fields_count: usize,
    pub headers: Vec<String>, // original field names, declaration order
}

/// Response for GET /readers/{id}/headers
#[derive(Serialize)]
pub struct ReaderHeaders {
    pub id: String,
    pub headers: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct FileReadRequest {
    pub mode: String, // "online" | "offline"
    pub path: String,
}

#[derive(Serialize, Debug)]
pub struct FileReadResponse {
    pub id: String,
    pub name: String,
    pub path: String,
    pub source: String,
    pub headers: Option<Vec<String>>,
    pub record_count: u32,
    pub desc: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub source_url: Option<String>,
}

/// =======================
/// ROUTER
/// =======================

pub fn data_routes(state: AppState) -> Router {
    Router::new()
        .route("/read-file", post(read_file))
        .route("/fetch/{header}/{index}", get(fetch_value))
        .route("/readers", get(list_readers))
        .route("/readers/{id}/headers", get(reader_headers))
        .route("/readers/{id}/records/{index}", get(read_record))
        .with_state(state)
}

fn error_status(e: &DbfError) -> StatusCode {
    match e {
        DbfError::Io(io) if io.kind() == ErrorKind::NotFound => StatusCode::NOT_FOUND,
        DbfError::Io(_) | DbfError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        DbfError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        DbfError::Truncated { .. }
        | DbfError::UnrecognizedFieldType(_)
        | DbfError::TruncatedRecord { .. }
        | DbfError::MalformedValue { .. }
        | DbfError::CorruptedLayout(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Decodes one record on the blocking pool. Many of these may run against
/// the same reader at once.
async fn read_blocking(reader: SharedReader, index: u32) -> Result<Record, StatusCode> {
    match tokio::task::spawn_blocking(move || reader.read(index)).await {
        Ok(Ok(record)) => Ok(record),
        Ok(Err(e)) => {
            warn!("Record {} read failed: {}", index, e);
            Err(error_status(&e))
        }
        Err(e) => {
            error!("Record read task failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// =======================
/// HANDLERS
/// =======================

async fn read_file(
    State(state): State<AppState>,
    Json(request): Json<FileReadRequest>,
) -> Response {
    debug!("Reading file: mode={}, path={}", request.mode, request.path);

    if let Ok(config) = conf_helper::get_cached_config() {
        if !config.accepts(&request.path) {
            warn!("Rejected {}: not one of {:?}", request.path, config.file_formats);
            return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
        }
    }

    // Open reader ONCE; every field of the file shares it
    let path = request.path.clone();
    let reader = match tokio::task::spawn_blocking(move || DbfReader::open(path)).await {
        Ok(Ok(r)) => Arc::new(r),
        Ok(Err(e)) => {
            error!("Failed to open file {}: {}", request.path, e);
            return error_status(&e).into_response();
        }
        Err(e) => {
            error!("Open task failed for {}: {}", request.path, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let record_count = reader.len();
    let created_at = reader.header().mod_naive_date().map(|d| d.to_string());
    let desc = format!(
        "dBase version {:#04x}, {} records, {} fields",
        reader.header().version,
        record_count,
        reader.fields().len()
    );

    let (file_id, headers) = state.register(request.path.clone(), reader).await;
    info!("Registered {} as {} with headers {:?}", request.path, file_id, headers);

    let file_name = std::path::Path::new(&request.path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string();

    Json(FileReadResponse {
        id: file_id,
        name: file_name,
        path: request.path.clone(),
        source: request.path,
        headers: Some(headers),
        record_count,
        desc: Some(desc),
        tags: Some(vec!["dbf".to_string()]),
        created_at,
        source_url: None,
    })
    .into_response()
}

async fn list_readers(State(state): State<AppState>) -> Json<Vec<ReaderSummary>> {
    let readers = state.readers.read().await;

    let mut out: Vec<ReaderSummary> = readers
        .iter()
        .map(|(id, file)| {
            let headers: Vec<String> = file
                .reader
                .field_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            ReaderSummary {
                id: id.clone(),
                path: file.path.clone(),
                record_count: file.reader.len(),
                fields_count: headers.len(),
                headers,
            }
        })
        .collect();
    out.sort_by(|a, b| a.path.cmp(&b.path));

    Json(out)
}

async fn reader_headers(
    State(state): State<AppState>,
    Path(reader_id): Path<String>,
) -> Response {
    let Some(file) = state.reader(&reader_id).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let headers = file
        .reader
        .field_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    Json(ReaderHeaders {
        id: reader_id,
        headers,
    })
    .into_response()
}

async fn read_record(
    State(state): State<AppState>,
    Path((reader_id, index)): Path<(String, u32)>,
) -> Response {
    let Some(file) = state.reader(&reader_id).await else {
        error!("Reader not found: {}", reader_id);
        return StatusCode::NOT_FOUND.into_response();
    };

    match read_blocking(file.reader, index).await {
        Ok(record) => Json(record).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn fetch_value(
    State(state): State<AppState>,
    Path((header, index)): Path<(String, u32)>,
) -> Response {
    let Some(field) = state.field(&header).await else {
        error!("Header not found: {}", header);
        return StatusCode::NOT_FOUND.into_response();
    };

    debug!(
        "Fetching {} (field {} of reader {}) at record {}",
        header, field.original_name, field.reader_id, index
    );

    match read_blocking(field.reader, index).await {
        Ok(mut record) => match record.remove(&field.original_name) {
            Some(value) => Json(value).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        Err(status) => status.into_response(),
    }
}
