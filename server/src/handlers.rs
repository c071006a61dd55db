#![allow(clippy::unused_async)]
use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use kernel::{ErrorResponse, InspectionResult, Provenance, SyncAck, SyncRequest};

use crate::domain::RawUpload;
use crate::error::ApiError;
use crate::file_reply::FileReply;
use crate::intake::{IntakeError, IntakeLimits};
use crate::AppState;

const PHOTOS_FIELD: &str = "photos";
const MAX_BATCH_ID_LEN: usize = 64;

/// Stores up to the configured number of photos and returns the (simulated) inspection.
#[utoipa::path(
    post,
    path = "/api/inspect",
    request_body(content = String, description = "Multipart form with 1 to 3 `photos` file parts", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photos stored and inspected", body = InspectionResult),
        (status = 400, description = "No photos, too many photos or bad file name", body = ErrorResponse),
        (status = 413, description = "Photo exceeds size limit", body = ErrorResponse),
        (status = 415, description = "Not an image", body = ErrorResponse),
        (status = 500, description = "Photos could not be stored", body = ErrorResponse)
    ),
    tag = "inspection",
)]
pub async fn inspect(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<InspectionResult>, ApiError> {
    // A request that is not a multipart form carries no photos at all
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("not a multipart request: {rejection}");
        IntakeError::EmptyRequest
    })?;
    let files = match read_photos(&mut multipart, state.intake.limits()).await {
        Ok(files) => files,
        Err(e) => {
            // read the rest of the body so the client gets the response instead of a reset
            drain(&mut multipart).await;
            return Err(e);
        }
    };

    let stored = state.intake.accept(files).await?;
    Ok(Json(state.analyst.inspect(stored)))
}

/// Returns the provenance record of a produce batch
#[utoipa::path(
    get,
    path = "/api/verify/{batch_id}",
    responses(
        (status = 200, description = "Batch provenance", body = Provenance),
        (status = 400, description = "Malformed batch id", body = ErrorResponse)
    ),
    tag = "provenance",
    params(
        ("batch_id" = String, Path, description = "Batch id printed on the produce QR code")
    ),
)]
pub async fn verify(
    Path(batch_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Provenance>, ApiError> {
    if !is_valid_batch_id(&batch_id) {
        return Err(ApiError::InvalidBatchId(batch_id.escape_default().to_string()));
    }
    Ok(Json(state.analyst.verify(&batch_id)))
}

/// Accepts a federated learning model update from a farm node
#[utoipa::path(
    post,
    path = "/api/federated-sync",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Update accepted", body = SyncAck),
        (status = 400, description = "Body is not a valid update", body = ErrorResponse)
    ),
    tag = "federated",
)]
pub async fn federated_sync(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> Result<Json<SyncAck>, ApiError> {
    let Json(update) = payload?;
    if update.node_id.trim().is_empty() {
        return Err(ApiError::InvalidBody("node_id must not be empty".to_owned()));
    }
    Ok(Json(state.analyst.sync(&update)))
}

/// Gets stored photo content by its generated name
#[utoipa::path(
    get,
    path = "/uploads/{file_name}",
    responses(
        (status = 200, description = "Stored file content"),
        (status = 400, description = "Path escapes the upload directory", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    tag = "uploads",
    params(
        ("file_name" = String, Path, description = "Generated file name")
    ),
)]
pub async fn get_upload(
    Path(file_name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let asset = state.assets.get(&file_name).await?;
    tracing::info!("File size {}", asset.data.len());
    Ok(FileReply::new(asset))
}

async fn read_photos(
    multipart: &mut Multipart,
    limits: IntakeLimits,
) -> Result<Vec<RawUpload>, ApiError> {
    let mut files: Vec<RawUpload> = vec![];
    while let Some(field) = multipart.next_field().await? {
        // Only file parts of the photos field count, text values are ignored
        if field.name() != Some(PHOTOS_FIELD) || field.file_name().is_none() {
            tracing::debug!("skipping form field {:?}", field.name());
            continue;
        }
        // Stop reading as soon as the batch is known to be too big
        limits.check_count(files.len() + 1)?;
        files.push(read_photo(field, limits).await?);
    }
    Ok(files)
}

async fn drain(multipart: &mut Multipart) {
    while let Ok(Some(mut field)) = multipart.next_field().await {
        while let Ok(Some(_)) = field.chunk().await {}
    }
}

async fn read_photo(mut field: Field<'_>, limits: IntakeLimits) -> Result<RawUpload, ApiError> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let content_type = field.content_type().map(str::to_owned);
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        limits.check_size(&file_name, (data.len() + chunk.len()) as u64)?;
        data.extend_from_slice(&chunk);
    }
    Ok(RawUpload::new(file_name, content_type, data))
}

fn is_valid_batch_id(batch_id: &str) -> bool {
    !batch_id.is_empty()
        && batch_id.len() <= MAX_BATCH_ID_LEN
        && batch_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("BATCH001", true)]
    #[case("0xabc123", true)]
    #[case("farm_01.lot-7", true)]
    #[case("", false)]
    #[case("batch 1", false)]
    #[case("a/b", false)]
    #[case("партия", false)]
    #[trace]
    fn is_valid_batch_id_tests(#[case] batch_id: &str, #[case] expected: bool) {
        assert_eq!(is_valid_batch_id(batch_id), expected);
    }

    #[test]
    fn batch_id_length_limit() {
        assert!(is_valid_batch_id(&"a".repeat(MAX_BATCH_ID_LEN)));
        assert!(!is_valid_batch_id(&"a".repeat(MAX_BATCH_ID_LEN + 1)));
    }
}
