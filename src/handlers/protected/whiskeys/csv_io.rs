use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use crate::database::repository::WhiskeyFilters;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::AppState;
use crate::transfer::{decode_upload, export_csv, import_csv, ImportReport, Importer};
use crate::types::Permission;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub report: ImportReport,
}

/// GET /api/whiskeys/export/csv - the caller's collection as a CSV attachment
pub async fn export(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    user.require(Permission::ReadWhiskey)?;

    let records = state.store.find_all(&WhiskeyFilters::owner(user.id)).await?;
    let body = export_csv(&records)?;

    let filename = format!(
        "whiskey-collection-{}.csv",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);

    tracing::info!("User {} exported {} whiskeys", user.username, records.len());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// POST /api/whiskeys/import/csv - multipart upload, field `file`
pub async fn import(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportResponse>, ApiError> {
    user.require(Permission::CreateWhiskey)?;

    let mut multipart = multipart.map_err(|_| ApiError::bad_request("No file uploaded"))?;
    let bytes = read_upload(&mut multipart, state.config.api.max_upload_bytes).await?;

    let text = decode_upload(&bytes);
    let importer = Importer {
        owner: user.id,
        username: &user.username,
    };
    let report = import_csv(state.store.as_ref(), importer, &text, &state.quantity_policy).await?;

    Ok(Json(ImportResponse {
        message: "CSV import completed",
        report,
    }))
}

/// Find the `file` part, check it looks like CSV and read it within `limit` bytes
async fn read_upload(multipart: &mut Multipart, limit: usize) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let is_csv = field.content_type().is_some_and(is_csv_mime)
            || field.file_name().is_some_and(|name| name.ends_with(".csv"));
        if !is_csv {
            return Err(ApiError::bad_request("Only CSV files are allowed"));
        }

        let bytes = field.bytes().await.map_err(upload_error)?;
        if bytes.len() > limit {
            return Err(ApiError::payload_too_large("File too large"));
        }
        return Ok(bytes.to_vec());
    }

    Err(ApiError::bad_request("No file uploaded"))
}

/// `text/csv`, ignoring parameters such as `; charset=utf-8`
fn is_csv_mime(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default();
    essence.trim().eq_ignore_ascii_case("text/csv")
}

fn upload_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("File too large")
    } else {
        ApiError::bad_request(err.body_text())
    }
}
