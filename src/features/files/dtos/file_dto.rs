use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::modules::storage::FileRecord;

/// Single upload request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler reads the multipart body through `BufferedMultipart`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub upload: String,
}

/// Batch upload request DTO for OpenAPI documentation
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFilesDto {
    /// Files to upload, stored in the order they are sent
    #[schema(rename = "upload[]")]
    pub uploads: Vec<String>,
}

/// Metadata of a stored file (the blob itself is only served by download)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    /// Identifier assigned by the store
    pub id: i64,
    /// Filename as uploaded
    pub filename: String,
    /// Size of the blob in bytes
    pub size: usize,
    /// Timestamp when the file was uploaded
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last change to the record
    pub updated_at: DateTime<Utc>,
}

impl From<&FileRecord> for FileResponseDto {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename.clone(),
            size: record.size(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// File identifier, sent either as a query parameter or as a urlencoded form field
#[derive(Debug, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct FileIdDto {
    /// Identifier of the file
    #[serde(default)]
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
}

impl FileIdDto {
    /// Parse the identifier. Any integer is accepted; whether a record
    /// carries it is for the store to answer.
    pub fn parse(&self) -> Result<i64> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.id
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest(format!("Invalid file id '{}'", self.id)))
    }
}

/// Build a `Content-Disposition: attachment` value advertising `filename`.
///
/// The quoted `filename` parameter is restricted to printable ASCII; names
/// outside it additionally get an RFC 5987 `filename*` parameter carrying
/// the exact UTF-8 name.
pub fn attachment_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        format!("attachment; filename=\"{}\"", filename)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(filename)
        )
    }
}

/// Format a timestamp as an HTTP-date (RFC 9110 IMF-fixdate)
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP-date as sent in `If-Modified-Since`
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
