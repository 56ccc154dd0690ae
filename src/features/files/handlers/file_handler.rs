use axum::{
    extract::{multipart::Field, rejection::FormRejection, Form, Query, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use minijinja::{context, Value};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::BufferedMultipart;
use crate::features::files::dtos::{
    attachment_disposition, http_date, parse_http_date, FileIdDto, FileResponseDto,
    UploadFileDto, UploadFilesDto,
};
use crate::features::files::services::FileService;
use crate::shared::constants::{BATCH_UPLOAD_FIELD, INDEX_PATH, LISTING_TITLE, SINGLE_UPLOAD_FIELD};
use crate::shared::templates::render_template;
use crate::shared::types::{ApiResponse, Meta};

/// Read a file part completely, returning its filename and content.
async fn read_part(field: Field<'_>) -> Result<(String, Vec<u8>)> {
    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Filename is required".to_string()))?;

    let data = field.bytes().await.map_err(|e| {
        debug!("Failed to read file bytes: {}", e);
        AppError::BadRequest(format!("Failed to read file data: {}", e))
    })?;

    Ok((filename, data.to_vec()))
}

/// Prefer the query string; fall back to a urlencoded form body.
fn resolve_file_id(query: FileIdDto, form: std::result::Result<Form<FileIdDto>, FormRejection>) -> Result<i64> {
    if !query.id.is_empty() {
        return query.parse();
    }

    match form {
        Ok(Form(dto)) => dto.parse(),
        Err(rejection) => {
            debug!("No usable form body for file id: {}", rejection);
            FileIdDto::default().parse()
        }
    }
}

/// Upload a single file
///
/// Accepts multipart/form-data with one file part in the `upload` field.
/// Other fields are ignored.
#[utoipa::path(
    post,
    path = "/file/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form with a single `upload` file part",
    ),
    responses(
        (status = 303, description = "File stored, redirect to the listing"),
        (status = 400, description = "Malformed body, missing or empty file part"),
        (status = 413, description = "Request body over the upload limit"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn upload_file(
    State(service): State<Arc<FileService>>,
    BufferedMultipart(mut multipart): BufferedMultipart,
) -> Result<Redirect> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some(SINGLE_UPLOAD_FIELD) {
            debug!("Ignoring unknown field: {:?}", field.name());
            continue;
        }

        let (filename, data) = read_part(field).await?;
        service.upload_file(&filename, data).await?;

        return Ok(Redirect::to(INDEX_PATH));
    }

    Err(AppError::BadRequest(format!(
        "File is required in field '{}'",
        SINGLE_UPLOAD_FIELD
    )))
}

/// Upload several files
///
/// Every `upload[]` part is read and stored before the next one is read.
/// The first part that cannot be read or stored aborts the batch; parts
/// stored before it stay stored.
#[utoipa::path(
    post,
    path = "/file/upload/batch",
    tag = "files",
    request_body(
        content = UploadFilesDto,
        content_type = "multipart/form-data",
        description = "File upload form with zero or more `upload[]` file parts",
    ),
    responses(
        (status = 303, description = "All parts stored, redirect to the listing"),
        (status = 400, description = "Malformed body or an unreadable/empty part; earlier parts remain stored"),
        (status = 413, description = "Request body over the upload limit, nothing stored"),
        (status = 500, description = "Storage failure; earlier parts remain stored")
    )
)]
pub async fn upload_files(
    State(service): State<Arc<FileService>>,
    BufferedMultipart(mut multipart): BufferedMultipart,
) -> Result<Redirect> {
    let mut part = 0;
    let mut stored = 0;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                debug!("Failed to read multipart field: {}", e);
                return Err(AppError::BatchAborted {
                    part: part + 1,
                    filename: "<unknown>".to_string(),
                    stored,
                    source: Box::new(AppError::BadRequest(format!(
                        "Failed to read multipart data: {}",
                        e
                    ))),
                });
            }
        };

        if field.name() != Some(BATCH_UPLOAD_FIELD) {
            debug!("Ignoring unknown field: {:?}", field.name());
            continue;
        }
        part += 1;

        let label = field.file_name().unwrap_or("<unnamed>").to_string();
        let outcome = match read_part(field).await {
            Ok((filename, data)) => service.upload_file(&filename, data).await.map(|_| ()),
            Err(e) => Err(e),
        };

        if let Err(source) = outcome {
            return Err(AppError::BatchAborted {
                part,
                filename: label,
                stored,
                source: Box::new(source),
            });
        }
        stored += 1;
    }

    debug!("Batch upload stored {} file(s)", stored);

    Ok(Redirect::to(INDEX_PATH))
}

/// Download a file
///
/// The identifier comes from the `id` query parameter or a urlencoded form
/// field. The raw bytes are returned as an attachment under the original
/// filename; `Last-Modified` follows the record's `updated_at`.
#[utoipa::path(
    post,
    path = "/file/download",
    tag = "files",
    params(FileIdDto),
    request_body(
        content = FileIdDto,
        content_type = "application/x-www-form-urlencoded",
        description = "Alternative to the query parameter",
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 304, description = "Not modified since If-Modified-Since (GET only)"),
        (status = 400, description = "Missing or invalid id, or no live file with this id"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn download_file(
    State(service): State<Arc<FileService>>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<FileIdDto>,
    form: std::result::Result<Form<FileIdDto>, FormRejection>,
) -> Result<Response> {
    let id = resolve_file_id(query, form)?;
    let file = service.get_file(id).await?;

    let last_modified = http_date(file.updated_at);

    // Conditional requests only apply to safe methods.
    if method == Method::GET || method == Method::HEAD {
        let not_modified = headers
            .get(header::IF_MODIFIED_SINCE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date)
            .is_some_and(|since| file.updated_at.timestamp() <= since.timestamp());
        if not_modified {
            return Ok((
                StatusCode::NOT_MODIFIED,
                [(header::LAST_MODIFIED, last_modified)],
            )
                .into_response());
        }
    }

    let disposition = HeaderValue::from_str(&attachment_disposition(&file.filename))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {}", e)))?;
    let last_modified = HeaderValue::from_str(&last_modified)
        .map_err(|e| AppError::Internal(format!("Invalid Last-Modified: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
            (header::LAST_MODIFIED, last_modified),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        ],
        file.blob,
    )
        .into_response())
}

/// Delete a file
///
/// Soft deletes the file. Deleting an unknown or already deleted id succeeds.
#[utoipa::path(
    post,
    path = "/file/delete",
    tag = "files",
    params(FileIdDto),
    request_body(
        content = FileIdDto,
        content_type = "application/x-www-form-urlencoded",
        description = "Alternative to the query parameter",
    ),
    responses(
        (status = 303, description = "File deleted (or already absent), redirect to the listing"),
        (status = 400, description = "Missing or invalid id"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn delete_file(
    State(service): State<Arc<FileService>>,
    Query(query): Query<FileIdDto>,
    form: std::result::Result<Form<FileIdDto>, FormRejection>,
) -> Result<Redirect> {
    let id = resolve_file_id(query, form)?;
    service.delete_file(id).await?;

    Ok(Redirect::to(INDEX_PATH))
}

/// List all stored files
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "Live files in id order", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let files: Vec<FileResponseDto> = service
        .list_files()
        .await?
        .iter()
        .map(FileResponseDto::from)
        .collect();
    let total = files.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// HTML listing page with upload, download and delete forms
pub async fn index_page(State(service): State<Arc<FileService>>) -> Result<Html<String>> {
    let uploads: Vec<FileResponseDto> = service
        .list_files()
        .await?
        .iter()
        .map(FileResponseDto::from)
        .collect();

    let html = render_template(
        "index.html",
        context! {
            title => LISTING_TITLE,
            uploads => Value::from_serialize(&uploads),
        },
    )
    .map_err(|e| AppError::Template(e.to_string()))?;

    Ok(Html(html))
}
