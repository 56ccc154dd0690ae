use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::core::extractor::UploadLimit;
use crate::core::middleware::html_error_pages;
use crate::features::files::handlers::{
    delete_file, download_file, index_page, list_files, upload_file, upload_files,
};
use crate::features::files::services::FileService;

/// Create routes for the files feature
///
/// `upload_limit` caps the whole request body of both upload routes.
pub fn routes(file_service: Arc<FileService>, upload_limit: usize) -> Router {
    let uploads = Router::new()
        .route("/file/upload", post(upload_file))
        .route("/file/upload/batch", post(upload_files))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(Extension(UploadLimit(upload_limit)));

    Router::new()
        .route("/", get(index_page))
        .route("/api/files", get(list_files))
        .route("/file/download", get(download_file).post(download_file))
        .route("/file/delete", post(delete_file))
        .merge(uploads)
        .layer(from_fn(html_error_pages))
        .with_state(file_service)
}
