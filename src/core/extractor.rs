use axum::{
    body::{self, Body},
    extract::{multipart::MultipartRejection, FromRequest, Multipart, Request},
    http::header,
};

use crate::core::config::AppConfig;
use crate::core::error::AppError;

/// Upload ceiling in bytes, installed on upload routes as a request extension.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

impl Default for UploadLimit {
    fn default() -> Self {
        Self(AppConfig::DEFAULT_MAX_REQUEST_BODY_SIZE)
    }
}

/// Multipart extractor that holds the whole body in memory before parsing.
///
/// The body is checked against [`UploadLimit`] first: a declared
/// `Content-Length` over the limit is rejected without reading, and an
/// undeclared body is cut off once it passes the limit. Handlers therefore
/// never touch storage for an oversized request.
pub struct BufferedMultipart(pub Multipart);

impl<S> FromRequest<S> for BufferedMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let UploadLimit(limit) = req
            .extensions()
            .get::<UploadLimit>()
            .copied()
            .unwrap_or_default();

        let declared = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > limit) {
            return Err(too_large(limit));
        }

        let (parts, body) = req.into_parts();
        let bytes = body::to_bytes(body, limit)
            .await
            .map_err(|_| too_large(limit))?;

        let req = Request::from_parts(parts, Body::from(bytes));
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(multipart_rejection)?;

        Ok(Self(multipart))
    }
}

fn too_large(limit: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "Request body exceeds the upload limit of {} bytes ({} MiB)",
        limit,
        limit / 1024 / 1024
    ))
}

fn multipart_rejection(rejection: MultipartRejection) -> AppError {
    tracing::debug!("Rejected multipart request: {}", rejection);
    AppError::BadRequest(format!("Invalid multipart form: {}", rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn multipart_request(
        body: &'static str,
        content_length: Option<usize>,
        limit: usize,
    ) -> Request<Body> {
        let mut builder = HttpRequest::builder()
            .method("POST")
            .uri("/file/upload")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY");
        if let Some(len) = content_length {
            builder = builder.header(header::CONTENT_LENGTH, len);
        }
        let mut req = builder.body(Body::from(body)).unwrap();
        req.extensions_mut().insert(UploadLimit(limit));
        req
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_is_rejected() {
        let req = multipart_request("", Some(65), 64);
        let result = BufferedMultipart::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn test_undeclared_body_over_limit_is_rejected() {
        let body = "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"upload\"; filename=\"a\"\r\n\r\n0123456789012345678901234567890123456789\r\n--XBOUNDARY--\r\n";
        let req = multipart_request(body, None, 64);
        let result = BufferedMultipart::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn test_missing_boundary_is_bad_request() {
        let mut req = HttpRequest::builder()
            .method("POST")
            .uri("/file/upload")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        req.extensions_mut().insert(UploadLimit(64));

        let result = BufferedMultipart::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_body_within_limit_parses() {
        let body = "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"upload\"; filename=\"a\"\r\n\r\nhi\r\n--XBOUNDARY--\r\n";
        let req = multipart_request(body, Some(body.len()), 256);
        let BufferedMultipart(mut multipart) = BufferedMultipart::from_request(req, &())
            .await
            .unwrap();

        let field = multipart.next_field().await.unwrap().unwrap();
        assert_eq!(field.name(), Some("upload"));
        assert_eq!(field.file_name(), Some("a"));
        assert_eq!(field.bytes().await.unwrap().as_ref(), b"hi");
    }
}
