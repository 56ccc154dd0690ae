/// Multipart field carrying the single-upload file
pub const SINGLE_UPLOAD_FIELD: &str = "upload";

/// Multipart field repeated once per file in a batch upload
pub const BATCH_UPLOAD_FIELD: &str = "upload[]";

/// Where form-driven actions send the browser back to
pub const INDEX_PATH: &str = "/";

/// Title shown on the listing page
pub const LISTING_TITLE: &str = "File Upload";
