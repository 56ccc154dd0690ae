use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files
        files_handlers::upload_file,
        files_handlers::upload_files,
        files_handlers::download_file,
        files_handlers::delete_file,
        files_handlers::list_files,
    ),
    components(
        schemas(
            // Shared types
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            Meta,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::UploadFilesDto,
            files_dtos::FileResponseDto,
            files_dtos::FileIdDto,
        )
    ),
    tags(
        (name = "files", description = "Upload, download, delete and list stored files")
    )
)]
pub struct ApiDoc;

/// Overrides the document info with values from configuration
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
