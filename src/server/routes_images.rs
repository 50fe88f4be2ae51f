//! Image upload, listing and retrieval routes.
//!
//! - `POST /upload` stores a `data:image/<format>;base64,` string
//! - `GET /images` lists stored image filenames
//! - `GET /image/{filename}` returns one image re-encoded as a data URI

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use framestore_core::error::{INVALID_IMAGE_DATA, MISSING_IMAGE};
use framestore_core::{DataUri, Error};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::AppContext;

/// Create image-related routes.
pub fn image_routes() -> Router<AppContext> {
    Router::new()
        .route("/upload", post(upload_image))
        .route("/images", get(list_images))
        .route("/image/{filename}", get(get_image))
}

// ============================================================================
// Request / response types
// ============================================================================

/// Body of `POST /upload`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadRequest {
    /// `data:image/<format>;base64,<payload>`
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageResponse {
    pub success: bool,
    pub filename: String,
    /// Full data URI, not just the base64 payload.
    pub base64: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Decode and store an uploaded image.
async fn upload_image(
    State(ctx): State<AppContext>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let Json(request) = payload.map_err(rejection_to_error)?;

    let raw = request
        .image
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation(MISSING_IMAGE.into()))?;
    let image = DataUri::parse(&raw)?;

    let filename = ctx.store.store(&image).await?;
    tracing::info!("Uploaded {}", filename);

    Ok(Json(UploadResponse {
        success: true,
        filename,
    }))
}

/// List stored image filenames.
async fn list_images(State(ctx): State<AppContext>) -> Result<Json<ListResponse>, AppError> {
    let images = ctx.store.list().await?;

    Ok(Json(ListResponse {
        success: true,
        images,
    }))
}

/// Return a stored image as a data URI.
async fn get_image(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> Result<Json<ImageResponse>, AppError> {
    let image = ctx.store.read(&filename).await?;
    let base64 = image.to_data_uri().to_string();

    Ok(Json(ImageResponse {
        success: true,
        filename: image.filename,
        base64,
    }))
}

/// Turn a JSON extractor failure into a domain error so the client still
/// gets the usual error body.
///
/// A body sent without a JSON content type carries no `image` field as far
/// as the server is concerned, so it is reported as a missing image.
fn rejection_to_error(rejection: JsonRejection) -> Error {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => Error::Validation(MISSING_IMAGE.into()),
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Error::PayloadTooLarge(other.body_text())
        }
        other => Error::Validation(format!("{INVALID_IMAGE_DATA}: {}", other.body_text())),
    }
}
