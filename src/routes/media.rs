//! Source image upload.

use axum::extract::{Multipart, State};
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::generation::UploadImageResponse;
use crate::routes::error::ApiError;
use crate::services::images;

/// POST /api/upload_image — upload a sign render or couple portrait.
///
/// Multipart fields: `image` (the file), optional `id` (record id used as
/// the storage folder). The image is sniffed, re-encoded as a bounded
/// JPEG and stored publicly; the returned URL feeds the generation
/// endpoints.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let mut image_data: Option<Vec<u8>> = None;
    let mut folder: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("malformed multipart body".to_string()))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("image") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest("unreadable image field".to_string()))?;
                image::guess_format(&data).map_err(|_| {
                    ApiError::UnsupportedMediaType("not a recognized image format".to_string())
                })?;
                image_data = Some(data.to_vec());
            }
            Some("id") => {
                folder = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::BadRequest("unreadable id field".to_string()))?,
                );
            }
            _ => {}
        }
    }

    let data = image_data
        .ok_or_else(|| ApiError::BadRequest("missing image field".to_string()))?;
    let jpeg = images::compress_image(&data)?;

    let folder = folder.filter(|f| !f.is_empty()).unwrap_or_else(|| "uploads".to_string());
    let filename = format!("img_{}.jpg", Uuid::new_v4());
    let image_url = state
        .storage
        .upload_bytes(&folder, &filename, &jpeg, "image/jpeg")
        .await?;

    tracing::info!(
        folder = %folder,
        filename = %filename,
        original_bytes = data.len(),
        compressed_bytes = jpeg.len(),
        "image uploaded"
    );

    Ok(Json(UploadImageResponse {
        status: "success".to_string(),
        image_url,
    }))
}
