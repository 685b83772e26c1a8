//! Image uploads for posts.
//!
//! `POST /upload` takes a multipart body with a `file` part and a `postId`
//! part. The image is written under the upload directory as
//! `<postId>/<uuid>.<ext>` and its public URL is stored on the post.

use anyhow::Context;
use axum::{
    extract::{Extension, Multipart},
    Json,
};
use directory::{PostId, PostStore};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::server::app::AppState;
use crate::server::error::{require_user, ApiError};
use crate::server::middleware::AuthUser;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Extensions for the image types browsers actually send.
fn common_image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        "image/avif" => Some("avif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

struct UploadedFile {
    content_type: String,
    file_name: Option<String>,
    data: Vec<u8>,
}

impl UploadedFile {
    /// File extension for the stored copy. The client's own extension wins
    /// when it agrees with the declared content type.
    fn extension(&self) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| {
                mime_guess::from_ext(ext)
                    .iter()
                    .any(|mime| mime.essence_str() == self.content_type)
            });

        from_name
            .or_else(|| common_image_extension(&self.content_type).map(str::to_string))
            .or_else(|| {
                mime_guess::get_mime_extensions_str(&self.content_type)
                    .and_then(|exts| exts.first())
                    .map(|ext| ext.to_string())
            })
            .unwrap_or_else(|| "bin".to_string())
    }
}

fn multipart_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::BadRequest(format!("Invalid upload: {}", e))
}

pub async fn upload_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let user = require_user(auth)?;

    let mut file: Option<UploadedFile> = None;
    let mut post_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_ascii_lowercase();
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some(UploadedFile {
                    content_type,
                    file_name,
                    data: data.to_vec(),
                });
            }
            Some("postId") => {
                post_id = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let raw_post_id = post_id
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing postId".to_string()))?;
    let post_id = PostId::parse(&raw_post_id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid postId \"{}\"", raw_post_id)))?;
    let file = file.ok_or_else(|| ApiError::BadRequest("Missing file".to_string()))?;

    if !file.content_type.starts_with("image/") {
        return Err(ApiError::BadRequest(format!(
            "Only images can be uploaded, got {}",
            file.content_type
        )));
    }
    if file.data.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    if file.data.len() > state.upload.max_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "File is larger than the {} byte limit",
            state.upload.max_bytes
        )));
    }

    if state.store.get_post(post_id).await?.is_none() {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    let file_name = format!("{}.{}", Uuid::new_v4(), file.extension());
    let dir = state.upload.dir.join(post_id.to_string());
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
    tokio::fs::write(dir.join(&file_name), &file.data)
        .await
        .context("Failed to write uploaded file")?;

    let url = format!("{}/{}/{}", state.upload.public_base_url, post_id, file_name);
    state.store.set_post_image(post_id, &url).await?;

    info!(
        user_id = %user.user_id,
        post_id = %post_id,
        bytes = file.data.len(),
        content_type = %file.content_type,
        "Post image uploaded"
    );
    Ok(Json(UploadResponse { url }))
}
