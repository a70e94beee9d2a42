//! Multipart form reading for the image-upload endpoints.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::TryStreamExt;

use quill_core::services::ImageUpload;

use crate::middleware::error::AppError;

/// Image uploads are capped at 2 MB.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/webp",
];

/// A file part of a multipart form.
pub struct FormFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

impl FormFile {
    pub fn into_upload(self) -> ImageUpload {
        ImageUpload {
            bytes: self.bytes,
            filename: self.filename,
        }
    }
}

/// Text fields plus at most one file, read from a multipart body.
pub struct FormData {
    fields: HashMap<String, String>,
    pub file: Option<FormFile>,
}

impl FormData {
    /// The text field's value, if the field was present at all.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

fn bad_request(e: impl ToString) -> AppError {
    AppError::BadRequest(e.to_string())
}

/// Drain a multipart payload: text fields are collected as strings, the
/// field named `file_field` (when it carries a filename) is read as the
/// file, enforcing the size cap.
pub async fn read_form(mut payload: Multipart, file_field: &str) -> Result<FormData, AppError> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(mut field) = payload.try_next().await.map_err(bad_request)? {
        let name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);

        if name == file_field && filename.is_some() {
            let content_type = field.content_type().map(|m| m.to_string());
            let mut bytes = Vec::new();
            while let Some(chunk) = field.try_next().await.map_err(bad_request)? {
                if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                    return Err(AppError::PayloadTooLarge(
                        "Image too large. Maximum size is 2MB.".to_string(),
                    ));
                }
                bytes.extend_from_slice(&chunk);
            }
            file = Some(FormFile {
                bytes,
                filename: filename.unwrap_or_default(),
                content_type,
            });
        } else {
            let mut value = Vec::new();
            while let Some(chunk) = field.try_next().await.map_err(bad_request)? {
                value.extend_from_slice(&chunk);
            }
            let value = String::from_utf8(value)
                .map_err(|_| AppError::BadRequest("Form fields must be UTF-8.".to_string()))?;
            fields.insert(name, value);
        }
    }

    Ok(FormData { fields, file })
}

/// Reject files that do not look like a supported image.
pub fn ensure_allowed_image(file: &FormFile) -> Result<(), AppError> {
    let allowed = file
        .content_type
        .as_deref()
        .is_some_and(|ct| ALLOWED_IMAGE_TYPES.contains(&ct));
    if !allowed {
        return Err(AppError::BadRequest(
            "Only PNG, JPG, JPEG, GIF, or WEBP images are allowed.".to_string(),
        ));
    }
    Ok(())
}
