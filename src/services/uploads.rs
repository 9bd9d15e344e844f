use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use chrono::Utc;

use crate::forms::uploads::LogoUpload;

use super::{ServiceError, ServiceResult};

/// URL prefix under which the upload directory is served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const MAX_NAME_ATTEMPTS: u32 = 16;

/// File extension for accepted image types.
fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/x-icon" | "image/vnd.microsoft.icon" => Some("ico"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

/// Store an uploaded logo under `upload_dir` and return its public URL.
pub fn upload_logo(upload: LogoUpload, upload_dir: &Path) -> ServiceResult<String> {
    let content_type = upload.content_type.as_deref().unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(ServiceError::Form("Please upload an image file".to_string()));
    }

    let Some(extension) = image_extension(content_type) else {
        return Err(ServiceError::Form(format!(
            "Unsupported image type: {content_type}"
        )));
    };

    if upload.bytes.is_empty() {
        return Err(ServiceError::Form("Uploaded file is empty".to_string()));
    }

    if let Err(e) = std::fs::create_dir_all(upload_dir) {
        log::error!("Failed to create upload dir {}: {e}", upload_dir.display());
        return Err(ServiceError::Internal);
    }

    let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let file_name = if attempt == 0 {
            format!("logo-{stamp}.{extension}")
        } else {
            format!("logo-{stamp}-{attempt}.{extension}")
        };
        let path = upload_dir.join(&file_name);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                log::error!("Failed to create {}: {e}", path.display());
                return Err(ServiceError::Internal);
            }
        };

        if let Err(e) = file.write_all(&upload.bytes) {
            log::error!("Failed to write {}: {e}", path.display());
            drop(file);
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("Failed to remove partial upload {}: {e}", path.display());
            }
            return Err(ServiceError::Internal);
        }

        log::info!(
            "Stored logo {:?} as {file_name}",
            upload.file_name.as_deref().unwrap_or("<unnamed>")
        );
        return Ok(format!("{UPLOADS_URL_PREFIX}/{file_name}"));
    }

    log::error!("Could not find a free file name in {}", upload_dir.display());
    Err(ServiceError::Internal)
}

/// Delete a logo stored by [`upload_logo`]. URLs outside the upload
/// directory are left alone.
pub fn remove_logo(url: &str, upload_dir: &Path) {
    let Some(file_name) = url
        .strip_prefix(UPLOADS_URL_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return;
    };
    if file_name.is_empty() || file_name.starts_with('.') || file_name.contains(['/', '\\']) {
        return;
    }

    let path = upload_dir.join(file_name);
    match std::fs::remove_file(&path) {
        Ok(()) => log::info!("Removed unused logo {file_name}"),
        Err(e) => log::warn!("Failed to remove {}: {e}", path.display()),
    }
}
