use actix_multipart::form::{MultipartForm, tempfile::TempFile};

/// Raw logo bytes handed to the upload service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUpload {
    pub bytes: Vec<u8>,
    /// MIME essence reported by the client, e.g. `image/png`.
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl LogoUpload {
    /// Read an uploaded temp file into memory.
    pub fn from_temp_file(file: &TempFile) -> std::io::Result<Self> {
        Ok(Self {
            bytes: std::fs::read(file.file.path())?,
            content_type: file
                .content_type
                .as_ref()
                .map(|mime| mime.essence_str().to_string()),
            file_name: file.file_name.clone(),
        })
    }
}

#[derive(MultipartForm)]
pub struct UploadLogoForm {
    #[multipart(limit = "5MB")]
    pub file: TempFile,
}
