//! Invoice upload requests.

use crate::model::UploadError;
use bytes::Bytes;
use std::path::Path;

/// Largest invoice the service accepts (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Extensions the service accepts, lowercase.
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// An invoice file bound for one endpoint.
///
/// Immutable once constructed and consumed by value by exactly one session.
/// `Bytes` makes the payload cheap to hand to the multipart encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    endpoint: String,
    file_name: String,
    mime_type: &'static str,
    payload: Bytes,
}

impl UploadRequest {
    /// Build a request from an in-memory payload.
    ///
    /// No validation is applied; the MIME type is inferred from `file_name`
    /// and falls back to `application/octet-stream`.
    pub fn new(
        endpoint: impl Into<String>,
        file_name: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Self {
        let file_name = file_name.into();
        let mime_type = extension_of(&file_name)
            .as_deref()
            .and_then(mime_for_extension)
            .unwrap_or("application/octet-stream");
        Self {
            endpoint: endpoint.into(),
            file_name,
            mime_type,
            payload: payload.into(),
        }
    }

    /// Read and validate an invoice file.
    ///
    /// # Errors
    ///
    /// - `UploadError::FileNotFound` if `path` does not exist
    /// - `UploadError::UnsupportedType` unless the extension is pdf, png, jpg or jpeg
    /// - `UploadError::TooLarge` above [`MAX_UPLOAD_BYTES`]
    /// - `UploadError::Io` for read failures
    pub async fn from_path(
        endpoint: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, UploadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(UploadError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("invoice")
            .to_string();

        let extension = extension_of(&file_name).unwrap_or_default();
        if mime_for_extension(&extension).is_none() {
            return Err(UploadError::UnsupportedType { extension });
        }

        let size = tokio::fs::metadata(path).await?.len();
        if size > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge {
                size,
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let payload = tokio::fs::read(path).await?;
        Ok(Self::new(endpoint, file_name, payload))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Split into owned parts for the transport.
    pub fn into_parts(self) -> (String, String, &'static str, Bytes) {
        (self.endpoint, self.file_name, self.mime_type, self.payload)
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    if !ALLOWED_EXTENSIONS.contains(&extension) {
        return None;
    }
    Some(match extension {
        "pdf" => "application/pdf",
        "png" => "image/png",
        _ => "image/jpeg",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ENDPOINT: &str = "http://localhost:8000/api/invoices/analyze/stream";

    #[test]
    fn new_infers_mime_type_from_extension() {
        let pdf = UploadRequest::new(ENDPOINT, "invoice.PDF", vec![1, 2, 3]);
        assert_eq!(pdf.mime_type(), "application/pdf");

        let jpg = UploadRequest::new(ENDPOINT, "scan.jpeg", Vec::new());
        assert_eq!(jpg.mime_type(), "image/jpeg");

        let other = UploadRequest::new(ENDPOINT, "notes.txt", Vec::new());
        assert_eq!(other.mime_type(), "application/octet-stream");
    }

    #[test]
    fn into_parts_returns_everything() {
        let request = UploadRequest::new(ENDPOINT, "a.png", vec![9u8; 4]);
        let (endpoint, name, mime, payload) = request.into_parts();
        assert_eq!(endpoint, ENDPOINT);
        assert_eq!(name, "a.png");
        assert_eq!(mime, "image/png");
        assert_eq!(payload.len(), 4);
    }

    #[tokio::test]
    async fn from_path_reads_valid_invoice() {
        let path = std::env::temp_dir().join("shieldnet_upload_valid.pdf");
        fs::write(&path, b"%PDF-1.4").unwrap();

        let result = UploadRequest::from_path(ENDPOINT, &path).await;
        let _ = fs::remove_file(&path);

        let request = result.expect("valid pdf should be accepted");
        assert_eq!(request.file_name(), "shieldnet_upload_valid.pdf");
        assert_eq!(request.payload().as_ref(), b"%PDF-1.4");
        assert_eq!(request.endpoint(), ENDPOINT);
    }

    #[tokio::test]
    async fn from_path_rejects_missing_file() {
        let path = std::env::temp_dir().join("shieldnet_upload_missing_12345.pdf");
        let result = UploadRequest::from_path(ENDPOINT, &path).await;
        assert!(
            matches!(result, Err(UploadError::FileNotFound { .. })),
            "got: {:?}",
            result
        );
    }

    #[tokio::test]
    async fn from_path_rejects_unsupported_extension() {
        let path = std::env::temp_dir().join("shieldnet_upload_invalid.docx");
        fs::write(&path, b"not an invoice").unwrap();

        let result = UploadRequest::from_path(ENDPOINT, &path).await;
        let _ = fs::remove_file(&path);

        match result {
            Err(UploadError::UnsupportedType { extension }) => assert_eq!(extension, "docx"),
            other => panic!("Expected UnsupportedType, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn from_path_rejects_oversized_file() {
        let path = std::env::temp_dir().join("shieldnet_upload_large.png");
        fs::write(&path, vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize]).unwrap();

        let result = UploadRequest::from_path(ENDPOINT, &path).await;
        let _ = fs::remove_file(&path);

        assert!(
            matches!(result, Err(UploadError::TooLarge { size, .. }) if size == MAX_UPLOAD_BYTES + 1),
            "got: {:?}",
            result
        );
    }
}
