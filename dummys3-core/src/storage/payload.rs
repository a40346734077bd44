use crate::error::{Result, StoreError};
use std::path::PathBuf;

const MULTIPART_FORM_DATA: &str = "multipart/form-data; boundary=";

/// An upload that the request layer has already buffered to a local file.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    /// Content type of the whole request, e.g. `multipart/form-data; boundary=...`.
    pub request_content_type: Option<String>,
    /// Content type declared for the uploaded file part.
    pub content_type: String,
    pub temp_path: PathBuf,
    /// Every request header name, as received.
    pub header_names: Vec<String>,
}

/// Only multipart form submissions with a boundary are accepted.
pub fn ensure_multipart(request_content_type: Option<&str>) -> Result<()> {
    let content_type = request_content_type.unwrap_or_default();
    match content_type.strip_prefix(MULTIPART_FORM_DATA) {
        Some(boundary) if !boundary.is_empty() => Ok(()),
        _ => Err(StoreError::UnsupportedPayload(format!(
            "expected multipart/form-data with a boundary, got {:?}",
            content_type
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_multipart() {
        assert!(ensure_multipart(Some("multipart/form-data; boundary=----abc")).is_ok());

        for value in [
            None,
            Some(""),
            Some("application/octet-stream"),
            Some("multipart/form-data"),
            Some("multipart/form-data; boundary="),
            Some("Multipart/Form-Data; boundary=x"),
        ] {
            assert!(matches!(
                ensure_multipart(value),
                Err(StoreError::UnsupportedPayload(_))
            ));
        }
    }
}
