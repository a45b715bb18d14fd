//! `multipart/form-data` bodies for song uploads.
//!
//! The encoding is done by `common-multipart-rfc7578`; this wrapper collects
//! its streamed body into bytes that `http-types` can send.

use crate::{Result, WynkError};
use common_multipart_rfc7578::client::multipart::{Body, Form};
use futures::TryStreamExt;
use std::io::Cursor;

/// A multipart form under construction.
pub struct MultipartForm {
    form: Form<'static>,
}

impl MultipartForm {
    /// Start a form with a random boundary.
    pub fn new() -> Self {
        Self {
            form: Form::default(),
        }
    }

    /// Add a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.form.add_text(name, value.to_string());
        self
    }

    /// Add a file field. An unparseable content type is sent as
    /// `application/octet-stream`.
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        let mime = content_type
            .parse::<mime::Mime>()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);
        self.form.add_reader_file_with_mime(
            name,
            Cursor::new(bytes.to_vec()),
            file_name.to_string(),
            mime,
        );
        self
    }

    /// Value for the request's `Content-Type` header, including the boundary.
    pub fn content_type(&self) -> String {
        self.form.content_type()
    }

    /// Encode the form.
    pub async fn into_bytes(self) -> Result<Vec<u8>> {
        Body::from(self.form)
            .map_err(|e| WynkError::Io(std::io::Error::other(e.to_string())))
            .try_fold(Vec::new(), |mut body, chunk| async move {
                body.extend_from_slice(&chunk);
                Ok(body)
            })
            .await
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MultipartForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartForm")
            .field("content_type", &self.content_type())
            .finish()
    }
}
