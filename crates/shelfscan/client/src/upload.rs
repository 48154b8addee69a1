//! Validation and encoding of files sent to the backend.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::{ClientError, ClientResult};

/// Largest shelf photo accepted (10 MB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Largest Goodreads export accepted (50 MB).
pub const MAX_CSV_BYTES: u64 = 50 * 1024 * 1024;

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn file_name_of(path: &Path) -> ClientResult<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| ClientError::InvalidInput("No file selected".into()))
}

/// A validated shelf photo.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    file_name: String,
    mime: &'static str,
    bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let file_name = file_name_of(path)?;
        Self::mime_for(&file_name)?;
        Self::check_size(std::fs::metadata(path)?.len())?;
        Self::from_bytes(file_name, std::fs::read(path)?)
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> ClientResult<Self> {
        let file_name = file_name.into();
        if file_name.is_empty() {
            return Err(ClientError::InvalidInput("No file selected".into()));
        }
        let mime = Self::mime_for(&file_name)?;
        Self::check_size(bytes.len() as u64)?;
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 without a `data:` URL prefix.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    fn mime_for(file_name: &str) -> ClientResult<&'static str> {
        match extension(file_name).as_deref() {
            Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
            Some("png") => Ok("image/png"),
            Some("webp") => Ok("image/webp"),
            _ => Err(ClientError::InvalidInput(
                "Please select a valid image file (JPEG, PNG, or WebP)".into(),
            )),
        }
    }

    fn check_size(len: u64) -> ClientResult<()> {
        if len > MAX_IMAGE_BYTES {
            return Err(ClientError::InvalidInput(
                "Image file is too large. Please select a file under 10MB.".into(),
            ));
        }
        Ok(())
    }
}

/// A validated Goodreads library export.
#[derive(Debug, Clone)]
pub struct GoodreadsExport {
    file_name: String,
    bytes: Vec<u8>,
}

impl GoodreadsExport {
    pub fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let file_name = file_name_of(path)?;
        Self::check_name(&file_name)?;
        Self::check_size(std::fs::metadata(path)?.len())?;
        Self::from_bytes(file_name, std::fs::read(path)?)
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> ClientResult<Self> {
        let file_name = file_name.into();
        if file_name.is_empty() {
            return Err(ClientError::InvalidInput("No file selected".into()));
        }
        Self::check_name(&file_name)?;
        Self::check_size(bytes.len() as u64)?;
        Ok(Self { file_name, bytes })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn into_parts(self) -> (String, Vec<u8>) {
        (self.file_name, self.bytes)
    }

    fn check_name(file_name: &str) -> ClientResult<()> {
        if extension(file_name).as_deref() != Some("csv") {
            return Err(ClientError::InvalidInput("Please select a CSV file".into()));
        }
        Ok(())
    }

    fn check_size(len: u64) -> ClientResult<()> {
        if len > MAX_CSV_BYTES {
            return Err(ClientError::InvalidInput(
                "CSV file is too large. Please select a file under 50MB.".into(),
            ));
        }
        Ok(())
    }
}
