//! Upload file resolution.
//!
//! Upload paths are resolved against a configured base directory and checked
//! before the page is touched: a missing file fails with
//! [`ProbeError::Interaction`] without any browser round-trip.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::result::{ProbeError, ProbeResult};

/// Base directory for upload files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDir {
    base: PathBuf,
}

impl UploadDir {
    /// Resolve relative names against `base`
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Base directory
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve `name` to an existing regular file
    pub fn resolve(&self, name: impl AsRef<Path>) -> ProbeResult<PathBuf> {
        let name = name.as_ref();
        let path = if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.base.join(name)
        };
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(ProbeError::interaction(
                path.display(),
                "upload path is not a regular file",
            )),
            Err(_) => Err(ProbeError::interaction(
                path.display(),
                "upload file does not exist",
            )),
        }
    }

    /// Resolve several names, failing on the first missing one
    pub fn resolve_all<I, P>(&self, names: I) -> ProbeResult<Vec<PathBuf>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        names.into_iter().map(|name| self.resolve(name)).collect()
    }
}

/// File attached to a file input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInput {
    /// File name
    pub name: String,
    /// MIME type
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// Original path
    pub path: PathBuf,
}

impl FileInput {
    /// Describe a file on disk
    pub fn from_path(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self {
            mime_type: guess_mime_type(&name),
            name,
            size,
            path: path.to_path_buf(),
        })
    }
}

/// Guess MIME type from filename
#[must_use]
pub fn guess_mime_type(filename: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "csv" => "text/csv",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ts" => "video/mp2t",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
    .to_string()
}
