//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::domain::{Expiry, Record};
use crate::infrastructure::error::{StoreError, TransportError};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read whole file contents.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace file contents atomically (write sibling, then rename).
    fn write_atomic(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Copy file from source to destination.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Wall clock abstraction.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// One file upload as sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Service root; the form is posted to `{base_url}/index.php`
    pub base_url: String,
    pub file_name: String,
    pub contents: Vec<u8>,
    pub expires: Expiry,
    pub email: Option<String>,
    pub password: Option<String>,
    pub comment: Option<String>,
    pub hide: bool,
}

impl UploadRequest {
    pub fn endpoint(&self) -> String {
        format!("{}/index.php", self.base_url)
    }

    /// Text form fields. Unset optional fields are omitted and `hide` is
    /// only sent when hiding.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("filename", self.file_name.clone()),
            ("expires", self.expires.to_string()),
        ];
        let optional = [
            ("email", &self.email),
            ("password", &self.password),
            ("comment", &self.comment),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.push((name, value.clone()));
            }
        }
        if self.hide {
            fields.push(("hide", "true".to_string()));
        }
        fields
    }
}

/// Remote file-hosting service.
pub trait Transport: Send + Sync {
    /// Upload a file, returning the raw response body.
    fn upload(&self, request: &UploadRequest) -> Result<String, TransportError>;

    /// Confirm deletion at a deletion URL.
    fn confirm_delete(&self, url: &str) -> Result<(), TransportError>;
}

/// Backing storage for the record ledger.
pub trait RecordRepository: Send + Sync {
    /// Load all records. A missing store is an empty one.
    fn load(&self) -> Result<Vec<Record>, StoreError>;

    /// Replace the stored records.
    fn save(&self, records: &[Record]) -> Result<(), StoreError>;

    /// Keep a copy of an unreadable store out of the way of the next save.
    ///
    /// Returns where the copy went, if anywhere.
    fn quarantine(&self) -> io::Result<Option<PathBuf>> {
        Ok(None)
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_atomic(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        self.ensure_parent(path)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// System wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
