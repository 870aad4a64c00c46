//! Upload service
//!
//! Reads a local file, sends it to the service and turns the response into
//! a record for the ledger.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Expiry, Record, NOT_AVAILABLE};
use crate::infrastructure::traits::{Clock, FileSystem, Transport, UploadRequest};

static FILE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="[^"]*/info/([0-9]+)/[^"]+"#).expect("file id pattern is valid")
});

static DELETE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://.+/delete/([^"<\s]+)"#).expect("delete id pattern is valid")
});

/// Numeric file id from the first `href=".../info/<id>/..."` link.
pub fn extract_file_id(body: &str) -> Option<String> {
    FILE_ID.captures(body).map(|caps| caps[1].to_string())
}

/// Deletion token from the last `http://.../delete/<token>` link on a line.
pub fn extract_delete_id(body: &str) -> Option<String> {
    DELETE_ID.captures(body).map(|caps| caps[1].to_string())
}

/// Non-fatal problems with an upload response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionWarning {
    IdExtractionFailed,
    DeleteIdExtractionFailed,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionWarning::IdExtractionFailed => f.write_str("could not extract file id"),
            ExtractionWarning::DeleteIdExtractionFailed => {
                f.write_str("could not extract delete id")
            }
        }
    }
}

/// Parameters shared by every file of one upload run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub base_url: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub comment: Option<String>,
    pub expires: Expiry,
    pub hide: bool,
}

/// Result of one successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub record: Record,
    pub warnings: Vec<ExtractionWarning>,
}

/// Service for uploading files.
pub struct UploadService {
    fs: Arc<dyn FileSystem>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl UploadService {
    /// Create a new upload service.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fs,
            transport,
            clock,
        }
    }

    /// Upload one file and build its record.
    ///
    /// The record is not added to any store; that is up to the caller.
    #[instrument(skip(self, options), fields(base_url = %options.base_url))]
    pub fn upload(&self, file: &Path, options: &UploadOptions) -> ApplicationResult<UploadOutcome> {
        let contents = self
            .fs
            .read(file)
            .map_err(|source| ApplicationError::FileRead {
                path: file.to_path_buf(),
                source,
            })?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string_lossy().into_owned());
        debug!("upload: {} bytes as {}", contents.len(), file_name);

        let request = UploadRequest {
            base_url: options.base_url.clone(),
            file_name,
            contents,
            expires: options.expires,
            email: options.email.clone(),
            password: options.password.clone(),
            comment: options.comment.clone(),
            hide: options.hide,
        };
        let body = self.transport.upload(&request)?;

        let mut warnings = Vec::new();
        let id = extract_file_id(&body).unwrap_or_else(|| {
            warnings.push(ExtractionWarning::IdExtractionFailed);
            NOT_AVAILABLE.to_string()
        });
        let delete_id = extract_delete_id(&body).unwrap_or_else(|| {
            warnings.push(ExtractionWarning::DeleteIdExtractionFailed);
            NOT_AVAILABLE.to_string()
        });

        let record = Record::new(
            file.to_string_lossy(),
            options.base_url.as_str(),
            id,
            delete_id,
            options.expires,
            options.email.clone(),
            options.hide,
            self.clock.now(),
        );
        debug!("upload: id={} expire_ts={}", record.id, record.expire_ts);

        Ok(UploadOutcome { record, warnings })
    }
}
