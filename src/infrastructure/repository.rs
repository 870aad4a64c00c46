//! Record store persistence

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Record;
use crate::infrastructure::error::StoreError;
use crate::infrastructure::traits::{FileSystem, RecordRepository};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    records: &'a [Record],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecords {
    Envelope {
        #[allow(dead_code)]
        version: u32,
        records: Vec<Record>,
    },
    Bare(Vec<Record>),
}

/// Records as pretty-printed JSON in a single file.
pub struct JsonFileRepository {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable store is copied before it gets overwritten.
    pub fn quarantine_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<Record>, StoreError> {
        if !self.fs.exists(&self.path) {
            debug!("load: no store at {}", self.path.display());
            return Ok(Vec::new());
        }
        let content = self.fs.read(&self.path).map_err(|e| self.io_err(e))?;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        // bytes, not str: a non-UTF-8 file is corrupt, not an I/O failure
        let stored: StoredRecords =
            serde_json::from_slice(&content).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        let records = match stored {
            StoredRecords::Envelope { records, .. } | StoredRecords::Bare(records) => records,
        };
        debug!("load: {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        let envelope = EnvelopeRef {
            version: FORMAT_VERSION,
            records,
        };
        let mut json = serde_json::to_vec_pretty(&envelope).map_err(StoreError::Encode)?;
        json.push(b'\n');
        self.fs
            .write_atomic(&self.path, &json)
            .map_err(|e| self.io_err(e))?;
        debug!("save: {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn quarantine(&self) -> io::Result<Option<PathBuf>> {
        if !self.fs.exists(&self.path) {
            return Ok(None);
        }
        let target = self.quarantine_path();
        self.fs.copy(&self.path, &target)?;
        Ok(Some(target))
    }
}

/// Store used with `--no-db`: always empty, never written.
#[derive(Debug, Default)]
pub struct NullRepository;

impl RecordRepository for NullRepository {
    fn load(&self) -> Result<Vec<Record>, StoreError> {
        Ok(Vec::new())
    }

    fn save(&self, _records: &[Record]) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::domain::Expiry;
    use crate::infrastructure::traits::RealFileSystem;

    fn repo(dir: &TempDir) -> JsonFileRepository {
        JsonFileRepository::new(Arc::new(RealFileSystem), dir.path().join("yafu.db"))
    }

    fn record(n: i64) -> Record {
        Record::new(
            format!("/tmp/file{n}.txt"),
            "http://x/y",
            n.to_string(),
            format!("del{n}"),
            Expiry::OneDay,
            Some("me@example.org".into()),
            n % 2 == 0,
            Utc.timestamp_opt(1_600_000_000 + n, 0).unwrap(),
        )
    }

    #[test]
    fn given_missing_file_when_loading_then_returns_empty() {
        let temp = TempDir::new().unwrap();
        assert!(repo(&temp).load().unwrap().is_empty());
    }

    #[test]
    fn given_saved_records_when_reloading_then_equal_in_order() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let records: Vec<Record> = (0..4).map(record).collect();

        repo.save(&records).unwrap();

        assert_eq!(repo.load().unwrap(), records);
    }

    #[test]
    fn given_bare_array_when_loading_then_accepts_it() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let records = vec![record(7)];
        std::fs::write(repo.path(), serde_json::to_string(&records).unwrap()).unwrap();

        assert_eq!(repo.load().unwrap(), records);
    }

    #[test]
    fn given_garbage_when_loading_then_reports_corrupt_and_quarantines() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        std::fs::write(repo.path(), "\u{80}not json").unwrap();

        assert!(matches!(repo.load(), Err(StoreError::Corrupt { .. })));
        let copy = repo.quarantine().unwrap().unwrap();
        assert_eq!(copy, repo.quarantine_path());
        assert_eq!(std::fs::read_to_string(copy).unwrap(), "\u{80}not json");
    }

    #[test]
    fn given_non_utf8_bytes_when_loading_then_reports_corrupt() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        // pickle protocol 3 header of an empty list
        std::fs::write(repo.path(), [0x80, 0x03, b']', b'q', 0x00, b'.']).unwrap();

        assert!(matches!(repo.load(), Err(StoreError::Corrupt { .. })));
    }
}
