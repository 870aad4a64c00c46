//! In-memory record ledger with a load-once / save-once lifecycle

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Record;
use crate::infrastructure::traits::RecordRepository;

/// Ordered, append-only sequence of upload records.
///
/// Loading never fails: an unreadable store starts the session empty.
/// Deleting a file remotely does not remove its record.
pub struct RecordStore {
    repository: Arc<dyn RecordRepository>,
    records: Vec<Record>,
}

impl RecordStore {
    /// Load the store from `repository`.
    pub fn open(repository: Arc<dyn RecordRepository>) -> Self {
        let records = match repository.load() {
            Ok(records) => records,
            Err(e) => {
                warn!("starting with an empty record store: {}", e);
                match repository.quarantine() {
                    Ok(Some(copy)) => warn!("unreadable store preserved at {}", copy.display()),
                    Ok(None) => {}
                    Err(e) => warn!("cannot preserve unreadable store: {}", e),
                }
                Vec::new()
            }
        };
        debug!("open: {} records", records.len());
        Self {
            repository,
            records,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Write every record back to the repository.
    pub fn save(&self) -> ApplicationResult<()> {
        self.repository
            .save(&self.records)
            .map_err(ApplicationError::StoreSave)
    }
}
