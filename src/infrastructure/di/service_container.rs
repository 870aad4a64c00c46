//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::{DeleteService, ListService, UploadService};
use crate::application::RecordStore;
use crate::config::Settings;
use crate::infrastructure::http::HttpTransport;
use crate::infrastructure::repository::{JsonFileRepository, NullRepository};
use crate::infrastructure::traits::{
    Clock, FileSystem, RealFileSystem, RecordRepository, SystemClock, Transport,
};
use crate::infrastructure::InfraResult;

/// Where the record store lives for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    /// `--no-db`: nothing is read or written
    Disabled,
}

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Remote service
    pub transport: Arc<dyn Transport>,

    /// Wall clock
    pub clock: Arc<dyn Clock>,

    /// Record persistence
    pub repository: Arc<dyn RecordRepository>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings, store: StoreLocation) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let repository: Arc<dyn RecordRepository> = match store {
            StoreLocation::File(path) => Arc::new(JsonFileRepository::new(fs.clone(), path)),
            StoreLocation::Disabled => Arc::new(NullRepository),
        };
        Ok(Self::with_deps(
            settings,
            fs,
            Arc::new(HttpTransport::new()?),
            Arc::new(SystemClock),
            repository,
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        repository: Arc<dyn RecordRepository>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            transport,
            clock,
            repository,
        }
    }

    pub fn open_store(&self) -> RecordStore {
        RecordStore::open(self.repository.clone())
    }

    pub fn upload_service(&self) -> UploadService {
        UploadService::new(self.fs.clone(), self.transport.clone(), self.clock.clone())
    }

    pub fn delete_service(&self) -> DeleteService {
        DeleteService::new(self.transport.clone())
    }

    pub fn list_service(&self) -> ListService {
        ListService::new(self.clock.clone())
    }
}
