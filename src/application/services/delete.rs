//! Delete service

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::infrastructure::traits::Transport;

/// Service for requesting remote deletion.
///
/// Works on deletion URLs only; the local ledger is neither consulted nor
/// changed.
pub struct DeleteService {
    transport: Arc<dyn Transport>,
}

impl DeleteService {
    /// Create a new delete service.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Confirm deletion at `url`.
    #[instrument(skip(self))]
    pub fn delete(&self, url: &str) -> ApplicationResult<()> {
        self.transport.confirm_delete(url)?;
        debug!("delete: confirmed");
        Ok(())
    }
}
