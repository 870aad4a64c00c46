//! List service
//!
//! Renders ledger records through the output template.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{DisplayOptions, FieldResolver, Record, Template};
use crate::infrastructure::traits::Clock;

/// Options for one listing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Include records past their expiry
    pub show_expired: bool,
    /// Only consider the last N records
    pub number: Option<usize>,
    pub display: DisplayOptions,
    pub template: Template,
}

/// Keep only the last `number` records, in store order.
///
/// Single pass: the leading `total - number` records are skipped.
pub fn tail(records: &[Record], number: Option<usize>) -> impl Iterator<Item = &Record> {
    let mut skip = number
        .map(|n| records.len().saturating_sub(n))
        .unwrap_or(0);
    records.iter().filter(move |_| {
        if skip > 0 {
            skip -= 1;
            false
        } else {
            true
        }
    })
}

/// Render one record with a fresh resolver sampled at `now`.
pub fn render_record(
    template: &Template,
    record: &Record,
    display: &DisplayOptions,
    now: DateTime<Utc>,
) -> String {
    let mut resolver = FieldResolver::new(record, display, now);
    template.render(&mut resolver)
}

/// Service for listing records.
pub struct ListService {
    clock: Arc<dyn Clock>,
}

impl ListService {
    /// Create a new list service.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Render the selected records, one string per record.
    pub fn list(&self, records: &[Record], options: &ListOptions) -> Vec<String> {
        let now = self.clock.now();
        let lines: Vec<String> = tail(records, options.number)
            .filter_map(|record| {
                let mut resolver = FieldResolver::new(record, &options.display, now);
                if resolver.is_expired() && !options.show_expired {
                    return None;
                }
                Some(options.template.render(&mut resolver))
            })
            .collect();
        debug!("list: {} of {} records rendered", lines.len(), records.len());
        lines
    }
}
