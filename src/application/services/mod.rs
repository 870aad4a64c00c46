//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Transport, Clock)
//! but are themselves concrete structs, not traits.

mod delete;
mod list;
mod upload;

pub use delete::DeleteService;
pub use list::{render_record, tail, ListOptions, ListService};
pub use upload::{
    extract_delete_id, extract_file_id, ExtractionWarning, UploadOptions, UploadOutcome,
    UploadService,
};
