//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod services;
pub mod store;

pub use error::{ApplicationError, ApplicationResult};
pub use store::RecordStore;
