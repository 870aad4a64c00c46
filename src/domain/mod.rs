//! Domain layer: records, field resolution and templates
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod record;
pub mod resolver;
pub mod template;

pub use error::{DomainError, FieldError};
pub use record::{parse_retention, Expiry, Record, NOT_AVAILABLE};
pub use resolver::{
    expand_shortcut, is_known_field, DateFormat, DisplayOptions, FieldResolver, FieldSource, FieldValue,
    DERIVED_FIELDS, RECORD_SHORTCUTS, STORED_FIELDS,
};
pub use template::{Template, DEFAULT_FORMAT};
