//! yafu: command line client for the YaFU file-hosting service
//!
//! Uploads files, requests deletion of uploads, and keeps a local ledger of
//! upload records that can be listed through `$name` output templates.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
