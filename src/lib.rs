//! ansledger - Logistics-finance master data in a local record store
//!
//! Business partners, expense items, payment terms and ledger entries are
//! kept as JSON collections in a workspace directory. All reads and writes go
//! through [`infrastructure::RecordStore`], which issues ids and codes,
//! validates fields, and handles backup and restore.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::AnsError;
