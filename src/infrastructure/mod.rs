//! Infrastructure layer - Storage media, the record store and workspace I/O

pub mod config;
pub mod medium;
pub mod repository;
pub mod store;

pub use config::Settings;
pub use medium::{FileMedium, Medium, MemoryMedium};
pub use repository::{FileSystemRepository, WorkspaceRepository};
pub use store::{RecordStore, Stats};
