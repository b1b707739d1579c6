//! Application layer - Use cases and orchestration

pub mod backup;
pub mod dashboard;
pub mod init;
pub mod manage_config;
pub mod records;

pub use backup::{default_backup_filename, export_backup, import_backup};
pub use dashboard::{dashboard, recent_activity, Activity, Dashboard};
pub use manage_config::ConfigService;
pub use records::{parse_assignments, ListQuery, Page, RecordService};
