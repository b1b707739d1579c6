//! CLI layer - Command-line interface

pub mod commands;
pub mod output;

pub use commands::{Cli, Commands};
pub use output::{
    format_dashboard, format_page, format_record_detail, format_record_table,
    format_recent_activity, format_stats,
};
