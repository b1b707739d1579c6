//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ansledger")]
#[command(about = "Logistics-finance master data kept in a local record store", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new workspace
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Add a record under the next code of its collection
    Add {
        /// partners, expense-items, payment-terms or ledger
        collection: String,

        /// Fields as KEY=VALUE
        #[arg(value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Change fields of an existing record
    Update {
        collection: String,

        /// Record id
        id: String,

        /// Fields as KEY=VALUE
        #[arg(value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Delete a record
    Delete { collection: String, id: String },

    /// Show every field of one record
    Show { collection: String, id: String },

    /// List records with search, sorting and paging
    List {
        collection: String,

        /// Case-insensitive text matched against name, code and similar fields
        #[arg(short, long)]
        search: Option<String>,

        /// Field to sort by
        #[arg(long, default_value = "code")]
        sort: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Find records where every KEY=VALUE matches (prefix a value with % for substring search)
    Find {
        collection: String,

        #[arg(value_name = "KEY=VALUE")]
        criteria: Vec<String>,
    },

    /// Show record counts per collection and recent activity
    Stats,

    /// Write a backup of all data to a JSON file
    Backup {
        /// Output file (default: backup_YYYYMMDD_HHMMSS.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all data with the contents of a backup file
    Restore { file: PathBuf },

    /// Erase all data and start from an empty store
    Clear {
        /// Confirm erasing everything
        #[arg(long)]
        yes: bool,
    },

    /// View or modify configuration
    Config {
        /// Config key to get or set
        key: Option<String>,

        /// Value to set (if provided, sets the key)
        value: Option<String>,

        /// List all configuration
        #[arg(short, long)]
        list: bool,
    },
}
