//! Initialize workspace use case

use crate::error::Result;
use crate::infrastructure::{FileSystemRepository, Settings, WorkspaceRepository};
use std::fs;
use std::path::Path;

/// Initialize a new workspace at the specified path.
pub fn init(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }

    let repo = FileSystemRepository::new(path.to_path_buf());

    repo.initialize()?;
    repo.save_settings(&Settings::new())?;

    // Opening the store seeds counters, configuration and empty collections
    let store = repo.open_store()?;
    let stats = store.stats();
    tracing::debug!(?stats, "Seeded workspace");

    println!("Initialized ansledger workspace at {}", path.display());

    Ok(())
}
