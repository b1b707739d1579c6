//! Workspace discovery and layout

use crate::error::{AnsError, Result};
use crate::infrastructure::config::{Settings, WORKSPACE_DIR};
use crate::infrastructure::medium::FileMedium;
use crate::infrastructure::store::RecordStore;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that pins the workspace root
pub const ROOT_ENV: &str = "ANSLEDGER_ROOT";

/// Abstract access to a workspace on disk
pub trait WorkspaceRepository {
    /// Get the root directory of this workspace
    fn root(&self) -> &Path;

    /// Load settings from .ansledger/config.toml
    fn load_settings(&self) -> Result<Settings>;

    /// Save settings to .ansledger/config.toml
    fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// Check if .ansledger directory exists
    fn is_initialized(&self) -> bool;

    /// Create .ansledger directory structure
    fn initialize(&self) -> Result<()>;
}

/// File system implementation of WorkspaceRepository
#[derive(Debug, Clone)]
pub struct FileSystemRepository {
    pub root: PathBuf,
}

impl FileSystemRepository {
    /// Create a new repository with the given root directory
    pub fn new(root: PathBuf) -> Self {
        FileSystemRepository { root }
    }

    /// Discover the workspace root.
    /// Checks ANSLEDGER_ROOT first, then walks up from the current directory.
    pub fn discover() -> Result<Self> {
        if let Ok(root_path) = std::env::var(ROOT_ENV) {
            let path = PathBuf::from(root_path);
            if Self::has_workspace_dir(&path) {
                return Ok(FileSystemRepository::new(path));
            } else {
                return Err(AnsError::Config(format!(
                    "{} is set to '{}' but no .ansledger directory found. \
                    Run 'ansledger init' in that directory or unset {}.",
                    ROOT_ENV,
                    path.display(),
                    ROOT_ENV
                )));
            }
        }

        let current_dir = std::env::current_dir()?;
        Self::discover_from(&current_dir)
    }

    /// Discover the workspace root by walking up from a specific starting directory
    pub fn discover_from(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();

        loop {
            if Self::has_workspace_dir(&current) {
                return Ok(FileSystemRepository::new(current));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Err(AnsError::NotWorkspace(start.to_path_buf())),
            }
        }
    }

    fn has_workspace_dir(path: &Path) -> bool {
        path.join(WORKSPACE_DIR).is_dir()
    }

    /// Directory holding one JSON file per persisted key
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR).join("data")
    }

    /// Open the record store over this workspace's data directory
    pub fn open_store(&self) -> Result<RecordStore<FileMedium>> {
        let medium = FileMedium::open(self.data_dir())?;
        Ok(RecordStore::open(medium))
    }
}

impl WorkspaceRepository for FileSystemRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn load_settings(&self) -> Result<Settings> {
        Settings::load_from_dir(&self.root)
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        settings.save_to_dir(&self.root)
    }

    fn is_initialized(&self) -> bool {
        Self::has_workspace_dir(&self.root)
    }

    fn initialize(&self) -> Result<()> {
        let workspace_dir = self.root.join(WORKSPACE_DIR);

        if workspace_dir.exists() {
            return Err(AnsError::Config(format!(
                "Directory already initialized: {}",
                self.root.display()
            )));
        }

        fs::create_dir(&workspace_dir)?;
        fs::create_dir(self.data_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CollectionKey;
    use tempfile::TempDir;

    #[test]
    fn test_is_initialized() {
        let temp = TempDir::new().unwrap();
        let repo = FileSystemRepository::new(temp.path().to_path_buf());

        assert!(!repo.is_initialized());
        repo.initialize().unwrap();
        assert!(repo.is_initialized());
        assert!(repo.data_dir().is_dir());
    }

    #[test]
    fn test_initialize_twice_fails() {
        let temp = TempDir::new().unwrap();
        let repo = FileSystemRepository::new(temp.path().to_path_buf());

        repo.initialize().unwrap();
        assert!(repo.initialize().is_err());
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".ansledger")).unwrap();

        let subdir = temp.path().join("sub").join("deep");
        fs::create_dir_all(&subdir).unwrap();

        let repo = FileSystemRepository::discover_from(&subdir).unwrap();
        assert_eq!(repo.root, temp.path());
    }

    #[test]
    fn test_discover_fails_without_workspace() {
        let temp = TempDir::new().unwrap();

        match FileSystemRepository::discover_from(temp.path()).unwrap_err() {
            AnsError::NotWorkspace(_) => {}
            other => panic!("Expected NotWorkspace error, got {:?}", other),
        }
    }

    #[test]
    fn test_open_store_seeds_data_files() {
        let temp = TempDir::new().unwrap();
        let repo = FileSystemRepository::new(temp.path().to_path_buf());
        repo.initialize().unwrap();

        let store = repo.open_store().unwrap();
        assert_eq!(store.read(CollectionKey::Partners), Some(vec![]));
        assert!(repo.data_dir().join("ans_counters.json").exists());
        assert!(repo.data_dir().join("ans_system_config.json").exists());
    }

    #[test]
    fn test_store_state_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let repo = FileSystemRepository::new(temp.path().to_path_buf());
        repo.initialize().unwrap();

        let code = repo
            .open_store()
            .unwrap()
            .next_code(crate::domain::EntityType::PaymentTerm)
            .unwrap();
        assert_eq!(code, "PAYT-101");

        let code = repo
            .open_store()
            .unwrap()
            .next_code(crate::domain::EntityType::PaymentTerm)
            .unwrap();
        assert_eq!(code, "PAYT-102");
    }
}
