//! Key-value storage media backing the record store

use crate::error::{AnsError, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Synchronous string key-value storage.
///
/// Values are serialized JSON documents; the medium never interprets them.
pub trait Medium {
    /// Read a value, `None` if the key was never written
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every key
    fn clear(&self) -> Result<()>;

    /// All keys currently stored, sorted
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-process medium with an optional size limit
#[derive(Debug, Default)]
pub struct MemoryMedium {
    items: RefCell<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        MemoryMedium::default()
    }

    /// Limit the total size of keys and values to `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        MemoryMedium {
            items: RefCell::new(BTreeMap::new()),
            quota: Some(quota),
        }
    }

    /// Bytes currently used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.items
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Medium for MemoryMedium {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let replaced = self
                .items
                .borrow()
                .get(key)
                .map(|old| key.len() + old.len())
                .unwrap_or(0);
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > quota {
                return Err(AnsError::QuotaExceeded { needed, quota });
            }
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.items.borrow_mut().clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.borrow().keys().cloned().collect())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    /// Open a medium rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileMedium { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AnsError::Config(format!("Invalid storage key: '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn stored_files(&self) -> Vec<(String, PathBuf)> {
        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?;
                let key = name.strip_suffix(".json")?.to_string();
                Some((key, entry.path().to_path_buf()))
            })
            .collect()
    }
}

impl Medium for FileMedium {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AnsError::Io(e)),
        }
    }

    /// Write to a temp file in the same directory, then rename into place.
    ///
    /// On Windows, `rename` does not overwrite existing files, so the
    /// destination is removed first.
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp_path = self
            .dir
            .join(format!("{}.ans-tmp-{}", key, std::process::id()));

        fs::write(&tmp_path, value)?;

        if cfg!(windows) && path.exists() {
            fs::remove_file(&path)?;
        }

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AnsError::Io(e)),
        }
    }

    fn clear(&self) -> Result<()> {
        for (_, path) in self.stored_files() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.stored_files().into_iter().map(|(k, _)| k).collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_set_get_remove() {
        let medium = MemoryMedium::new();
        assert_eq!(medium.get_item("a").unwrap(), None);

        medium.set_item("a", "[1]").unwrap();
        assert_eq!(medium.get_item("a").unwrap().as_deref(), Some("[1]"));

        medium.remove_item("a").unwrap();
        medium.remove_item("a").unwrap();
        assert_eq!(medium.get_item("a").unwrap(), None);
    }

    #[test]
    fn test_memory_quota() {
        let medium = MemoryMedium::with_quota(10);
        medium.set_item("k", "12345").unwrap();

        // Replacing a value only counts the difference
        medium.set_item("k", "123456789").unwrap();

        match medium.set_item("j", "1") {
            Err(AnsError::QuotaExceeded { needed, quota }) => {
                assert_eq!(needed, 12);
                assert_eq!(quota, 10);
            }
            other => panic!("Expected QuotaExceeded, got {:?}", other),
        }
        assert_eq!(medium.get_item("k").unwrap().as_deref(), Some("123456789"));
    }

    #[test]
    fn test_memory_clear_and_keys() {
        let medium = MemoryMedium::new();
        medium.set_item("b", "1").unwrap();
        medium.set_item("a", "2").unwrap();
        assert_eq!(medium.keys().unwrap(), vec!["a", "b"]);

        medium.clear().unwrap();
        assert!(medium.keys().unwrap().is_empty());
        assert_eq!(medium.used_bytes(), 0);
    }

    #[test]
    fn test_file_medium_round_trip() {
        let temp = TempDir::new().unwrap();
        let medium = FileMedium::open(temp.path().join("data")).unwrap();

        assert_eq!(medium.get_item("ans_customers").unwrap(), None);
        medium.set_item("ans_customers", "[]").unwrap();
        medium.set_item("ans_customers", "[{}]").unwrap();

        assert_eq!(
            medium.get_item("ans_customers").unwrap().as_deref(),
            Some("[{}]")
        );
        assert!(temp.path().join("data/ans_customers.json").exists());
    }

    #[test]
    fn test_file_medium_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let medium = FileMedium::open(temp.path()).unwrap();
        medium.set_item("ans_counters", "{}").unwrap();

        let names: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["ans_counters.json"]);
    }

    #[test]
    fn test_file_medium_clear_only_removes_json() {
        let temp = TempDir::new().unwrap();
        let medium = FileMedium::open(temp.path()).unwrap();
        medium.set_item("a", "1").unwrap();
        medium.set_item("b", "2").unwrap();
        fs::write(temp.path().join("README.txt"), "keep").unwrap();

        assert_eq!(medium.keys().unwrap(), vec!["a", "b"]);
        medium.clear().unwrap();

        assert!(medium.keys().unwrap().is_empty());
        assert!(temp.path().join("README.txt").exists());
    }

    #[test]
    fn test_file_medium_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let medium = FileMedium::open(temp.path()).unwrap();
        assert!(medium.set_item("../escape", "1").is_err());
        assert!(medium.get_item("").is_err());
    }
}
