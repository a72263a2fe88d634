use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// String key-value persistence, in the shape of browser local storage.
pub trait KeyValueStore: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// JSON object on disk, rewritten on every write.
#[derive(Debug, Clone)]
pub struct FileStore {
    items: BTreeMap<String, String>,
    file_path: PathBuf,
}

impl FileStore {
    pub fn load_or_create() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("tui-homepage");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        }

        Self::open(config_dir.join("storage.json"))
    }

    pub fn open(file_path: PathBuf) -> Result<Self> {
        let items = match file_path.exists() {
            true => {
                let content =
                    fs::read_to_string(&file_path).context("Failed to read storage file")?;
                serde_json::from_str(&content).context("Failed to parse storage file")?
            }
            false => BTreeMap::new(),
        };
        Ok(Self { items, file_path })
    }

    fn save(&self) -> Result<()> {
        let content =
            serde_json::to_string_pretty(&self.items).context("Failed to serialize storage")?;
        fs::write(&self.file_path, content).context("Failed to write storage file")?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        self.save()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage that refuses every access, used when nothing can be persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

impl KeyValueStore for DisabledStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        anyhow::bail!("storage is disabled")
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
        anyhow::bail!("storage is disabled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_through_disk() {
        let path = std::env::temp_dir().join("tui_homepage_storage_test.json");
        let _ = fs::remove_file(&path);

        let mut store = FileStore::open(path.clone()).unwrap();
        assert_eq!(store.get_item("theme").unwrap(), None);
        store.set_item("theme", "dark").unwrap();

        let reopened = FileStore::open(path.clone()).unwrap();
        assert_eq!(reopened.get_item("theme").unwrap().as_deref(), Some("dark"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = std::env::temp_dir().join("tui_homepage_storage_corrupt.json");
        fs::write(&path, "not json").unwrap();
        assert!(FileStore::open(path.clone()).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn disabled_store_fails_every_call() {
        let mut store = DisabledStore;
        assert!(store.get_item("theme").is_err());
        assert!(store.set_item("theme", "dark").is_err());
    }
}
