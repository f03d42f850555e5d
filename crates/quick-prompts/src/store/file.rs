//! JSON file prompt store
//!
//! All data lives in one JSON document (`StorageData`). A legacy location
//! may be configured; when the primary file is missing it is read from
//! there once and migrated.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use super::{
    ChangeNotifier, Prompt, PromptStore, StorageChange, StorageData, StorageKey, StoreError,
    UserSettings,
};
use crate::constants::storage;

pub struct FilePromptStore {
    path: PathBuf,
    legacy_path: Option<PathBuf>,
    /// Serialises reads, read-modify-write cycles and legacy migration
    write_lock: Mutex<()>,
    notifier: ChangeNotifier,
}

impl FilePromptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            legacy_path: None,
            write_lock: Mutex::new(()),
            notifier: ChangeNotifier::default(),
        }
    }

    /// Store at the default file name inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(storage::DATA_FILE))
    }

    /// Read from `legacy` when the primary file does not exist yet
    pub fn with_legacy_path(mut self, legacy: impl Into<PathBuf>) -> Self {
        self.legacy_path = Some(legacy.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the data file with defaults if nothing is stored yet
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        if self.path.exists() {
            return Ok(());
        }
        let data = self.load().await?;
        self.write(&data).await?;
        log::info!("Initialised prompt store at {:?}", self.path);
        Ok(())
    }

    async fn load(&self) -> Result<StorageData, StoreError> {
        if self.path.exists() {
            return read_data(&self.path).await;
        }
        if let Some(legacy) = self.legacy_path.as_deref().filter(|p| p.exists()) {
            log::info!("Migrating prompt data from {:?} to {:?}", legacy, self.path);
            let data = read_data(legacy).await?;
            self.write(&data).await?;
            return Ok(data);
        }
        Ok(StorageData::default())
    }

    async fn write(&self, data: &StorageData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(data)?;
        // Readers only ever see a complete document
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }

    async fn update<F>(&self, key: StorageKey, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut StorageData) + Send,
    {
        {
            let _guard = self.write_lock.lock().await;
            let mut data = self.load().await?;
            apply(&mut data);
            self.write(&data).await?;
        }
        log::debug!("Saved {} to {:?}", key.as_str(), self.path);
        self.notifier.notify(key);
        Ok(())
    }
}

async fn read_data(path: &Path) -> Result<StorageData, StoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

#[async_trait]
impl PromptStore for FilePromptStore {
    async fn get_prompts(&self) -> Result<Vec<Prompt>, StoreError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.load().await?.prompts)
    }

    async fn get_user_settings(&self) -> Result<UserSettings, StoreError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.load().await?.user_settings)
    }

    async fn save_prompts(&self, prompts: Vec<Prompt>) -> Result<(), StoreError> {
        self.update(StorageKey::Prompts, move |data| data.prompts = prompts)
            .await
    }

    async fn save_user_settings(&self, settings: UserSettings) -> Result<(), StoreError> {
        self.update(StorageKey::UserSettings, move |data| {
            data.user_settings = settings
        })
        .await
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<StorageChange> {
        self.notifier.subscribe()
    }
}
