//! In-memory prompt store

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

use super::{
    ChangeNotifier, Prompt, PromptStore, StorageChange, StorageData, StorageKey, StoreError,
    UserSettings,
};

/// Prompt store held in memory
///
/// `set_unavailable(true)` makes every call fail, which lets callers
/// exercise their store-failure path.
#[derive(Default)]
pub struct MemoryPromptStore {
    data: RwLock<StorageData>,
    notifier: ChangeNotifier,
    unavailable: AtomicBool,
}

impl MemoryPromptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompts(prompts: Vec<Prompt>) -> Self {
        let store = Self::default();
        store.data.write().prompts = prompts;
        store
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PromptStore for MemoryPromptStore {
    async fn get_prompts(&self) -> Result<Vec<Prompt>, StoreError> {
        self.check()?;
        Ok(self.data.read().prompts.clone())
    }

    async fn get_user_settings(&self) -> Result<UserSettings, StoreError> {
        self.check()?;
        Ok(self.data.read().user_settings.clone())
    }

    async fn save_prompts(&self, prompts: Vec<Prompt>) -> Result<(), StoreError> {
        self.check()?;
        self.data.write().prompts = prompts;
        self.notifier.notify(StorageKey::Prompts);
        Ok(())
    }

    async fn save_user_settings(&self, settings: UserSettings) -> Result<(), StoreError> {
        self.check()?;
        self.data.write().user_settings = settings;
        self.notifier.notify(StorageKey::UserSettings);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<StorageChange> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_notify() {
        let store = MemoryPromptStore::new();
        let mut changes = store.subscribe();

        store
            .save_prompts(vec![Prompt::new("Hi", "Say hi")])
            .await
            .unwrap();

        assert_eq!(store.get_prompts().await.unwrap().len(), 1);
        let change = changes.recv().await.unwrap();
        assert!(change.touches(StorageKey::Prompts));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryPromptStore::with_prompts(vec![Prompt::new("", "x")]);
        store.set_unavailable(true);
        assert!(matches!(
            store.get_prompts().await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert!(store.get_prompts().await.is_ok());
    }
}
