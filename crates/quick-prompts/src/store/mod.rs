//! Prompt store client
//!
//! The content script only reads through this seam: an ordered prompt list,
//! the user's settings, and a stream of which top-level keys changed. The
//! options page side (library editing, import/export) writes through it.
//!
//! Two implementations ship with the crate:
//! - `MemoryPromptStore` for embedding and tests
//! - `FilePromptStore` persisting a single JSON document with `tokio::fs`

mod file;
mod memory;

pub use file::FilePromptStore;
pub use memory::MemoryPromptStore;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::constants::storage;

/// Errors reading or writing prompt data
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed stored data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A saved prompt; list order is display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub category: String,
    /// CSS colour for the button background; empty means the default
    #[serde(default)]
    pub color: String,
    /// Icon-font glyph name; empty means no icon
    #[serde(default)]
    pub icon: String,
}

impl Prompt {
    /// A prompt with a fresh id and no styling
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            text: text.into(),
            category: String::new(),
            color: String::new(),
            icon: String::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }
}

fn default_true() -> bool {
    true
}

/// User preferences shared by the options page and the content script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(rename = "openAIApiKey", default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_model_id: Option<String>,
    #[serde(default)]
    pub debug_mode_enabled: bool,
    #[serde(default = "default_true")]
    pub show_prompt_icons: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            selected_model_id: None,
            debug_mode_enabled: false,
            show_prompt_icons: true,
        }
    }
}

/// Everything the store persists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageData {
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    #[serde(default)]
    pub user_settings: UserSettings,
}

/// Top-level storage keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageKey {
    Prompts,
    UserSettings,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Prompts => storage::PROMPTS_KEY,
            StorageKey::UserSettings => storage::USER_SETTINGS_KEY,
        }
    }
}

/// Notification of which keys changed in one write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub keys: Vec<StorageKey>,
}

impl StorageChange {
    pub fn new(keys: Vec<StorageKey>) -> Self {
        Self { keys }
    }

    pub fn touches(&self, key: StorageKey) -> bool {
        self.keys.contains(&key)
    }

    /// Whether the button bar depends on anything in this change
    pub fn affects_bar(&self) -> bool {
        self.touches(StorageKey::Prompts) || self.touches(StorageKey::UserSettings)
    }
}

/// Read/write access to prompts and settings
#[async_trait]
pub trait PromptStore: Send + Sync {
    async fn get_prompts(&self) -> Result<Vec<Prompt>, StoreError>;

    async fn get_user_settings(&self) -> Result<UserSettings, StoreError>;

    async fn save_prompts(&self, prompts: Vec<Prompt>) -> Result<(), StoreError>;

    async fn save_user_settings(&self, settings: UserSettings) -> Result<(), StoreError>;

    /// Receive a `StorageChange` after every successful save
    fn subscribe(&self) -> mpsc::UnboundedReceiver<StorageChange>;
}

/// Fan-out of change notifications to live subscribers
#[derive(Default)]
pub(crate) struct ChangeNotifier {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<StorageChange>>>,
}

impl ChangeNotifier {
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StorageChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn notify(&self, key: StorageKey) {
        let change = StorageChange::new(vec![key]);
        self.subscribers
            .lock()
            .retain(|tx| tx.send(change.clone()).is_ok());
        log::trace!("Storage key {} changed", key.as_str());
    }
}
