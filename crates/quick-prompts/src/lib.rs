//! Quick Prompts - one-click prompt buttons for AI chat pages
//!
//! This crate is the page-side core: it recognises which chat service a
//! page belongs to, waits for that service's composer to appear, mounts a
//! bar of saved-prompt buttons next to it, and inserts a prompt's text into
//! whatever editor the composer uses when a button is clicked.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                    ContentScript                      │
//! │  detect_site → AdapterRegistry → InjectionContext     │
//! └──────────┬───────────────────────────┬────────────────┘
//!            │ mutations                 │ storage changes
//!            ▼                           ▼
//!     ┌─────────────┐            ┌───────────────┐
//!     │ DomWatcher  │──attach──▶ │ ButtonBar     │
//!     └─────────────┘  replace   │ Injector      │
//!                                └──────┬────────┘
//!                                       │ click
//!                                       ▼
//!                            InputAdapter::insert_text
//! ```
//!
//! Around that core sit the prompt library helpers (editing, import and
//! export), the prompt store seam, and an OpenAI-backed category
//! suggester.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quick_prompts::{AdapterRegistry, ContentScript, FilePromptStore, QuickPromptsConfig};
//!
//! let store = Arc::new(FilePromptStore::in_dir(&data_dir));
//! let script = ContentScript::new(&page_url, doc, store, &AdapterRegistry::new(), QuickPromptsConfig::default());
//! script.run().await;
//! ```

pub mod adapter;
pub mod config;
pub mod constants;
pub mod content_script;
pub mod diagnostics;
pub mod error;
pub mod injector;
pub mod insertion;
pub mod library;
pub mod site;
pub mod store;
pub mod suggest;
pub mod watcher;

pub use adapter::{AdapterRegistry, InputAdapter, NoopAdapter, Placement, SiteAdapter};
pub use config::{ConfigError, QuickPromptsConfig};
pub use content_script::{ContentScript, InjectionContext};
pub use diagnostics::Diagnostics;
pub use error::{QuickPromptsError, Result};
pub use injector::{button_label, ButtonBarInjector};
pub use insertion::{classify, insert_text, InsertOutcome, InsertStrategy};
pub use library::{ImportAction, ImportError, MoveDirection, PromptExportData};
pub use site::{detect_site, SiteKind};
pub use store::{
    FilePromptStore, MemoryPromptStore, Prompt, PromptStore, StorageChange, StorageData,
    StorageKey, StoreError, UserSettings,
};
pub use suggest::{CategorySuggester, CategorySuggestion, OpenAiCategorySuggester, SuggestError};
pub use watcher::{DomWatcher, Transition, WatchState};
