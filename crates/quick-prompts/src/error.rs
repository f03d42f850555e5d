//! Error types for the quick-prompts core

use thiserror::Error;

use page_dom::DomError;

use crate::config::ConfigError;
use crate::library::ImportError;
use crate::site::SiteKind;
use crate::store::StoreError;
use crate::suggest::SuggestError;

/// Top-level error for content-script and library operations
#[derive(Debug, Error)]
pub enum QuickPromptsError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("No input widget found on {0}")]
    WidgetNotFound(SiteKind),

    #[error("No composer anchor found on {0}")]
    AnchorNotFound(SiteKind),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Category suggestion error: {0}")]
    Suggest(#[from] SuggestError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for quick-prompts operations
pub type Result<T> = std::result::Result<T, QuickPromptsError>;
