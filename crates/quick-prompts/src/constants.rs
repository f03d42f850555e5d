//! Crate-wide constants
//!
//! Single source of truth for marker names, default styling and the
//! suggestion API defaults.

/// Injected button bar
pub mod bar {
    /// Class carried by every injected bar; the uniqueness invariant is scoped by it
    pub const MARKER_CLASS: &str = "quick-prompts-container";
    /// Prefix of generated bar ids
    pub const ID_PREFIX: &str = "quick-prompts-container";
    /// Default inline style of the bar container
    pub const STYLE: &[(&str, &str)] = &[
        ("display", "flex"),
        ("flex-wrap", "wrap"),
        ("gap", "8px"),
        ("margin", "8px 0"),
        ("padding", "8px"),
        ("border-radius", "8px"),
        ("background-color", "rgba(247, 247, 248, 0.1)"),
        ("width", "100%"),
    ];
}

/// Prompt buttons
pub mod button {
    pub const CLASS: &str = "quick-prompt-button";
    /// Background used when a prompt has no colour
    pub const DEFAULT_COLOR: &str = "#444654";
    pub const TEXT_COLOR: &str = "#ffffff";
    /// Characters of prompt text shown when a prompt has no name
    pub const LABEL_MAX_CHARS: usize = 15;
    pub const ELLIPSIS: &str = "...";
    /// Icon font class for the leading glyph
    pub const ICON_CLASS: &str = "material-icons";
    pub const HOVER_FILTER: &str = "brightness(1.1)";
    pub const REST_FILTER: &str = "brightness(1)";
    pub const STYLE: &[(&str, &str)] = &[
        ("padding", "6px 12px"),
        ("border-radius", "4px"),
        ("border", "none"),
        ("font-size", "14px"),
        ("cursor", "pointer"),
        ("transition", "background 0.3s"),
    ];
}

/// Rich editor class names used to pick an insertion strategy
pub mod editors {
    /// Quill-style block editor root
    pub const QUILL: &str = "ql-editor";
    /// Quill's empty-state marker on the editor root
    pub const QUILL_BLANK: &str = "ql-blank";
    /// ProseMirror-style paragraph editor root
    pub const PROSEMIRROR: &str = "ProseMirror";
}

/// Storage keys and files
pub mod storage {
    pub const PROMPTS_KEY: &str = "prompts";
    pub const USER_SETTINGS_KEY: &str = "userSettings";
    pub const DATA_FILE: &str = "quick-prompts.json";
}

/// Import/export format
pub mod export {
    /// Only schema version understood by the importer
    pub const VERSION: u64 = 1;
}

/// Category suggestion API defaults
pub mod suggest {
    pub const API_URL: &str = "https://api.openai.com/v1/chat/completions";
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    pub const TEMPERATURE: f64 = 0.3;
    pub const MAX_TOKENS: u32 = 1500;
}
