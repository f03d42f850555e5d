//! Site detection
//!
//! Maps a page URL to the chat service it belongs to. Rules are evaluated in
//! order and the first match wins, so narrower rules (a path under a shared
//! host) must come before broader ones.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Chat service a page belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteKind {
    Chatgpt,
    Grok,
    /// Grok embedded in X under `/i/grok`
    XGrok,
    Gemini,
    Deepseek,
    #[serde(rename = "t3chat")]
    T3Chat,
    Claude,
    Mistral,
    #[serde(rename = "aistudio")]
    AiStudio,
    Copilot,
    Perplexity,
    Unknown,
}

impl SiteKind {
    /// Every supported site, excluding `Unknown`
    pub const SUPPORTED: [SiteKind; 11] = [
        SiteKind::Chatgpt,
        SiteKind::Grok,
        SiteKind::XGrok,
        SiteKind::Gemini,
        SiteKind::Deepseek,
        SiteKind::T3Chat,
        SiteKind::Claude,
        SiteKind::Mistral,
        SiteKind::AiStudio,
        SiteKind::Copilot,
        SiteKind::Perplexity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteKind::Chatgpt => "chatgpt",
            SiteKind::Grok => "grok",
            SiteKind::XGrok => "x-grok",
            SiteKind::Gemini => "gemini",
            SiteKind::Deepseek => "deepseek",
            SiteKind::T3Chat => "t3chat",
            SiteKind::Claude => "claude",
            SiteKind::Mistral => "mistral",
            SiteKind::AiStudio => "aistudio",
            SiteKind::Copilot => "copilot",
            SiteKind::Perplexity => "perplexity",
            SiteKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct SiteRule {
    kind: SiteKind,
    hosts: &'static [&'static str],
    path_prefix: Option<&'static str>,
}

const SITE_RULES: &[SiteRule] = &[
    SiteRule {
        kind: SiteKind::Chatgpt,
        hosts: &["chatgpt.com", "chat.openai.com"],
        path_prefix: None,
    },
    SiteRule {
        kind: SiteKind::XGrok,
        hosts: &["x.com", "twitter.com"],
        path_prefix: Some("/i/grok"),
    },
    SiteRule {
        kind: SiteKind::Grok,
        hosts: &["grok.com"],
        path_prefix: None,
    },
    SiteRule {
        kind: SiteKind::AiStudio,
        hosts: &["aistudio.google.com"],
        path_prefix: None,
    },
    SiteRule {
        kind: SiteKind::Gemini,
        hosts: &["gemini.google.com"],
        path_prefix: None,
    },
    SiteRule {
        kind: SiteKind::Deepseek,
        hosts: &["chat.deepseek.com"],
        path_prefix: None,
    },
    SiteRule {
        kind: SiteKind::T3Chat,
        hosts: &["t3.chat"],
        path_prefix: None,
    },
    SiteRule {
        kind: SiteKind::Claude,
        hosts: &["claude.ai"],
        path_prefix: None,
    },
    SiteRule {
        kind: SiteKind::Mistral,
        hosts: &["chat.mistral.ai"],
        path_prefix: None,
    },
    SiteRule {
        kind: SiteKind::Copilot,
        hosts: &["copilot.microsoft.com"],
        path_prefix: None,
    },
    SiteRule {
        kind: SiteKind::Perplexity,
        hosts: &["perplexity.ai"],
        path_prefix: None,
    },
];

fn host_matches(host: &str, rule_host: &str) -> bool {
    host == rule_host
        || host
            .strip_suffix(rule_host)
            .is_some_and(|rest| rest.ends_with('.'))
}

impl SiteRule {
    fn matches(&self, host: &str, path: &str) -> bool {
        self.hosts.iter().any(|h| host_matches(host, h))
            && self.path_prefix.map_or(true, |prefix| path.starts_with(prefix))
    }
}

/// Classify a page URL; anything unrecognised is `SiteKind::Unknown`
pub fn detect_site(url: &str) -> SiteKind {
    let (host, path) = match Url::parse(url) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or_default().to_ascii_lowercase(),
            parsed.path().to_string(),
        ),
        Err(err) => {
            log::debug!("Could not parse {:?} as a URL: {}", url, err);
            return SiteKind::Unknown;
        }
    };

    SITE_RULES
        .iter()
        .find(|rule| rule.matches(&host, &path))
        .map(|rule| rule.kind)
        .unwrap_or(SiteKind::Unknown)
}
