//! Prompt library operations
//!
//! Pure functions over an ordered prompt list, used by whatever surface
//! edits the library:
//! - add / update / delete / reorder
//! - export to and import from the versioned JSON exchange format
//! - merging imported prompts into the existing list
//! - applying category suggestions
//!
//! Callers persist the result with [`PromptStore::save_prompts`].
//!
//! [`PromptStore::save_prompts`]: crate::store::PromptStore::save_prompts

use std::collections::HashSet;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::export;
use crate::store::Prompt;
use crate::suggest::CategorySuggestion;

/// Errors validating an import file
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported export version: {0}")]
    UnsupportedVersion(Value),

    #[error("Import file has no prompts array")]
    MissingPrompts,

    #[error("Prompt {index} is invalid: {reason}")]
    InvalidPrompt { index: usize, reason: String },
}

/// Versioned exchange format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptExportData {
    pub version: u64,
    /// RFC 3339 timestamp
    pub exported_at: String,
    pub prompts: Vec<Prompt>,
}

/// How imported prompts combine with the current list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportAction {
    /// Discard the current list
    ReplaceAll,
    /// Append imported prompts whose id is not already present
    MergeNew,
    /// Drop current prompts sharing an id with a chosen imported prompt,
    /// then append the chosen ones
    ReplaceSelected(HashSet<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

// ─── EDITING ────────────────────────────────────────────────────────

/// Append a prompt, assigning an id if it has none; returns the id
pub fn add_prompt(prompts: &mut Vec<Prompt>, mut prompt: Prompt) -> String {
    if prompt.id.trim().is_empty() {
        prompt.id = uuid::Uuid::new_v4().to_string();
    }
    let id = prompt.id.clone();
    prompts.push(prompt);
    id
}

/// Replace the prompt with the same id in place
pub fn update_prompt(prompts: &mut [Prompt], updated: Prompt) -> bool {
    match prompts.iter_mut().find(|p| p.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

pub fn delete_prompt(prompts: &mut Vec<Prompt>, id: &str) -> bool {
    let before = prompts.len();
    prompts.retain(|p| p.id != id);
    prompts.len() != before
}

/// Swap a prompt with its neighbour; false at either end or for unknown ids
pub fn move_prompt(prompts: &mut [Prompt], id: &str, direction: MoveDirection) -> bool {
    let Some(index) = prompts.iter().position(|p| p.id == id) else {
        return false;
    };
    let target = match direction {
        MoveDirection::Up if index > 0 => index - 1,
        MoveDirection::Down if index + 1 < prompts.len() => index + 1,
        _ => return false,
    };
    prompts.swap(index, target);
    true
}

/// Set categories from suggestions; returns how many prompts changed
pub fn apply_categories(prompts: &mut [Prompt], suggestions: &[CategorySuggestion]) -> usize {
    let mut changed = 0;
    for suggestion in suggestions {
        if let Some(prompt) = prompts.iter_mut().find(|p| p.id == suggestion.prompt_id) {
            if prompt.category != suggestion.category {
                prompt.category = suggestion.category.clone();
                changed += 1;
            }
        }
    }
    changed
}

/// Distinct non-empty categories in first-seen order
pub fn categories(prompts: &[Prompt]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for prompt in prompts {
        if !prompt.category.is_empty() && seen.insert(prompt.category.as_str()) {
            out.push(prompt.category.clone());
        }
    }
    out
}

// ─── EXCHANGE ───────────────────────────────────────────────────────

pub fn export_prompts(prompts: &[Prompt]) -> PromptExportData {
    PromptExportData {
        version: export::VERSION,
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        prompts: prompts.to_vec(),
    }
}

pub fn export_json(prompts: &[Prompt]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export_prompts(prompts))
}

/// Validate an export file and return its prompts
///
/// Every prompt needs a string `id` and `text`; the other fields default
/// to empty.
pub fn parse_import(json: &str) -> Result<Vec<Prompt>, ImportError> {
    let value: Value = serde_json::from_str(json)?;

    match value.get("version") {
        Some(Value::Number(n)) if n.as_u64() == Some(export::VERSION) => {}
        Some(other) => return Err(ImportError::UnsupportedVersion(other.clone())),
        None => return Err(ImportError::UnsupportedVersion(Value::Null)),
    }

    let Some(items) = value.get("prompts").and_then(Value::as_array) else {
        return Err(ImportError::MissingPrompts);
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            for field in ["id", "text"] {
                if !item.get(field).is_some_and(Value::is_string) {
                    return Err(ImportError::InvalidPrompt {
                        index,
                        reason: format!("missing string field `{}`", field),
                    });
                }
            }
            serde_json::from_value(item.clone()).map_err(|err| ImportError::InvalidPrompt {
                index,
                reason: err.to_string(),
            })
        })
        .collect()
}

/// Combine `incoming` with `current` according to `action`
pub fn apply_import(current: &[Prompt], incoming: Vec<Prompt>, action: &ImportAction) -> Vec<Prompt> {
    match action {
        ImportAction::ReplaceAll => incoming,
        ImportAction::MergeNew => {
            let existing: HashSet<&str> = current.iter().map(|p| p.id.as_str()).collect();
            let mut merged = current.to_vec();
            merged.extend(incoming.into_iter().filter(|p| !existing.contains(p.id.as_str())));
            merged
        }
        ImportAction::ReplaceSelected(selected) => {
            let chosen: Vec<Prompt> = incoming
                .into_iter()
                .filter(|p| selected.contains(&p.id))
                .collect();
            let replaced: HashSet<&str> = chosen.iter().map(|p| p.id.as_str()).collect();
            let mut merged: Vec<Prompt> = current
                .iter()
                .filter(|p| !replaced.contains(p.id.as_str()))
                .cloned()
                .collect();
            merged.extend(chosen);
            merged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(id: &str, text: &str) -> Prompt {
        Prompt {
            id: id.to_string(),
            text: text.to_string(),
            ..Prompt::new("", "")
        }
    }

    fn ids(prompts: &[Prompt]) -> Vec<&str> {
        prompts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_add_assigns_missing_id() {
        let mut prompts = Vec::new();
        let id = add_prompt(&mut prompts, prompt("", "text"));
        assert!(!id.is_empty());
        assert_eq!(prompts[0].id, id);

        let id = add_prompt(&mut prompts, prompt("keep", "text"));
        assert_eq!(id, "keep");
    }

    #[test]
    fn test_update_and_delete() {
        let mut prompts = vec![prompt("a", "one"), prompt("b", "two")];
        assert!(update_prompt(&mut prompts, prompt("b", "TWO")));
        assert_eq!(prompts[1].text, "TWO");
        assert!(!update_prompt(&mut prompts, prompt("z", "none")));

        assert!(delete_prompt(&mut prompts, "a"));
        assert!(!delete_prompt(&mut prompts, "a"));
        assert_eq!(ids(&prompts), vec!["b"]);
    }

    #[test]
    fn test_move_within_bounds() {
        let mut prompts = vec![prompt("a", ""), prompt("b", ""), prompt("c", "")];
        assert!(move_prompt(&mut prompts, "c", MoveDirection::Up));
        assert_eq!(ids(&prompts), vec!["a", "c", "b"]);
        assert!(!move_prompt(&mut prompts, "a", MoveDirection::Up));
        assert!(!move_prompt(&mut prompts, "b", MoveDirection::Down));
        assert!(move_prompt(&mut prompts, "a", MoveDirection::Down));
        assert_eq!(ids(&prompts), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_apply_categories() {
        let mut prompts = vec![prompt("a", ""), prompt("b", "")];
        let suggestions = vec![
            CategorySuggestion {
                prompt_id: "a".to_string(),
                category: "Writing".to_string(),
            },
            CategorySuggestion {
                prompt_id: "missing".to_string(),
                category: "Code".to_string(),
            },
        ];
        assert_eq!(apply_categories(&mut prompts, &suggestions), 1);
        assert_eq!(prompts[0].category, "Writing");
        assert_eq!(apply_categories(&mut prompts, &suggestions), 0);
        assert_eq!(categories(&prompts), vec!["Writing".to_string()]);
    }

    #[test]
    fn test_export_then_import() {
        let prompts = vec![prompt("a", "one").with_color("#ff0000")];
        let json = export_json(&prompts).unwrap();

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert!(chrono::DateTime::parse_from_rfc3339(value["exportedAt"].as_str().unwrap()).is_ok());

        assert_eq!(parse_import(&json).unwrap(), prompts);
    }

    #[test]
    fn test_import_validation() {
        assert!(matches!(parse_import("nope"), Err(ImportError::Json(_))));
        assert!(matches!(
            parse_import(r#"{"version": 2, "prompts": []}"#),
            Err(ImportError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            parse_import(r#"{"prompts": []}"#),
            Err(ImportError::UnsupportedVersion(Value::Null))
        ));
        assert!(matches!(
            parse_import(r#"{"version": 1}"#),
            Err(ImportError::MissingPrompts)
        ));
        assert!(matches!(
            parse_import(r#"{"version": 1, "prompts": [{"id": "a", "text": "ok"}, {"id": "b"}]}"#),
            Err(ImportError::InvalidPrompt { index: 1, .. })
        ));

        let prompts =
            parse_import(r#"{"version": 1, "prompts": [{"id": "a", "text": "ok"}]}"#).unwrap();
        assert_eq!(prompts[0].name, "");
    }

    #[test]
    fn test_import_actions() {
        let current = vec![prompt("a", "old a"), prompt("b", "old b")];
        let incoming = vec![prompt("b", "new b"), prompt("c", "new c")];

        let replaced = apply_import(&current, incoming.clone(), &ImportAction::ReplaceAll);
        assert_eq!(ids(&replaced), vec!["b", "c"]);

        let merged = apply_import(&current, incoming.clone(), &ImportAction::MergeNew);
        assert_eq!(ids(&merged), vec!["a", "b", "c"]);
        assert_eq!(merged[1].text, "old b");

        let current = vec![prompt("a", "old a"), prompt("b", "old b"), prompt("d", "old d")];
        let selected: HashSet<String> = ["b".to_string()].into_iter().collect();
        let partial = apply_import(&current, incoming, &ImportAction::ReplaceSelected(selected));
        assert_eq!(ids(&partial), vec!["a", "d", "b"]);
        assert_eq!(partial[2].text, "new b");
    }
}
