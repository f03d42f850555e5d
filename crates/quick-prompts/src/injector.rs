//! Button bar injection
//!
//! Builds one container of prompt buttons and hands it to the site adapter
//! for placement. Every bar carries the configured marker class; before a
//! new bar goes in, every marked element in the document is removed, so
//! repeated or interleaved injections never leave two bars behind.

use std::sync::Arc;

use page_dom::{event_types, DomError, Document, NodeId};

use crate::adapter::InputAdapter;
use crate::config::QuickPromptsConfig;
use crate::constants::button;
use crate::diagnostics::Diagnostics;
use crate::store::{Prompt, UserSettings};

/// Visible label: the name, or the start of the text with an ellipsis
pub fn button_label(prompt: &Prompt, max_chars: usize) -> String {
    if !prompt.name.trim().is_empty() {
        return prompt.name.clone();
    }
    if prompt.text.chars().count() <= max_chars {
        return prompt.text.clone();
    }
    let head: String = prompt.text.chars().take(max_chars).collect();
    format!("{}{}", head, button::ELLIPSIS)
}

pub struct ButtonBarInjector {
    config: QuickPromptsConfig,
    /// Distinguishes this script instance's bar ids from a previous instance's
    instance_token: String,
    sequence: u64,
    bar: Option<NodeId>,
    mounted_on: Option<NodeId>,
}

impl ButtonBarInjector {
    pub fn new(config: QuickPromptsConfig) -> Self {
        let token = chrono::Utc::now().timestamp_millis().to_string();
        Self::with_instance_token(config, token)
    }

    pub fn with_instance_token(config: QuickPromptsConfig, token: impl Into<String>) -> Self {
        Self {
            config,
            instance_token: token.into(),
            sequence: 0,
            bar: None,
            mounted_on: None,
        }
    }

    pub fn config(&self) -> &QuickPromptsConfig {
        &self.config
    }

    /// The live bar, if one was injected
    pub fn bar(&self) -> Option<NodeId> {
        self.bar
    }

    /// Anchor the live bar was mounted against
    pub fn mounted_on(&self) -> Option<NodeId> {
        self.mounted_on
    }

    fn next_bar_id(&mut self) -> String {
        self.sequence += 1;
        format!(
            "{}-{}-{}",
            self.config.bar_id_prefix, self.instance_token, self.sequence
        )
    }

    /// Remove every marked bar except `keep`; returns how many went
    pub fn remove_strays(&self, doc: &Document, keep: Option<NodeId>) -> usize {
        let selector = format!(".{}", self.config.marker_class);
        let marked = match doc.query_selector_all(&selector) {
            Ok(marked) => marked,
            Err(err) => {
                log::warn!("Marker selector {:?} rejected: {}", selector, err);
                return 0;
            }
        };
        let mut removed = 0;
        for stray in marked.into_iter().filter(|node| Some(*node) != keep) {
            doc.clear_event_listeners(stray);
            if doc.remove(stray).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// Remove the live bar and any stray ones
    pub fn remove_bar(&mut self, doc: &Document) -> usize {
        let mut removed = 0;
        if let Some(bar) = self.bar.take() {
            // The host may have detached the bar along with its composer
            doc.clear_event_listeners(bar);
            if doc.is_connected(bar) && doc.remove(bar).is_ok() {
                removed += 1;
            }
        }
        self.mounted_on = None;
        removed + self.remove_strays(doc, None)
    }

    /// Replace any bar with a fresh one for `prompts`, mounted against `anchor`
    ///
    /// Returns `None` without touching the document when `prompts` is empty.
    pub fn inject(
        &mut self,
        doc: &Document,
        adapter: &Arc<dyn InputAdapter>,
        anchor: NodeId,
        prompts: &[Prompt],
        settings: &UserSettings,
        diagnostics: Diagnostics,
    ) -> Result<Option<NodeId>, DomError> {
        if prompts.is_empty() {
            return Ok(None);
        }

        let removed = self.remove_bar(doc);
        if removed > 0 {
            diagnostics.log(format_args!("Removed {} existing bar(s)", removed));
        }

        let container = doc.create_element("div");
        let id = self.next_bar_id();
        doc.set_attribute(container, "id", &id)?;
        doc.add_class(container, &self.config.marker_class)?;
        for (property, value) in &self.config.bar_style {
            doc.set_style(container, property, value)?;
        }

        for prompt in prompts {
            let button = self.build_button(doc, adapter, prompt, settings.show_prompt_icons, diagnostics)?;
            doc.append_child(container, button)?;
        }

        if let Err(err) = adapter.mount(doc, anchor, container) {
            doc.clear_event_listeners(container);
            return Err(err);
        }
        self.bar = Some(container);
        self.mounted_on = Some(anchor);
        diagnostics.log(format_args!(
            "Injected bar {} with {} prompt(s) on {}",
            id,
            prompts.len(),
            adapter.site()
        ));
        Ok(Some(container))
    }

    fn build_button(
        &self,
        doc: &Document,
        adapter: &Arc<dyn InputAdapter>,
        prompt: &Prompt,
        show_icons: bool,
        diagnostics: Diagnostics,
    ) -> Result<NodeId, DomError> {
        let color = if prompt.color.trim().is_empty() {
            self.config.default_button_color.as_str()
        } else {
            prompt.color.as_str()
        };
        let with_icon = show_icons && !prompt.icon.trim().is_empty();

        let mut builder = doc
            .build("button")
            .attr("type", "button")
            .class(&self.config.button_class)
            .attr("data-prompt-id", &prompt.id)
            .attr("title", &prompt.text)
            .style("background-color", color)
            .style("color", &self.config.button_text_color);
        for (property, value) in &self.config.button_style {
            builder = builder.style(property, value);
        }
        if with_icon {
            let icon = doc
                .build("span")
                .class(button::ICON_CLASS)
                .style("font-size", "16px")
                .style("margin-right", "4px")
                .text(&prompt.icon)
                .build()?;
            builder = builder
                .style("display", "inline-flex")
                .style("align-items", "center")
                .child(icon);
        }
        let button = builder
            .text(&button_label(prompt, self.config.label_max_chars))
            .build()?;

        let weak = doc.downgrade();
        let adapter = Arc::clone(adapter);
        let text = prompt.text.clone();
        let prompt_id = prompt.id.clone();
        doc.add_event_listener(button, event_types::CLICK, move |event| {
            event.prevent_default();
            event.stop_propagation();
            let Some(doc) = weak.upgrade() else {
                return;
            };
            match adapter.insert_prompt(&doc, &text) {
                Some(outcome) => diagnostics.log(format_args!(
                    "Inserted prompt {} via {:?}",
                    prompt_id, outcome.strategy
                )),
                None => diagnostics.log(format_args!(
                    "Prompt {} not inserted: no input widget",
                    prompt_id
                )),
            }
        });

        for (event_type, filter) in [
            (event_types::MOUSE_OVER, button::HOVER_FILTER),
            (event_types::MOUSE_OUT, button::REST_FILTER),
        ] {
            let weak = doc.downgrade();
            doc.add_event_listener(button, event_type, move |event| {
                if let Some(doc) = weak.upgrade() {
                    let _ = doc.set_style(event.current_target, "filter", filter);
                }
            });
        }

        Ok(button)
    }
}
