//! Built-in site adapter records
//!
//! Selectors here are the brittle boundary with host markup. Each site's
//! anchor chain must only ever match that site's composer container.

use super::{Placement, SiteAdapter};
use crate::site::SiteKind;

pub const SITE_ADAPTERS: &[SiteAdapter] = &[
    SiteAdapter {
        kind: SiteKind::Chatgpt,
        anchor_selectors: &["#composer-background", "form[data-type=\"unified-composer\"]"],
        input_selectors: &["#prompt-textarea", "form[data-type=\"unified-composer\"] textarea"],
        placement: Placement::AfterAnchor,
    },
    SiteAdapter {
        kind: SiteKind::Grok,
        anchor_selectors: &["form .query-bar"],
        input_selectors: &[
            "form .query-bar textarea",
            "form .query-bar [contenteditable=\"true\"]",
        ],
        placement: Placement::LastChild,
    },
    SiteAdapter {
        kind: SiteKind::XGrok,
        anchor_selectors: &["[data-testid=\"grokComposer\"]", "section[aria-label*=\"Grok\"] form"],
        input_selectors: &[
            "[data-testid=\"grokComposer\"] textarea",
            "section[aria-label*=\"Grok\"] textarea",
        ],
        placement: Placement::AfterAnchor,
    },
    SiteAdapter {
        kind: SiteKind::Gemini,
        anchor_selectors: &["input-area-v2", "input-container .input-area"],
        input_selectors: &[
            "rich-textarea .ql-editor[contenteditable=\"true\"]",
            ".ql-editor[contenteditable=\"true\"]",
        ],
        placement: Placement::BeforeChild(".text-input-field"),
    },
    SiteAdapter {
        kind: SiteKind::Deepseek,
        anchor_selectors: &["div.ds-textarea"],
        input_selectors: &["textarea#chat-input", "div.ds-textarea textarea"],
        placement: Placement::BeforeSibling("div.ds-composer-actions"),
    },
    SiteAdapter {
        kind: SiteKind::T3Chat,
        anchor_selectors: &["form#chat-input-form"],
        input_selectors: &["textarea#chat-input"],
        placement: Placement::BeforeChild("textarea#chat-input"),
    },
    SiteAdapter {
        kind: SiteKind::Claude,
        anchor_selectors: &["fieldset .flex.flex-col", "div[data-testid=\"chat-input\"]"],
        input_selectors: &[
            "div.ProseMirror[contenteditable=\"true\"]",
            "[contenteditable=\"true\"][role=\"textbox\"]",
        ],
        placement: Placement::LastChild,
    },
    SiteAdapter {
        kind: SiteKind::Mistral,
        anchor_selectors: &["form .relative.flex.w-full"],
        input_selectors: &["form div.ProseMirror[contenteditable=\"true\"]", "form textarea"],
        placement: Placement::AfterAnchor,
    },
    SiteAdapter {
        kind: SiteKind::AiStudio,
        anchor_selectors: &["ms-prompt-input-wrapper", "ms-chunk-input"],
        input_selectors: &[
            "ms-autosize-textarea textarea",
            "textarea[aria-label*=\"prompt\"]",
        ],
        placement: Placement::LastChild,
    },
    SiteAdapter {
        kind: SiteKind::Copilot,
        anchor_selectors: &["[data-testid=\"composer-content\"]"],
        input_selectors: &["textarea#userInput", "[data-testid=\"composer-input\"]"],
        placement: Placement::BeforeSibling("[data-testid=\"composer-actions\"]"),
    },
    SiteAdapter {
        kind: SiteKind::Perplexity,
        anchor_selectors: &["form .rounded-3xl", "div.bg-raised .grow.block"],
        input_selectors: &["textarea#ask-input", "#ask-input[contenteditable=\"true\"]"],
        placement: Placement::AfterAnchor,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::InputAdapter;
    use page_dom::{Document, SelectorList};

    #[test]
    fn test_every_supported_site_has_one_record() {
        for kind in SiteKind::SUPPORTED {
            let count = SITE_ADAPTERS.iter().filter(|a| a.kind == kind).count();
            assert_eq!(count, 1, "{}", kind);
        }
    }

    #[test]
    fn test_all_selectors_parse() {
        for adapter in SITE_ADAPTERS {
            let placement = match adapter.placement {
                Placement::BeforeChild(s) | Placement::BeforeSibling(s) => vec![s],
                _ => vec![],
            };
            for selector in adapter
                .anchor_selectors
                .iter()
                .chain(adapter.input_selectors)
                .chain(placement.iter())
            {
                assert!(
                    SelectorList::parse(selector).is_ok(),
                    "{}: {}",
                    adapter.kind,
                    selector
                );
            }
        }
    }

    #[test]
    fn test_anchor_chains_do_not_cross_match() {
        // Each site's primary composer must not be claimed by another site's anchor chain
        let pages: Vec<(SiteKind, Document)> = SITE_ADAPTERS
            .iter()
            .map(|adapter| {
                let doc = Document::new();
                let html_root = doc.build("main").append_to(doc.body()).unwrap();
                build_for(&doc, html_root, adapter.kind);
                (adapter.kind, doc)
            })
            .collect();

        for adapter in SITE_ADAPTERS {
            for (kind, doc) in &pages {
                let found = adapter.locate_anchor(doc);
                if *kind == adapter.kind {
                    assert!(found.is_some(), "{} misses its own composer", kind);
                } else {
                    assert!(found.is_none(), "{} claims the {} composer", adapter.kind, kind);
                }
            }
        }
    }

    fn build_for(doc: &Document, root: page_dom::NodeId, kind: SiteKind) {
        match kind {
            SiteKind::Chatgpt => {
                doc.build("div").id("composer-background").append_to(root).unwrap();
            }
            SiteKind::Grok => {
                let form = doc.build("form").append_to(root).unwrap();
                doc.build("div").class("query-bar").append_to(form).unwrap();
            }
            SiteKind::XGrok => {
                doc.build("div")
                    .attr("data-testid", "grokComposer")
                    .append_to(root)
                    .unwrap();
            }
            SiteKind::Gemini => {
                doc.build("input-area-v2").append_to(root).unwrap();
            }
            SiteKind::Deepseek => {
                doc.build("div").class("ds-textarea").append_to(root).unwrap();
            }
            SiteKind::T3Chat => {
                doc.build("form").id("chat-input-form").append_to(root).unwrap();
            }
            SiteKind::Claude => {
                let fieldset = doc.build("fieldset").append_to(root).unwrap();
                doc.build("div")
                    .class("flex")
                    .class("flex-col")
                    .append_to(fieldset)
                    .unwrap();
            }
            SiteKind::Mistral => {
                let form = doc.build("form").append_to(root).unwrap();
                doc.build("div")
                    .class("relative")
                    .class("flex")
                    .class("w-full")
                    .append_to(form)
                    .unwrap();
            }
            SiteKind::AiStudio => {
                doc.build("ms-prompt-input-wrapper").append_to(root).unwrap();
            }
            SiteKind::Copilot => {
                doc.build("div")
                    .attr("data-testid", "composer-content")
                    .append_to(root)
                    .unwrap();
            }
            SiteKind::Perplexity => {
                let form = doc.build("form").append_to(root).unwrap();
                doc.build("div").class("rounded-3xl").append_to(form).unwrap();
            }
            SiteKind::Unknown => {}
        }
    }
}
