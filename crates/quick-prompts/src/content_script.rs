//! Content script entry point
//!
//! One `ContentScript` per page. It owns the `InjectionContext` (site,
//! adapter, watcher state, live bar, debug flag) and drives it from two
//! streams: document mutations and storage changes.
//!
//! ```rust,ignore
//! let registry = AdapterRegistry::new();
//! let script = ContentScript::new(url, doc, store, &registry, QuickPromptsConfig::default());
//! tokio::spawn(script.run());
//! ```

use std::sync::Arc;

use page_dom::{Document, NodeId};

use crate::adapter::{AdapterRegistry, InputAdapter};
use crate::config::QuickPromptsConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{QuickPromptsError, Result};
use crate::insertion::InsertOutcome;
use crate::injector::ButtonBarInjector;
use crate::site::{detect_site, SiteKind};
use crate::store::{PromptStore, StorageChange, StorageKey};
use crate::watcher::{self, DomWatcher, Transition};

/// Per-page mutable state, owned by the content script
pub struct InjectionContext {
    site: SiteKind,
    adapter: Arc<dyn InputAdapter>,
    watcher: DomWatcher,
    injector: ButtonBarInjector,
    diagnostics: Diagnostics,
}

impl InjectionContext {
    pub fn new(site: SiteKind, adapter: Arc<dyn InputAdapter>, config: QuickPromptsConfig) -> Self {
        Self {
            site,
            adapter,
            watcher: DomWatcher::new(),
            injector: ButtonBarInjector::new(config),
            diagnostics: Diagnostics::default(),
        }
    }
}

pub struct ContentScript {
    doc: Document,
    store: Arc<dyn PromptStore>,
    context: InjectionContext,
}

impl ContentScript {
    /// Detect the site from `url` and pick its adapter; the site is fixed from here on
    pub fn new(
        url: &str,
        doc: Document,
        store: Arc<dyn PromptStore>,
        registry: &AdapterRegistry,
        config: QuickPromptsConfig,
    ) -> Self {
        let site = detect_site(url);
        log::info!("Quick prompts loaded on {} ({})", site, url);
        Self::with_context(doc, store, InjectionContext::new(site, registry.get(site), config))
    }

    pub fn with_context(doc: Document, store: Arc<dyn PromptStore>, context: InjectionContext) -> Self {
        Self { doc, store, context }
    }

    pub fn site(&self) -> SiteKind {
        self.context.site
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The live bar, if any
    pub fn bar(&self) -> Option<NodeId> {
        self.context.injector.bar()
    }

    /// Anchor the watcher is tracking
    pub fn tracked_anchor(&self) -> Option<NodeId> {
        self.context.watcher.current_anchor()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.context.diagnostics
    }

    /// Initial pass: clear bars left by an earlier instance, then check for a composer
    pub async fn start(&mut self) -> Result<()> {
        if let Ok(settings) = self.store.get_user_settings().await {
            self.context.diagnostics = Diagnostics::new(settings.debug_mode_enabled);
        }
        let strays = self.context.injector.remove_strays(&self.doc, None);
        if strays > 0 {
            self.context
                .diagnostics
                .log(format_args!("Removed {} bar(s) from a previous instance", strays));
        }
        self.check_anchor().await.map(|_| ())
    }

    /// Re-run anchor lookup and inject on an attach or replace
    ///
    /// The new anchor is only kept once its bar is in; a failed injection
    /// leaves the watcher as it was so the next burst tries again.
    pub async fn check_anchor(&mut self) -> Result<Transition> {
        let saved = self.context.watcher.state();
        let transition = self
            .context
            .watcher
            .check(&self.doc, self.context.adapter.as_ref());
        if let Some(anchor) = transition.anchor() {
            self.context
                .diagnostics
                .log(format_args!("Composer transition {:?}", transition));
            if let Err(err) = self.inject_at(anchor).await {
                self.context.watcher.restore(saved);
                return Err(err);
            }
        }
        Ok(transition)
    }

    /// Rebuild the bar when prompts or settings changed
    pub async fn handle_storage_change(&mut self, change: &StorageChange) -> Result<()> {
        if !change.affects_bar() {
            return Ok(());
        }
        self.context.diagnostics.log(format_args!(
            "Storage changed: {:?}",
            change.keys.iter().map(StorageKey::as_str).collect::<Vec<_>>()
        ));
        match self.refresh().await {
            Err(QuickPromptsError::AnchorNotFound(_)) => Ok(()),
            other => other,
        }
    }

    /// Rebuild the bar against the current composer, or the last live one
    pub async fn refresh(&mut self) -> Result<()> {
        let saved = self.context.watcher.state();
        self.context
            .watcher
            .check(&self.doc, self.context.adapter.as_ref());
        let anchor = self
            .context
            .watcher
            .current_anchor()
            .filter(|anchor| self.doc.is_connected(*anchor))
            .ok_or(QuickPromptsError::AnchorNotFound(self.context.site))?;
        let result = self.inject_at(anchor).await;
        if result.is_err() {
            self.context.watcher.restore(saved);
        }
        result
    }

    /// Insert `text` into the site's input widget, as a button click would
    pub fn insert_prompt(&self, text: &str) -> Result<InsertOutcome> {
        self.context
            .adapter
            .insert_prompt(&self.doc, text)
            .ok_or(QuickPromptsError::WidgetNotFound(self.context.site))
    }

    async fn inject_at(&mut self, anchor: NodeId) -> Result<()> {
        let prompts = self.store.get_prompts().await?;
        let settings = self.store.get_user_settings().await?;
        self.context.diagnostics = Diagnostics::new(settings.debug_mode_enabled);

        if prompts.is_empty() {
            let removed = self.context.injector.remove_bar(&self.doc);
            self.context
                .diagnostics
                .log(format_args!("No prompts; removed {} bar(s)", removed));
            return Ok(());
        }

        self.context.injector.inject(
            &self.doc,
            &self.context.adapter,
            anchor,
            &prompts,
            &settings,
            self.context.diagnostics,
        )?;
        Ok(())
    }

    /// Watch the page until both streams close
    ///
    /// Errors are logged and the loop carries on; nothing propagates to the host.
    pub async fn run(mut self) {
        if self.context.site == SiteKind::Unknown {
            log::debug!("No adapter for this page, staying idle");
            return;
        }

        let mut mutations = self.doc.observe();
        let mut changes = self.store.subscribe();

        if let Err(err) = self.start().await {
            log::warn!("Initial injection on {} failed: {}", self.context.site, err);
        }

        loop {
            tokio::select! {
                Some(first) = mutations.recv() => {
                    let burst = watcher::drain_burst(&mut mutations, first);
                    log::trace!("{} mutation record(s)", burst.len());
                    if let Err(err) = self.check_anchor().await {
                        log::warn!("Injection after mutation failed: {}", err);
                    }
                }
                Some(change) = changes.recv() => {
                    if let Err(err) = self.handle_storage_change(&change).await {
                        log::warn!("Injection after storage change failed: {}", err);
                    }
                }
                else => break,
            }
        }
        log::debug!("Content script on {} stopped", self.context.site);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryPromptStore, Prompt};

    fn script(doc: &Document, store: Arc<MemoryPromptStore>) -> ContentScript {
        ContentScript::new(
            "https://chatgpt.com/c/abc",
            doc.clone(),
            store,
            &AdapterRegistry::new(),
            QuickPromptsConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_start_injects_when_composer_present() {
        let doc = Document::new();
        let anchor = doc
            .build("div")
            .id("composer-background")
            .append_to(doc.body())
            .unwrap();
        let store = Arc::new(MemoryPromptStore::with_prompts(vec![Prompt::new("A", "a")]));
        let mut script = script(&doc, store);

        script.start().await.unwrap();

        assert_eq!(script.site(), SiteKind::Chatgpt);
        assert_eq!(script.tracked_anchor(), Some(anchor));
        assert_eq!(doc.next_sibling(anchor), script.bar());
    }

    #[tokio::test]
    async fn test_store_failure_keeps_previous_bar() {
        let doc = Document::new();
        let anchor = doc
            .build("div")
            .id("composer-background")
            .append_to(doc.body())
            .unwrap();
        let store = Arc::new(MemoryPromptStore::with_prompts(vec![Prompt::new("A", "a")]));
        let mut script = script(&doc, store.clone());
        script.start().await.unwrap();
        let bar = script.bar();

        store.set_unavailable(true);
        let change = StorageChange::new(vec![StorageKey::Prompts]);
        assert!(script.handle_storage_change(&change).await.is_err());

        assert_eq!(script.bar(), bar);
        assert_eq!(doc.next_sibling(anchor), bar);
    }

    #[tokio::test]
    async fn test_failed_attach_retries_on_next_mutation() {
        let doc = Document::new();
        let anchor = doc
            .build("div")
            .id("composer-background")
            .append_to(doc.body())
            .unwrap();
        let store = Arc::new(MemoryPromptStore::with_prompts(vec![Prompt::new("A", "a")]));
        let mut script = script(&doc, store.clone());

        store.set_unavailable(true);
        assert!(matches!(
            script.start().await,
            Err(QuickPromptsError::Store(_))
        ));
        assert_eq!(script.tracked_anchor(), None);
        assert_eq!(script.bar(), None);

        store.set_unavailable(false);
        doc.build("span").append_to(doc.body()).unwrap();
        assert_eq!(script.check_anchor().await.unwrap(), Transition::Attach(anchor));
        assert_eq!(doc.next_sibling(anchor), script.bar());
        assert!(script.bar().is_some());
    }

    #[tokio::test]
    async fn test_debug_flag_follows_settings() {
        let doc = Document::new();
        doc.build("div")
            .id("composer-background")
            .append_to(doc.body())
            .unwrap();
        let store = Arc::new(MemoryPromptStore::with_prompts(vec![Prompt::new("A", "a")]));
        let mut script = script(&doc, store.clone());
        script.start().await.unwrap();
        assert!(!script.diagnostics().is_verbose());

        let settings = crate::store::UserSettings {
            debug_mode_enabled: true,
            ..Default::default()
        };
        store.save_user_settings(settings).await.unwrap();
        script
            .handle_storage_change(&StorageChange::new(vec![StorageKey::UserSettings]))
            .await
            .unwrap();
        assert!(script.diagnostics().is_verbose());
    }

    #[tokio::test]
    async fn test_refresh_and_insert_without_composer() {
        let doc = Document::new();
        let store = Arc::new(MemoryPromptStore::with_prompts(vec![Prompt::new("A", "a")]));
        let mut script = script(&doc, store);

        assert!(matches!(
            script.refresh().await,
            Err(QuickPromptsError::AnchorNotFound(SiteKind::Chatgpt))
        ));
        assert!(matches!(
            script.insert_prompt("hello"),
            Err(QuickPromptsError::WidgetNotFound(SiteKind::Chatgpt))
        ));
        // Storage changes before the composer exists are not errors
        script
            .handle_storage_change(&StorageChange::new(vec![StorageKey::Prompts]))
            .await
            .unwrap();
    }
}
