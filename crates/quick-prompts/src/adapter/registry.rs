//! Adapter registry keyed by site
//!
//! Every supported site gets its built-in record at construction time.
//! Hosts may override a site with their own adapter via `register`; any
//! site without an entry resolves to the no-op adapter.

use std::collections::HashMap;
use std::sync::Arc;

use super::{InputAdapter, NoopAdapter, SITE_ADAPTERS};
use crate::site::SiteKind;

pub struct AdapterRegistry {
    adapters: HashMap<SiteKind, Arc<dyn InputAdapter>>,
    fallback: Arc<dyn InputAdapter>,
}

impl AdapterRegistry {
    /// Create a registry with every built-in site adapter registered
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for record in SITE_ADAPTERS {
            registry.register(Arc::new(*record));
        }
        registry
    }

    /// A registry that resolves everything to the no-op adapter
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
            fallback: Arc::new(NoopAdapter),
        }
    }

    /// Register an adapter for the site it reports, replacing any previous one
    pub fn register(&mut self, adapter: Arc<dyn InputAdapter>) {
        let site = adapter.site();
        if self.adapters.insert(site, adapter).is_some() {
            log::debug!("Replaced adapter for {}", site);
        }
    }

    /// Adapter for `kind`; unknown or unregistered sites get the no-op adapter
    pub fn get(&self, kind: SiteKind) -> Arc<dyn InputAdapter> {
        self.adapters
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Sites with a registered adapter, sorted
    pub fn supported_sites(&self) -> Vec<SiteKind> {
        let mut sites: Vec<SiteKind> = self.adapters.keys().copied().collect();
        sites.sort();
        sites
    }

    pub fn is_supported(&self, kind: SiteKind) -> bool {
        self.adapters.contains_key(&kind)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
