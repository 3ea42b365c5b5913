//! Shared, reloadable table of composition scopes.

use {
    crate::{Config, ParseContext, Result, parse_directives, rules::RoutingConfig},
    arc_swap::ArcSwap,
    std::sync::Arc,
};

/// All configured scopes in declaration order.
///
/// Cloning is cheap and every clone sees the same table. A reload swaps the
/// whole table in one atomic store, so a request either sees the old scopes
/// or the new ones, never a mix.
#[derive(Clone)]
pub struct ScopeTable {
    scopes: Arc<ArcSwap<Vec<Arc<RoutingConfig>>>>,
}

impl ScopeTable {
    pub fn new(scopes: Vec<RoutingConfig>) -> Self {
        Self {
            scopes: Arc::new(ArcSwap::from_pointee(wrap(scopes))),
        }
    }

    /// Parses directive text into a new table.
    pub fn load(source: &str, ctx: &ParseContext) -> Result<Self> {
        Ok(Self::new(parse_directives(source, ctx)?))
    }

    /// Builds the table from the directives referenced by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.load_scopes()?))
    }

    /// Replaces all scopes at once.
    pub fn reload(&self, scopes: Vec<RoutingConfig>) {
        tracing::info!(scopes = scopes.len(), "Reloaded composition scopes");
        self.scopes.store(Arc::new(wrap(scopes)));
    }

    /// Parses the directives of `config` and swaps them in. On error the
    /// current table stays in place.
    pub fn reload_from_config(&self, config: &Config) -> Result<()> {
        let scopes = config.load_scopes().inspect_err(|e| {
            tracing::error!(error = %e, "Keeping previous composition scopes");
        })?;
        self.reload(scopes);
        Ok(())
    }

    /// Current table. Later reloads do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<Vec<Arc<RoutingConfig>>> {
        self.scopes.load_full()
    }

    /// First scope in declaration order that claims `path`.
    pub fn find(&self, path: &str) -> Option<Arc<RoutingConfig>> {
        self.scopes
            .load()
            .iter()
            .find(|scope| scope.matches(path))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.scopes.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.load().is_empty()
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl std::fmt::Debug for ScopeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeTable")
            .field("scopes", &self.len())
            .finish()
    }
}

fn wrap(scopes: Vec<RoutingConfig>) -> Vec<Arc<RoutingConfig>> {
    scopes.into_iter().map(Arc::new).collect()
}
