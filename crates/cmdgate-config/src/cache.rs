//! The live configuration read by the dispatcher.
//!
//! Every dispatch loads the current [`Config`] once and uses that snapshot for
//! its whole run, so a swap never changes the response strings or defer budget
//! of an interaction already in flight. Swaps are validated first: a rejected
//! configuration leaves the running one in place.

use crate::schema::{Config, ResponsesConfig};
use crate::validator::ConfigValidator;
use arc_swap::ArcSwap;
use cmdgate_common::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared handle to the configuration the dispatcher reads.
pub struct ConfigCache {
    config: ArcSwap<Config>,
}

impl ConfigCache {
    /// Creates a cache holding `config`.
    pub fn new(config: Config) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Snapshot of the current configuration.
    pub fn get(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// Replaces the configuration for subsequent dispatches.
    ///
    /// Only the sections the dispatcher reads are validated, so a cache built
    /// for tests or tooling does not need Discord credentials.
    pub fn update(&self, config: Config) -> Result<()> {
        if let Err(e) = ConfigValidator::validate_dispatch(&config) {
            warn!(error = %e, "Rejected configuration update");
            return Err(e);
        }
        self.config.store(Arc::new(config));
        info!("Configuration updated");
        Ok(())
    }

    /// Swaps only the response templates, keeping every other setting.
    ///
    /// Meant for layers such as localization that own the user-facing strings
    /// but not the rest of the configuration.
    pub fn update_responses(&self, responses: ResponsesConfig) -> Result<()> {
        let mut candidate = Config::clone(&self.get());
        candidate.responses = responses.clone();
        if let Err(e) = ConfigValidator::validate_dispatch(&candidate) {
            warn!(error = %e, "Rejected response template update");
            return Err(e);
        }

        self.config.rcu(|current| {
            let mut next = Config::clone(current);
            next.responses = responses.clone();
            next
        });
        info!("Response templates updated");
        Ok(())
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("config", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_applies_to_next_snapshot() {
        let cache = ConfigCache::default();
        let before = cache.get();

        let mut next = Config::default();
        next.dispatch.auto_defer_budget_ms = 1_000;
        cache.update(next).unwrap();

        assert_eq!(before.dispatch.auto_defer_budget_ms, 2_500);
        assert_eq!(cache.get().dispatch.auto_defer_budget_ms, 1_000);
    }

    #[test]
    fn test_invalid_update_keeps_current_config() {
        let cache = ConfigCache::default();

        let mut next = Config::default();
        next.dispatch.auto_defer_budget_ms = 10_000;
        assert!(cache.update(next).is_err());

        assert_eq!(*cache.get(), Config::default());
    }

    #[test]
    fn test_update_responses_keeps_dispatch_settings() {
        let mut initial = Config::default();
        initial.dispatch.unknown_command_message = true;
        let cache = ConfigCache::new(initial);

        let mut responses = ResponsesConfig::default();
        responses.not_found = "Commande inconnue.".to_string();
        cache.update_responses(responses).unwrap();

        let current = cache.get();
        assert!(current.dispatch.unknown_command_message);
        assert_eq!(current.responses.not_found, "Commande inconnue.");

        let mut blank = ResponsesConfig::default();
        blank.cooldown = String::new();
        assert!(cache.update_responses(blank).is_err());
        assert_eq!(cache.get().responses.not_found, "Commande inconnue.");
    }
}
