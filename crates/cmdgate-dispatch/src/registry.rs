//! Command registry lookup.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::command::Command;

/// Resolves inbound command names to registered commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandLookup: Send + Sync {
    /// Returns the command registered under `name`, if any.
    fn resolve(&self, name: &str) -> Option<Arc<dyn Command>>;
}

/// Registry mapping command names to commands.
///
/// Populated once at startup and read by the dispatcher for every interaction.
#[derive(Default)]
pub struct CommandRegistry {
    commands: DashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command under its name, returning the command it replaced.
    pub fn register(&self, command: Arc<dyn Command>) -> Option<Arc<dyn Command>> {
        let name = command.name().to_string();
        let previous = self.commands.insert(name.clone(), command);
        if previous.is_some() {
            warn!(command = %name, "Replaced an already registered command");
        } else {
            debug!(command = %name, "Registered command");
        }
        previous
    }

    /// Removes a command.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.remove(name).map(|(_, command)| command)
    }

    /// Check if a command is registered
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}

impl CommandLookup for CommandRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}
