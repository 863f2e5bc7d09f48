// Author: Dustin Pilgrim
// License: MIT

use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing::debug;

use super::strict_extend;
use crate::handler::{Handlers, Registry};
use crate::KyoError;

/// Builds a plugin. Handlers are not thread-safe, so the registry stores
/// factories and every compile gets fresh instances.
pub type PluginFactory = fn() -> Plugin;

static REGISTRY: Lazy<Mutex<Vec<PluginFactory>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A named bundle of directives and mappers.
#[derive(Debug, Clone, Default)]
pub struct Plugin {
    pub name: String,
    pub handlers: Handlers,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Handlers::default(),
        }
    }
}

impl Registry for Plugin {
    fn handlers_mut(&mut self) -> &mut Handlers {
        &mut self.handlers
    }
}

/// Make a plugin available to every compile that uses [`Plugins::Auto`].
pub fn register_plugin(factory: PluginFactory) {
    let mut registry = REGISTRY.lock().unwrap_or_else(|e| e.into_inner());
    registry.push(factory);
}

/// Fresh instances of every registered plugin, in registration order.
pub fn registered_plugins() -> Vec<Plugin> {
    let registry = REGISTRY.lock().unwrap_or_else(|e| e.into_inner());
    registry.iter().map(|factory| factory()).collect()
}

#[derive(Debug, Clone, Default)]
pub enum Plugins {
    /// Every plugin in the process-wide registry.
    #[default]
    Auto,
    Disabled,
    Explicit(Vec<Plugin>),
}

impl Plugins {
    /// Merge the selected plugins into one handler set. Names must be unique
    /// across plugins.
    pub(crate) fn resolve(self) -> Result<Handlers, KyoError> {
        let plugins = match self {
            Plugins::Disabled => return Ok(Handlers::default()),
            Plugins::Auto => registered_plugins(),
            Plugins::Explicit(list) => list,
        };

        let mut composite = Handlers::default();
        for plugin in plugins {
            debug!(
                plugin = %plugin.name,
                directives = plugin.handlers.directives.len(),
                mappers = plugin.handlers.mappers.len(),
                "loading plugin"
            );
            strict_extend(&mut composite.directives, plugin.handlers.directives)?;
            strict_extend(&mut composite.mappers, plugin.handlers.mappers)?;
        }

        Ok(composite)
    }
}
