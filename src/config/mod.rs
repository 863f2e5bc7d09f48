// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::handler::{DirectiveHandler, Handlers, MapperDirective, Registry};
use crate::KyoError;

mod plugins;

pub use plugins::{register_plugin, registered_plugins, Plugin, PluginFactory, Plugins};

/// What a compile is allowed to do, and the handlers it can call.
///
/// # Examples
/// ```
/// use kyoml::{CompileOptions, Registry, Value};
///
/// let options = CompileOptions::new()
///     .asynchronous(false)
///     .mapper("double", |v, _| Ok(Value::from(v.as_f64().unwrap_or_default() * 2.0)));
///
/// let doc = kyoml::compile("a = 4 |> @double", options).unwrap();
/// assert_eq!(doc.get_as::<f64>("a").unwrap(), 8.0);
/// ```
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Resolve `${path}` tokens in double-quoted strings. Default `true`.
    pub interpolate: bool,
    /// Async mode, switched on by [`crate::compile_async`]. Pending handler
    /// results are only awaited by the async entry points; blocking compiles
    /// reject them either way. Default `false`.
    pub asynchronous: bool,
    pub handlers: Handlers,
    /// Where plugin handlers come from. Default [`Plugins::Auto`].
    pub plugins: Plugins,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            interpolate: true,
            asynchronous: false,
            handlers: Handlers::default(),
            plugins: Plugins::Auto,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn interpolate(mut self, enabled: bool) -> Self {
        self.interpolate = enabled;
        self
    }

    #[must_use]
    pub fn asynchronous(mut self, enabled: bool) -> Self {
        self.asynchronous = enabled;
        self
    }

    #[must_use]
    pub fn plugins(mut self, plugins: Plugins) -> Self {
        self.plugins = plugins;
        self
    }

    /// Add one plugin, switching to an explicit plugin list.
    #[must_use]
    pub fn plugin(mut self, plugin: Plugin) -> Self {
        match &mut self.plugins {
            Plugins::Explicit(list) => list.push(plugin),
            _ => self.plugins = Plugins::Explicit(vec![plugin]),
        }
        self
    }
}

impl Registry for CompileOptions {
    fn handlers_mut(&mut self) -> &mut Handlers {
        &mut self.handlers
    }
}

/// Options after preparation: one handler namespace, mappers already wrapped.
#[derive(Clone)]
pub struct CompilerConfig {
    pub interpolate: bool,
    pub asynchronous: bool,
    pub handlers: IndexMap<String, Rc<dyn DirectiveHandler>>,
}

impl fmt::Debug for CompilerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerConfig")
            .field("interpolate", &self.interpolate)
            .field("asynchronous", &self.asynchronous)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CompilerConfig {
    pub fn handler(&self, name: &str) -> Option<&Rc<dyn DirectiveHandler>> {
        self.handlers.get(name)
    }
}

/// Merge plugins, host directives and host mappers into one namespace.
///
/// # Errors
/// `DuplicateHandler` when two sources define the same directive (or the same
/// mapper), `NameConflict` when a mapper and a directive share a name.
pub fn prepare(options: CompileOptions) -> Result<CompilerConfig, KyoError> {
    let CompileOptions {
        interpolate,
        asynchronous,
        handlers,
        plugins,
    } = options;

    let composite = plugins.resolve()?;
    let Handlers {
        mut directives,
        mut mappers,
    } = handlers;

    strict_extend(&mut mappers, composite.mappers)?;
    strict_extend(&mut directives, composite.directives)?;

    for (name, mapper) in mappers {
        if directives.contains_key(&name) {
            return Err(KyoError::NameConflict { name });
        }
        directives.insert(name, Rc::new(MapperDirective::new(mapper)));
    }

    debug!(
        handlers = directives.len(),
        interpolate, asynchronous, "prepared compiler config"
    );

    Ok(CompilerConfig {
        interpolate,
        asynchronous,
        handlers: directives,
    })
}

/// Move every entry of `right` into `left`, refusing to overwrite.
fn strict_extend<T>(left: &mut IndexMap<String, T>, right: IndexMap<String, T>) -> Result<(), KyoError> {
    for (name, handler) in right {
        if left.contains_key(&name) {
            return Err(KyoError::DuplicateHandler { name });
        }
        left.insert(name, handler);
    }
    Ok(())
}

#[cfg(test)]
mod tests;
