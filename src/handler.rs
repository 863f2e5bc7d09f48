//! Host-provided transformations: directives act on a node, mappers map a value.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use indexmap::IndexMap;

use crate::pathref::NodeHandle;
use crate::value::Value;
use crate::KyoError;

/// Deferred handler work. Compiles run on one thread, so these are `!Send`.
pub type PendingFuture<T> = LocalBoxFuture<'static, Result<T, KyoError>>;

/// Result of applying a directive.
pub enum Outcome {
    Ready,
    Pending(PendingFuture<()>),
}

/// Result of running a mapper.
pub enum Mapped {
    Ready(Value),
    Pending(PendingFuture<Value>),
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready => write!(f, "Ready"),
            Outcome::Pending(_) => write!(f, "Pending(..)"),
        }
    }
}

impl fmt::Debug for Mapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapped::Ready(v) => f.debug_tuple("Ready").field(v).finish(),
            Mapped::Pending(_) => write!(f, "Pending(..)"),
        }
    }
}

/// Mutates the node it is applied to through its [`NodeHandle`].
pub trait DirectiveHandler {
    fn apply(&self, node: &NodeHandle, args: &[Value]) -> Result<Outcome, KyoError>;
}

/// Maps the current value of a node to a new one.
pub trait MapperHandler {
    fn map(&self, value: Value, args: &[Value]) -> Result<Mapped, KyoError>;
}

impl<F> DirectiveHandler for F
where
    F: Fn(&NodeHandle, &[Value]) -> Result<Outcome, KyoError>,
{
    fn apply(&self, node: &NodeHandle, args: &[Value]) -> Result<Outcome, KyoError> {
        self(node, args)
    }
}

impl<F> MapperHandler for F
where
    F: Fn(Value, &[Value]) -> Result<Mapped, KyoError>,
{
    fn map(&self, value: Value, args: &[Value]) -> Result<Mapped, KyoError> {
        self(value, args)
    }
}

/// A mapper installed in the directive namespace: the mapped value replaces the node.
pub struct MapperDirective {
    mapper: Rc<dyn MapperHandler>,
}

impl MapperDirective {
    pub fn new(mapper: Rc<dyn MapperHandler>) -> Self {
        Self { mapper }
    }
}

impl DirectiveHandler for MapperDirective {
    fn apply(&self, node: &NodeHandle, args: &[Value]) -> Result<Outcome, KyoError> {
        match self.mapper.map(node.value(), args)? {
            Mapped::Ready(value) => {
                node.set(value)?;
                Ok(Outcome::Ready)
            }
            Mapped::Pending(future) => {
                let node = node.clone();
                Ok(Outcome::Pending(
                    async move {
                        let value = future.await?;
                        node.set(value)
                    }
                    .boxed_local(),
                ))
            }
        }
    }
}

/// Directive and mapper tables, in registration order.
#[derive(Default, Clone)]
pub struct Handlers {
    pub directives: IndexMap<String, Rc<dyn DirectiveHandler>>,
    pub mappers: IndexMap<String, Rc<dyn MapperHandler>>,
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("directives", &self.directives.keys().collect::<Vec<_>>())
            .field("mappers", &self.mappers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Handlers {
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty() && self.mappers.is_empty()
    }
}

/// Builder methods for anything that collects handlers.
///
/// Registering a name twice replaces the earlier handler. Conflicts between
/// sources (host, plugins) are checked when the compiler is prepared.
pub trait Registry: Sized {
    fn handlers_mut(&mut self) -> &mut Handlers;

    /// A synchronous directive.
    #[must_use]
    fn directive<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&NodeHandle, &[Value]) -> Result<(), KyoError> + 'static,
    {
        self.directive_handler(name, move |node: &NodeHandle, args: &[Value]| -> Result<Outcome, KyoError> {
            f(node, args).map(|()| Outcome::Ready)
        })
    }

    /// A directive that finishes asynchronously. It receives owned copies of
    /// its node handle and arguments.
    #[must_use]
    fn directive_async<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(NodeHandle, Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<(), KyoError>> + 'static,
    {
        self.directive_handler(name, move |node: &NodeHandle, args: &[Value]| -> Result<Outcome, KyoError> {
            Ok(Outcome::Pending(f(node.clone(), args.to_vec()).boxed_local()))
        })
    }

    #[must_use]
    fn directive_handler(mut self, name: impl Into<String>, handler: impl DirectiveHandler + 'static) -> Self {
        self.handlers_mut().directives.insert(name.into(), Rc::new(handler));
        self
    }

    /// A synchronous mapper.
    #[must_use]
    fn mapper<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, &[Value]) -> Result<Value, KyoError> + 'static,
    {
        self.mapper_handler(name, move |value: Value, args: &[Value]| -> Result<Mapped, KyoError> {
            f(value, args).map(Mapped::Ready)
        })
    }

    #[must_use]
    fn mapper_async<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<Value, KyoError>> + 'static,
    {
        self.mapper_handler(name, move |value: Value, args: &[Value]| -> Result<Mapped, KyoError> {
            Ok(Mapped::Pending(f(value, args.to_vec()).boxed_local()))
        })
    }

    #[must_use]
    fn mapper_handler(mut self, name: impl Into<String>, handler: impl MapperHandler + 'static) -> Self {
        self.handlers_mut().mappers.insert(name.into(), Rc::new(handler));
        self
    }
}

impl Registry for Handlers {
    fn handlers_mut(&mut self) -> &mut Handlers {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathref::PathRef;

    #[test]
    fn test_builder_registers_in_order() {
        let handlers = Handlers::default()
            .directive("b", |_, _| Ok(()))
            .mapper("a", |v, _| Ok(v))
            .directive("a_dir", |_, _| Ok(()));

        let names: Vec<&String> = handlers.directives.keys().collect();
        assert_eq!(names, vec!["b", "a_dir"]);
        assert!(handlers.mappers.contains_key("a"));
        assert_eq!(
            format!("{:?}", handlers),
            r#"Handlers { directives: ["b", "a_dir"], mappers: ["a"] }"#
        );
    }

    #[test]
    fn test_mapper_directive_sets_mapped_value() {
        let doc = PathRef::document();
        let target = doc.child("n").unwrap();
        target.set(Value::from(4)).unwrap();

        let double: Rc<dyn MapperHandler> = Rc::new(|v: Value, _: &[Value]| -> Result<Mapped, KyoError> {
            Ok(Mapped::Ready(Value::from(v.as_f64().unwrap_or_default() * 2.0)))
        });
        let outcome = MapperDirective::new(double).apply(&target.handle(), &[]).unwrap();

        assert!(matches!(outcome, Outcome::Ready));
        assert_eq!(target.get(), Some(Value::from(8)));
    }

    #[test]
    fn test_async_mapper_sets_after_await() {
        let doc = PathRef::document();
        let target = doc.child("n").unwrap();

        let handlers = Handlers::default().mapper_async("later", |_, args| async move {
            Ok::<_, KyoError>(args.first().cloned().unwrap_or_default())
        });
        let mapper = Rc::clone(&handlers.mappers["later"]);

        let outcome = MapperDirective::new(mapper)
            .apply(&target.handle(), &[Value::from("done")])
            .unwrap();
        assert_eq!(target.get(), None);

        match outcome {
            Outcome::Pending(future) => futures::executor::block_on(future).unwrap(),
            Outcome::Ready => panic!("Expected a pending outcome"),
        }
        assert_eq!(target.get(), Some(Value::from("done")));
    }
}
