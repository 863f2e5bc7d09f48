use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use super::{Placement, Session};
use crate::ast::Directive;
use crate::handler::{DirectiveHandler, Outcome};
use crate::path::PathKey;
use crate::pathref::{NodeHandle, PathRef};
use crate::value::Value;
use crate::KyoError;

/// A directive bound to its handler, with its arguments ready.
struct CompiledDirective {
    name: String,
    handler: Rc<dyn DirectiveHandler>,
    args: Vec<Value>,
}

/// Directives to apply to one node, in application order.
pub(super) struct Pipeline {
    stages: Vec<CompiledDirective>,
}

impl<'c, 't> Session<'c, 't> {
    /// Look up every handler and evaluate every argument before anything runs.
    pub(super) fn compile_directives(&mut self, target: &PathRef, directives: &[&'t Directive]) -> Result<Pipeline, KyoError> {
        let mut stages = Vec::with_capacity(directives.len());

        for &directive in directives {
            let handler = self
                .config
                .handler(&directive.key)
                .cloned()
                .ok_or_else(|| KyoError::UnknownDirective {
                    name: directive.key.clone(),
                })?;

            let args = self.normalize_arguments(target, directive)?;
            stages.push(CompiledDirective {
                name: directive.key.clone(),
                handler,
                args,
            });
        }

        Ok(Pipeline { stages })
    }

    /// Arguments are normalized into a scratch array, then any template inside
    /// them is resolved against the current document.
    fn normalize_arguments(&mut self, target: &PathRef, directive: &'t Directive) -> Result<Vec<Value>, KyoError> {
        if directive.args.is_empty() {
            return Ok(Vec::new());
        }

        let scratch = Rc::new(RefCell::new(Value::Array(Vec::with_capacity(directive.args.len()))));
        let base = format!("{}@{}", target.path(), directive.key);

        for (i, arg) in directive.args.iter().enumerate() {
            let slot = PathRef::new(Rc::clone(&scratch), Vec::new(), PathKey::Index(i), format!("{}[{}]", base, i))?;
            self.normalize(arg, &slot, Placement::Argument)?;
        }

        let args = match scratch.take() {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        args.into_iter().map(|arg| self.resolve_deep(arg)).collect()
    }
}

impl Pipeline {
    /// Run every stage in order on the calling thread.
    ///
    /// Pending outcomes are never driven here: they may depend on a runtime
    /// this thread is part of. They fail with `AsyncMisuse`.
    pub(super) fn run_blocking(&self, node: &NodeHandle) -> Result<(), KyoError> {
        for stage in &self.stages {
            trace!(directive = %stage.name, path = node.path(), "applying");
            if let Outcome::Pending(_) = stage.handler.apply(node, &stage.args)? {
                return Err(KyoError::AsyncMisuse {
                    name: stage.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Run every stage in order, awaiting each pending outcome before the next stage.
    pub(super) async fn run(&self, node: &NodeHandle) -> Result<(), KyoError> {
        for stage in &self.stages {
            trace!(directive = %stage.name, path = node.path(), "applying");
            if let Outcome::Pending(future) = stage.handler.apply(node, &stage.args)? {
                future.await?;
            }
        }
        Ok(())
    }
}
