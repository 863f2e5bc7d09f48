//! Parse tree to document.
//!
//! Normalization writes every value into a shared document through [`PathRef`]s
//! and queues the work that has to wait for the whole tree: interpolation of
//! double-quoted strings and directive application. The queue is then drained
//! in three passes: interpolation, directives, interpolation.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::ast::{Directive, Entry, Node};
use crate::config::{prepare, CompileOptions, CompilerConfig};
use crate::interpolate::InterpolatedString;
use crate::parser;
use crate::pathref::PathRef;
use crate::scheduler::{Scheduler, Stage};
use crate::value::Value;
use crate::KyoError;

mod directives;

/// A prepared compiler, reusable across inputs.
///
/// Handler names are merged and checked when the compiler is built, before any
/// text is parsed.
#[derive(Debug, Clone)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Result<Self, KyoError> {
        Ok(Self {
            config: prepare(options)?,
        })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn compile(&self, text: &str) -> Result<Value, KyoError> {
        let tree = parser::parse(text)?;
        self.compile_tree(&tree)
    }

    /// Compile a tree produced by any grammar engine.
    ///
    /// Handlers that return pending results fail with `AsyncMisuse`, whatever
    /// the config says. Use [`Compiler::compile_tree_async`] for those.
    pub fn compile_tree(&self, tree: &Node) -> Result<Value, KyoError> {
        let mut session = Session::start(&self.config, tree)?;
        session.drain(Stage::Interpolation)?;
        session.drain(Stage::Directives)?;
        session.drain(Stage::Interpolation)?;
        session.finish()
    }

    /// Like [`Compiler::compile`], awaiting pending handler results in turn.
    ///
    /// The future is `!Send`; drive it on a current-thread runtime.
    pub async fn compile_async(&self, text: &str) -> Result<Value, KyoError> {
        let tree = parser::parse(text)?;
        self.compile_tree_async(&tree).await
    }

    pub async fn compile_tree_async(&self, tree: &Node) -> Result<Value, KyoError> {
        let mut session = Session::start(&self.config, tree)?;
        session.drain_async(Stage::Interpolation).await?;
        session.drain_async(Stage::Directives).await?;
        session.drain_async(Stage::Interpolation).await?;
        session.finish()
    }
}

/// Deferred work, bound to the slot it applies to.
#[derive(Debug, Clone)]
enum Job<'t> {
    Interpolate {
        target: PathRef,
        template: InterpolatedString,
    },
    Directives {
        target: PathRef,
        directives: Vec<&'t Directive>,
    },
    /// Resolves templates left anywhere in the document, such as ones set by handlers.
    Sweep,
}

/// Where a node is being normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Document,
    /// A directive argument: templates are resolved on the spot and nothing is queued.
    Argument,
}

/// State of one compile.
struct Session<'c, 't> {
    config: &'c CompilerConfig,
    document: PathRef,
    scheduler: Scheduler<Job<'t>>,
}

impl<'c, 't> Session<'c, 't> {
    /// Normalize `tree` into a fresh document.
    fn start(config: &'c CompilerConfig, tree: &'t Node) -> Result<Self, KyoError> {
        let entries = tree
            .as_entries()
            .ok_or(KyoError::InvalidNode { kind: tree.kind() })?;

        let mut session = Session {
            config,
            document: PathRef::document(),
            scheduler: Scheduler::new(),
        };

        let document = session.document.clone();
        session.normalize_block(entries, &document, Placement::Document)?;
        session.scheduler.queue_persistent(Stage::Interpolation, Job::Sweep);

        debug!(
            interpolation = session.scheduler.pending(Stage::Interpolation),
            directives = session.scheduler.pending(Stage::Directives),
            "normalized document"
        );
        Ok(session)
    }

    fn finish(self) -> Result<Value, KyoError> {
        Ok(self.document.get().unwrap_or_else(Value::object))
    }

    fn normalize(&mut self, node: &'t Node, target: &PathRef, placement: Placement) -> Result<(), KyoError> {
        match node {
            Node::Numeric(n) => target.set(Value::Number(*n)),
            Node::Boolean(b) => target.set(Value::Bool(*b)),
            Node::RawString(s) => target.set(Value::String(s.clone())),
            Node::ComplexString(s) => self.normalize_complex_string(s, target, placement),
            Node::Array(items) => {
                target.set(Value::Array(Vec::with_capacity(items.len())))?;
                for (i, item) in items.iter().enumerate() {
                    self.normalize(item, &target.index(i)?, placement)?;
                }
                Ok(())
            }
            Node::Map(entries) => {
                target.set(Value::object())?;
                for entry in entries {
                    if let Node::Directive(_) = entry.value {
                        return Err(KyoError::InvalidNode { kind: "Directive" });
                    }
                    self.normalize(&entry.value, &target.child(entry.key.as_str())?, placement)?;
                }
                Ok(())
            }
            Node::Block(entries) => self.normalize_block(entries, target, placement),
            Node::PipedValue(piped) => {
                if placement == Placement::Argument {
                    return Err(KyoError::InvalidNode { kind: "PipedValue" });
                }
                self.normalize(&piped.raw, target, placement)?;
                self.queue_directives(target, piped.directives.iter().collect());
                Ok(())
            }
            Node::Directive(_) => Err(KyoError::InvalidNode { kind: "Directive" }),
        }
    }

    /// Like a map, but directive entries are queued once every other entry is in
    /// place, so nested blocks have their directives applied first.
    fn normalize_block(&mut self, entries: &'t [Entry], target: &PathRef, placement: Placement) -> Result<(), KyoError> {
        target.set(Value::object())?;

        let mut directives = Vec::new();
        for entry in entries {
            match &entry.value {
                Node::Directive(directive) => directives.push(directive),
                value => self.normalize(value, &target.child(entry.key.as_str())?, placement)?,
            }
        }

        if !directives.is_empty() && placement == Placement::Argument {
            return Err(KyoError::InvalidNode { kind: "Directive" });
        }
        for directive in directives {
            self.queue_directives(target, vec![directive]);
        }
        Ok(())
    }

    fn normalize_complex_string(&mut self, template: &str, target: &PathRef, placement: Placement) -> Result<(), KyoError> {
        let template = InterpolatedString::new(template);
        if !self.config.interpolate || !template.has_tokens() {
            return target.set(Value::String(template.raw().to_string()));
        }

        target.set(Value::Interpolated(template.clone()))?;

        if placement == Placement::Document {
            self.scheduler.queue(
                Stage::Interpolation,
                Job::Interpolate {
                    target: target.clone(),
                    template,
                },
            );
        }
        Ok(())
    }

    fn queue_directives(&mut self, target: &PathRef, directives: Vec<&'t Directive>) {
        if directives.is_empty() {
            return;
        }
        self.scheduler.queue(
            Stage::Directives,
            Job::Directives {
                target: target.clone(),
                directives,
            },
        );
    }

    fn drain(&mut self, stage: Stage) -> Result<(), KyoError> {
        debug!(%stage, pending = self.scheduler.pending(stage), "draining");

        let mut cursor = 0;
        while let Some(job) = self.scheduler.next(stage, &mut cursor) {
            match job {
                Job::Interpolate { target, template } => self.interpolate(&target, &template)?,
                Job::Directives { target, directives } => {
                    let pipeline = self.compile_directives(&target, &directives)?;
                    pipeline.run_blocking(&target.handle())?;
                }
                Job::Sweep => self.sweep()?,
            }
        }
        Ok(())
    }

    async fn drain_async(&mut self, stage: Stage) -> Result<(), KyoError> {
        debug!(%stage, pending = self.scheduler.pending(stage), "draining");

        let mut cursor = 0;
        while let Some(job) = self.scheduler.next(stage, &mut cursor) {
            match job {
                Job::Interpolate { target, template } => self.interpolate(&target, &template)?,
                Job::Directives { target, directives } => {
                    let pipeline = self.compile_directives(&target, &directives)?;
                    pipeline.run(&target.handle()).await?;
                }
                Job::Sweep => self.sweep()?,
            }
        }
        Ok(())
    }

    fn interpolate(&self, target: &PathRef, template: &InterpolatedString) -> Result<(), KyoError> {
        trace!(path = target.path(), template = template.raw(), "interpolating");
        let text = self.resolve_template(template)?;
        target.set(Value::String(text))
    }

    fn sweep(&self) -> Result<(), KyoError> {
        let pending = self
            .document
            .with_value(|v| v.is_some_and(Value::has_pending_interpolation));
        if !pending {
            return Ok(());
        }

        trace!("resolving leftover templates");
        let current = self.document.get().unwrap_or_default();
        let resolved = self.resolve_deep(current)?;
        self.document.set(resolved)
    }

    /// Compute a template against the document as it is right now.
    fn resolve_template(&self, template: &InterpolatedString) -> Result<String, KyoError> {
        if !self.config.interpolate {
            return Ok(template.raw().to_string());
        }

        let root = self.document.root().borrow();
        match root.lookup("document") {
            Some(document) => template.compute(&[document]),
            None => template.compute(&[]),
        }
    }

    /// Replace every template inside `value`, at any depth.
    fn resolve_deep(&self, value: Value) -> Result<Value, KyoError> {
        match value {
            Value::Interpolated(template) => self.resolve_template(&template).map(Value::String),
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.resolve_deep(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| self.resolve_deep(v).map(|v| (k, v)))
                .collect::<Result<IndexMap<_, _>, _>>()
                .map(Value::Object),
            other => Ok(other),
        }
    }
}
