//! Ordered work queue with named stages.
//!
//! The compiler queues deferred jobs while it normalizes the tree, then drains
//! them stage by stage. Draining is driven by the caller through [`Scheduler::next`]
//! so the same queue serves both the blocking and the awaiting drain loops.

use std::fmt;

/// Pass a task belongs to. `Any` tasks run in every drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Interpolation,
    Directives,
    Any,
}

impl Stage {
    fn matches(self, drain: Stage) -> bool {
        self == Stage::Any || drain == Stage::Any || self == drain
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Interpolation => write!(f, "interpolation"),
            Stage::Directives => write!(f, "directives"),
            Stage::Any => write!(f, "*"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Task<T> {
    pub stage: Stage,
    pub persistent: bool,
    /// `None` once a one-shot task has been handed out.
    payload: Option<T>,
}

impl<T> Task<T> {
    pub fn is_taken(&self) -> bool {
        self.payload.is_none()
    }
}

#[derive(Debug)]
pub struct Scheduler<T> {
    tasks: Vec<Task<T>>,
    /// Taken tasks still occupying a slot in `tasks`.
    taken: usize,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            taken: 0,
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task that runs once.
    pub fn queue(&mut self, stage: Stage, payload: T) {
        self.push(stage, false, payload);
    }

    /// Queue a task that stays queued and runs in every matching drain.
    pub fn queue_persistent(&mut self, stage: Stage, payload: T) {
        self.push(stage, true, payload);
    }

    fn push(&mut self, stage: Stage, persistent: bool, payload: T) {
        self.tasks.push(Task {
            stage,
            persistent,
            payload: Some(payload),
        });
    }

    /// Next task of `stage` at or after `cursor`, in FIFO order.
    ///
    /// Every task handed out moves the cursor past it. One-shot tasks leave an
    /// empty slot behind, and the slots are compacted once a drain reaches the
    /// end of the queue. Persistent tasks are cloned, so each runs once per
    /// drain. Start every drain with a cursor of 0.
    pub fn next(&mut self, stage: Stage, cursor: &mut usize) -> Option<T> {
        while let Some(task) = self.tasks.get_mut(*cursor) {
            *cursor += 1;
            if task.is_taken() || !task.stage.matches(stage) {
                continue;
            }
            if task.persistent {
                return task.payload.clone();
            }
            self.taken += 1;
            return task.payload.take();
        }

        self.compact(cursor);
        None
    }

    fn compact(&mut self, cursor: &mut usize) {
        if self.taken > 0 {
            self.tasks.retain(|task| !task.is_taken());
            self.taken = 0;
            *cursor = self.tasks.len();
        }
    }

    /// Number of queued tasks a drain of `stage` would run.
    pub fn pending(&self, stage: Stage) -> usize {
        self.live().filter(|t| t.stage.matches(stage)).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len() - self.taken
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live(&self) -> impl Iterator<Item = &Task<T>> {
        self.tasks.iter().filter(|t| !t.is_taken())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler<&'static str>, stage: Stage) -> Vec<&'static str> {
        let mut cursor = 0;
        let mut ran = Vec::new();
        while let Some(task) = scheduler.next(stage, &mut cursor) {
            ran.push(task);
        }
        ran
    }

    #[test]
    fn test_drains_in_fifo_order_per_stage() {
        let mut scheduler = Scheduler::new();
        scheduler.queue(Stage::Directives, "d1");
        scheduler.queue(Stage::Interpolation, "i1");
        scheduler.queue(Stage::Directives, "d2");

        assert_eq!(scheduler.pending(Stage::Directives), 2);
        assert_eq!(drain(&mut scheduler, Stage::Directives), vec!["d1", "d2"]);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(drain(&mut scheduler, Stage::Interpolation), vec!["i1"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_wildcard_tasks_run_in_any_drain() {
        let mut scheduler = Scheduler::new();
        scheduler.queue(Stage::Any, "any");
        scheduler.queue(Stage::Directives, "d");

        assert_eq!(drain(&mut scheduler, Stage::Interpolation), vec!["any"]);
        assert_eq!(drain(&mut scheduler, Stage::Directives), vec!["d"]);
    }

    #[test]
    fn test_persistent_tasks_run_once_per_drain() {
        let mut scheduler = Scheduler::new();
        scheduler.queue_persistent(Stage::Interpolation, "always");
        scheduler.queue(Stage::Interpolation, "once");

        assert_eq!(drain(&mut scheduler, Stage::Interpolation), vec!["always", "once"]);
        assert_eq!(drain(&mut scheduler, Stage::Interpolation), vec!["always"]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_tasks_queued_while_draining_are_seen() {
        let mut scheduler = Scheduler::new();
        scheduler.queue(Stage::Directives, "first");

        let mut cursor = 0;
        let mut ran = Vec::new();
        while let Some(task) = scheduler.next(Stage::Directives, &mut cursor) {
            if task == "first" {
                scheduler.queue(Stage::Directives, "spawned");
                scheduler.queue(Stage::Interpolation, "later");
            }
            ran.push(task);
        }

        assert_eq!(ran, vec!["first", "spawned"]);
        assert_eq!(scheduler.pending(Stage::Interpolation), 1);
    }

    #[test]
    fn test_drained_slots_are_compacted() {
        let mut scheduler = Scheduler::new();
        for i in 0..1000 {
            let stage = if i % 2 == 0 { Stage::Interpolation } else { Stage::Directives };
            scheduler.queue(stage, if i % 2 == 0 { "i" } else { "d" });
        }
        scheduler.queue_persistent(Stage::Interpolation, "sweep");

        let ran = drain(&mut scheduler, Stage::Interpolation);
        assert_eq!(ran.len(), 501);
        assert_eq!(ran.last(), Some(&"sweep"));
        assert_eq!(scheduler.len(), 501);
        assert_eq!(scheduler.tasks.len(), 501);
        assert_eq!(scheduler.pending(Stage::Directives), 500);
        assert_eq!(scheduler.pending(Stage::Interpolation), 1);

        assert_eq!(drain(&mut scheduler, Stage::Directives).len(), 500);
        assert_eq!(scheduler.tasks.len(), 1);
    }

    #[test]
    fn test_abandoned_drain_keeps_remaining_tasks() {
        let mut scheduler = Scheduler::new();
        scheduler.queue(Stage::Directives, "a");
        scheduler.queue(Stage::Directives, "b");

        let mut cursor = 0;
        assert_eq!(scheduler.next(Stage::Directives, &mut cursor), Some("a"));
        assert_eq!(scheduler.len(), 1);

        assert_eq!(drain(&mut scheduler, Stage::Directives), vec!["b"]);
        assert!(scheduler.is_empty());
    }
}
