//! Reporting sink for pruning passes
//!
//! The pruner calls these synchronously and ignores their outcome, so
//! implementations must not panic.

use crate::source::SourceId;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{error, info, warn};

pub trait PatchProgress {
    fn warning(&self, source: &SourceId, message: &str);

    fn error(&self, source: &SourceId, message: &str);

    /// A fatal condition, reported right before it is returned to the caller.
    fn exception(&self, message: &str, error: &(dyn Error + 'static));

    fn ksp_version_unsatisfied_root(&self, source: &SourceId);

    fn ksp_version_unsatisfied_node(&self, source: &SourceId, path: &str);

    fn ksp_version_unsatisfied_value(&self, source: &SourceId, path: &str);
}

/// Running totals, safe to share across threads pruning separate trees.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    warnings: AtomicUsize,
    errors: AtomicUsize,
    exceptions: AtomicUsize,
    unsatisfied_roots: AtomicUsize,
    unsatisfied_nodes: AtomicUsize,
    unsatisfied_values: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    pub warnings: usize,
    pub errors: usize,
    pub exceptions: usize,
    pub unsatisfied_roots: usize,
    pub unsatisfied_nodes: usize,
    pub unsatisfied_values: usize,
}

impl CounterSnapshot {
    pub fn total_unsatisfied(&self) -> usize {
        self.unsatisfied_roots + self.unsatisfied_nodes + self.unsatisfied_values
    }
}

impl ProgressCounter {
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            warnings: self.warnings.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            exceptions: self.exceptions.load(Ordering::Relaxed),
            unsatisfied_roots: self.unsatisfied_roots.load(Ordering::Relaxed),
            unsatisfied_nodes: self.unsatisfied_nodes.load(Ordering::Relaxed),
            unsatisfied_values: self.unsatisfied_values.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Sink that forwards every report to `tracing` and keeps totals.
#[derive(Debug, Default)]
pub struct LoggingProgress {
    counter: ProgressCounter,
}

impl LoggingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self) -> &ProgressCounter {
        &self.counter
    }
}

impl PatchProgress for LoggingProgress {
    fn warning(&self, source: &SourceId, message: &str) {
        ProgressCounter::bump(&self.counter.warnings);
        warn!(source = %source, "{}", message);
    }

    fn error(&self, source: &SourceId, message: &str) {
        ProgressCounter::bump(&self.counter.errors);
        error!(source = %source, "{}", message);
    }

    fn exception(&self, message: &str, err: &(dyn Error + 'static)) {
        ProgressCounter::bump(&self.counter.exceptions);
        error!(error = %err, "{}", message);
    }

    fn ksp_version_unsatisfied_root(&self, source: &SourceId) {
        ProgressCounter::bump(&self.counter.unsatisfied_roots);
        info!(source = %source, "deleting root node: :KSP_VERSION not satisfied");
    }

    fn ksp_version_unsatisfied_node(&self, source: &SourceId, path: &str) {
        ProgressCounter::bump(&self.counter.unsatisfied_nodes);
        info!(source = %source, path, "deleting node: :KSP_VERSION not satisfied");
    }

    fn ksp_version_unsatisfied_value(&self, source: &SourceId, path: &str) {
        ProgressCounter::bump(&self.counter.unsatisfied_values);
        info!(source = %source, path, "deleting value: :KSP_VERSION not satisfied");
    }
}

/// One report, as captured by [`RecordingProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Warning { source: String, message: String },
    Error { source: String, message: String },
    Exception { message: String, error: String },
    UnsatisfiedRoot { source: String },
    UnsatisfiedNode { source: String, path: String },
    UnsatisfiedValue { source: String, path: String },
}

/// Sink that keeps every report in order.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.lock().clone()
    }

    /// Drain recorded events, leaving the recorder empty.
    pub fn take(&self) -> Vec<ProgressEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn unsatisfied_paths(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::UnsatisfiedNode { path, .. }
                | ProgressEvent::UnsatisfiedValue { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ProgressEvent>> {
        // A poisoned recorder still holds every event pushed before the panic.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, event: ProgressEvent) {
        self.lock().push(event);
    }
}

impl PatchProgress for RecordingProgress {
    fn warning(&self, source: &SourceId, message: &str) {
        self.record(ProgressEvent::Warning {
            source: source.to_string(),
            message: message.to_string(),
        });
    }

    fn error(&self, source: &SourceId, message: &str) {
        self.record(ProgressEvent::Error {
            source: source.to_string(),
            message: message.to_string(),
        });
    }

    fn exception(&self, message: &str, err: &(dyn Error + 'static)) {
        self.record(ProgressEvent::Exception {
            message: message.to_string(),
            error: err.to_string(),
        });
    }

    fn ksp_version_unsatisfied_root(&self, source: &SourceId) {
        self.record(ProgressEvent::UnsatisfiedRoot {
            source: source.to_string(),
        });
    }

    fn ksp_version_unsatisfied_node(&self, source: &SourceId, path: &str) {
        self.record(ProgressEvent::UnsatisfiedNode {
            source: source.to_string(),
            path: path.to_string(),
        });
    }

    fn ksp_version_unsatisfied_value(&self, source: &SourceId, path: &str) {
        self.record(ProgressEvent::UnsatisfiedValue {
            source: source.to_string(),
            path: path.to_string(),
        });
    }
}

/// Forwards every report to two sinks, first then second.
#[derive(Debug, Default)]
pub struct Tee<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: PatchProgress, B: PatchProgress> PatchProgress for Tee<A, B> {
    fn warning(&self, source: &SourceId, message: &str) {
        self.first.warning(source, message);
        self.second.warning(source, message);
    }

    fn error(&self, source: &SourceId, message: &str) {
        self.first.error(source, message);
        self.second.error(source, message);
    }

    fn exception(&self, message: &str, err: &(dyn Error + 'static)) {
        self.first.exception(message, err);
        self.second.exception(message, err);
    }

    fn ksp_version_unsatisfied_root(&self, source: &SourceId) {
        self.first.ksp_version_unsatisfied_root(source);
        self.second.ksp_version_unsatisfied_root(source);
    }

    fn ksp_version_unsatisfied_node(&self, source: &SourceId, path: &str) {
        self.first.ksp_version_unsatisfied_node(source, path);
        self.second.ksp_version_unsatisfied_node(source, path);
    }

    fn ksp_version_unsatisfied_value(&self, source: &SourceId, path: &str) {
        self.first.ksp_version_unsatisfied_value(source, path);
        self.second.ksp_version_unsatisfied_value(source, path);
    }
}
