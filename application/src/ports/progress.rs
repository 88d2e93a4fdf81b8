//! Progress notification port
//!
//! Defines the interface for reporting long-running work (connecting,
//! waiting on the model) to the user.

/// Callback for progress updates around a delegate call
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain log line, nothing).
pub trait ProgressNotifier: Send + Sync {
    /// Called when a task starts, with a short label such as "Thinking..."
    fn on_task_start(&self, label: &str);

    /// Called when the task finishes
    fn on_task_end(&self, success: bool);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_task_start(&self, _label: &str) {}
    fn on_task_end(&self, _success: bool) {}
}
