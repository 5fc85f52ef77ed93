//! Task-list and scheduler errors.

use thiserror::Error;

use crate::id::TaskId;

/// Errors building a [`TaskList`](crate::TaskList).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TaskListError {
    /// A predecessor id does not name an earlier task in the list.
    #[error("task '{task}' depends on unknown task {dependency}")]
    UnknownDependency {
        /// The task being added.
        task: String,
        /// The id that was not found.
        dependency: TaskId,
    },
}

/// Errors from running a [`TaskRegion`](crate::TaskRegion).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Tasks were still incomplete after the poll horizon.
    #[error("task region stalled after {polls} polls; pending: {}", pending.join(", "))]
    Stalled {
        /// Polling rounds performed.
        polls: u64,
        /// `list:task` names of the tasks that never completed.
        pending: Vec<String>,
    },

    /// The region was run with a different number of contexts than lists.
    #[error("task region has {lists} lists but {contexts} contexts")]
    ContextMismatch {
        /// Lists in the region.
        lists: usize,
        /// Contexts supplied.
        contexts: usize,
    },
}
