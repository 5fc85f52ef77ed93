//! Per-patch task lists.
//!
//! A [`TaskList`] is an acyclic dependency graph of operations over one
//! context value (a patch and its containers). The graph is acyclic by
//! construction: a task may only depend on tasks added before it.

use tracing::{debug, trace};

use crate::error::TaskListError;
use crate::id::{TaskId, TaskIdSet};

/// Outcome of one attempt at a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Done; dependents may run.
    Complete,
    /// Not yet satisfied (typically a pending receive); poll again later.
    Incomplete,
}

/// A boxed task operation over context `C`.
pub type TaskFn<C> = Box<dyn FnMut(&mut C) -> TaskStatus + Send>;

struct Task<C> {
    name: String,
    deps: TaskIdSet,
    op: TaskFn<C>,
    done: bool,
    attempts: u32,
}

/// What one [`TaskList::do_available`] pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Operations invoked.
    pub ran: u32,
    /// Of those, how many completed.
    pub completed: u32,
    /// Of those, how many returned [`TaskStatus::Incomplete`].
    pub incomplete: u32,
}

impl PollReport {
    /// Sum of two reports.
    pub fn merge(self, other: PollReport) -> PollReport {
        PollReport {
            ran: self.ran + other.ran,
            completed: self.completed + other.completed,
            incomplete: self.incomplete + other.incomplete,
        }
    }
}

/// An acyclic graph of tasks over a context `C`.
pub struct TaskList<C> {
    label: String,
    tasks: Vec<Task<C>>,
    completed: Vec<TaskId>,
}

impl<C> TaskList<C> {
    /// Empty list. `label` prefixes task names in logs and stall reports.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tasks: Vec::new(),
            completed: Vec::new(),
        }
    }

    /// Add a task that runs `op` once every task in `deps` is complete.
    ///
    /// # Errors
    ///
    /// [`TaskListError::UnknownDependency`] if any id in `deps` is not an
    /// earlier task of this list.
    pub fn add_task<F>(
        &mut self,
        name: impl Into<String>,
        deps: impl Into<TaskIdSet>,
        op: F,
    ) -> Result<TaskId, TaskListError>
    where
        F: FnMut(&mut C) -> TaskStatus + Send + 'static,
    {
        let name = name.into();
        let deps = deps.into();
        if let Some(bad) = deps.iter().find(|d| d.0 as usize >= self.tasks.len()) {
            return Err(TaskListError::UnknownDependency {
                task: name,
                dependency: bad,
            });
        }
        let id = TaskId(self.tasks.len() as u32);
        self.tasks.push(Task {
            name,
            deps,
            op: Box::new(op),
            done: false,
            attempts: 0,
        });
        Ok(id)
    }

    /// Run every task whose predecessors are all complete, once, in
    /// insertion order.
    ///
    /// A task completed earlier in the same pass unblocks later tasks in
    /// that pass. Incomplete tasks are retried on the next call; complete
    /// tasks are never re-run.
    pub fn do_available(&mut self, ctx: &mut C) -> PollReport {
        let mut report = PollReport::default();
        for n in 0..self.tasks.len() {
            if self.tasks[n].done {
                continue;
            }
            let ready = self.tasks[n]
                .deps
                .iter()
                .all(|d| self.tasks[d.0 as usize].done);
            if !ready {
                continue;
            }

            let task = &mut self.tasks[n];
            task.attempts += 1;
            report.ran += 1;
            match (task.op)(ctx) {
                TaskStatus::Complete => {
                    task.done = true;
                    report.completed += 1;
                    self.completed.push(TaskId(n as u32));
                    trace!(list = %self.label, task = %task.name, attempts = task.attempts, "task complete");
                }
                TaskStatus::Incomplete => {
                    report.incomplete += 1;
                    debug!(list = %self.label, task = %task.name, attempts = task.attempts, "task incomplete");
                }
            }
        }
        report
    }

    /// Whether every task is complete.
    pub fn is_complete(&self) -> bool {
        self.tasks.iter().all(|t| t.done)
    }

    /// Completion outcome of `id` so far, `None` for an unknown id.
    pub fn status(&self, id: TaskId) -> Option<TaskStatus> {
        self.tasks.get(id.0 as usize).map(|t| {
            if t.done {
                TaskStatus::Complete
            } else {
                TaskStatus::Incomplete
            }
        })
    }

    /// Tasks in the order they completed.
    pub fn completion_order(&self) -> &[TaskId] {
        &self.completed
    }

    /// Name of `id`.
    pub fn name(&self, id: TaskId) -> Option<&str> {
        self.tasks.get(id.0 as usize).map(|t| t.name.as_str())
    }

    /// Id of the first task called `name`.
    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.tasks
            .iter()
            .position(|t| t.name == name)
            .map(|n| TaskId(n as u32))
    }

    /// Predecessors of `id`.
    pub fn dependencies(&self, id: TaskId) -> Option<&TaskIdSet> {
        self.tasks.get(id.0 as usize).map(|t| &t.deps)
    }

    /// `label:name` of every task not yet complete.
    pub fn pending(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| !t.done)
            .map(|t| format!("{}:{}", self.label, t.name))
            .collect()
    }

    /// The list's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the list has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
