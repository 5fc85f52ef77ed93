//! Polling scheduler over many task lists.
//!
//! A [`TaskRegion`] holds one task list per patch for one integration
//! sub-stage. Each polling round visits every list once, in parallel across
//! patches, and runs whatever is ready. Rounds repeat until every list is
//! complete or the poll horizon is reached.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::SchedulerError;
use crate::list::{PollReport, TaskList};

/// Totals from one [`TaskRegion::execute`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionReport {
    /// Polling rounds performed.
    pub polls: u64,
    /// Task operations invoked across all lists and rounds.
    pub tasks_run: u64,
    /// Invocations that returned incomplete.
    pub incomplete_polls: u64,
}

/// One task list per context, driven to completion together.
pub struct TaskRegion<C> {
    lists: Vec<TaskList<C>>,
}

impl<C> Default for TaskRegion<C> {
    fn default() -> Self {
        Self { lists: Vec::new() }
    }
}

impl<C: Send> TaskRegion<C> {
    /// Region over `lists`; list `n` will run against context `n`.
    pub fn new(lists: Vec<TaskList<C>>) -> Self {
        Self { lists }
    }

    /// Append a list.
    pub fn push(&mut self, list: TaskList<C>) {
        self.lists.push(list);
    }

    /// The lists, in context order.
    pub fn lists(&self) -> &[TaskList<C>] {
        &self.lists
    }

    /// Whether every list is complete.
    pub fn is_complete(&self) -> bool {
        self.lists.iter().all(TaskList::is_complete)
    }

    /// Poll until every list completes.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::ContextMismatch`] if `contexts` and the lists differ
    /// in length, and [`SchedulerError::Stalled`] if tasks remain after
    /// `max_polls` rounds.
    pub fn execute(&mut self, contexts: &mut [C], max_polls: u64) -> Result<RegionReport, SchedulerError> {
        if contexts.len() != self.lists.len() {
            return Err(SchedulerError::ContextMismatch {
                lists: self.lists.len(),
                contexts: contexts.len(),
            });
        }

        let mut report = RegionReport::default();
        while !self.is_complete() {
            if report.polls >= max_polls {
                let pending: Vec<String> = self.lists.iter().flat_map(TaskList::pending).collect();
                warn!(polls = report.polls, pending = pending.len(), "task region stalled");
                return Err(SchedulerError::Stalled {
                    polls: report.polls,
                    pending,
                });
            }

            let round = self
                .lists
                .par_iter_mut()
                .zip(contexts.par_iter_mut())
                .map(|(list, ctx)| list.do_available(ctx))
                .reduce(PollReport::default, PollReport::merge);

            report.polls += 1;
            report.tasks_run += u64::from(round.ran);
            report.incomplete_polls += u64::from(round.incomplete);
        }
        debug!(
            polls = report.polls,
            tasks = report.tasks_run,
            incomplete = report.incomplete_polls,
            "task region complete"
        );
        Ok(report)
    }
}
