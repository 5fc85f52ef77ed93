//! Task-dependency graphs for per-patch integration stages.
//!
//! Tasks signal [`TaskStatus::Complete`] or [`TaskStatus::Incomplete`];
//! there is no failure outcome. An incomplete task (a receive whose data
//! has not arrived) is re-attempted on a later poll without re-running its
//! completed predecessors, so communication never blocks a worker thread.
//! Persistent incompleteness surfaces only as the scheduler-level
//! [`SchedulerError::Stalled`] once the poll horizon is exhausted.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod list;
pub mod region;

pub use error::{SchedulerError, TaskListError};
pub use id::{TaskId, TaskIdSet};
pub use list::{PollReport, TaskFn, TaskList, TaskStatus};
pub use region::{RegionReport, TaskRegion};
