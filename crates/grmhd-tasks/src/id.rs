//! Task identifiers and predecessor sets.

use std::fmt;
use std::ops::BitOr;

use smallvec::SmallVec;

/// Identifies a task within one [`TaskList`](crate::TaskList).
///
/// Ids are assigned in insertion order, so a task's id is always greater
/// than the ids of its predecessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of predecessor tasks.
///
/// Built by joining ids with `|`:
///
/// ```
/// use grmhd_tasks::{TaskId, TaskIdSet};
///
/// let joined = TaskId(1) | TaskId(2) | TaskId(3);
/// assert_eq!(joined.len(), 3);
/// assert!(TaskIdSet::none().is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskIdSet(SmallVec<[TaskId; 4]>);

impl TaskIdSet {
    /// The empty set: a task with no predecessors.
    pub fn none() -> Self {
        Self(SmallVec::new())
    }

    /// Number of distinct tasks in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `id` is in the set.
    pub fn contains(&self, id: TaskId) -> bool {
        self.0.contains(&id)
    }

    /// Iterate the members.
    pub fn iter(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.0.iter().copied()
    }

    fn insert(&mut self, id: TaskId) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }
}

impl From<TaskId> for TaskIdSet {
    fn from(id: TaskId) -> Self {
        let mut s = Self::none();
        s.insert(id);
        s
    }
}

impl BitOr for TaskId {
    type Output = TaskIdSet;

    fn bitor(self, rhs: TaskId) -> TaskIdSet {
        TaskIdSet::from(self) | rhs
    }
}

impl BitOr<TaskId> for TaskIdSet {
    type Output = TaskIdSet;

    fn bitor(mut self, rhs: TaskId) -> TaskIdSet {
        self.insert(rhs);
        self
    }
}

impl BitOr for TaskIdSet {
    type Output = TaskIdSet;

    fn bitor(mut self, rhs: TaskIdSet) -> TaskIdSet {
        for id in rhs.0 {
            self.insert(id);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_deduplicates() {
        let s = TaskId(1) | TaskId(1) | TaskId(2);
        assert_eq!(s.len(), 2);
        assert!(s.contains(TaskId(2)));
    }

    #[test]
    fn join_of_sets() {
        let a = TaskId(0) | TaskId(1);
        let b = TaskId(1) | TaskId(4);
        let c = a | b;
        assert_eq!(c.iter().collect::<Vec<_>>(), vec![TaskId(0), TaskId(1), TaskId(4)]);
    }
}
