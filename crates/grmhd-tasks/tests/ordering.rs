//! Dependency ordering over randomly shaped task graphs.

use grmhd_tasks::{TaskId, TaskIdSet, TaskList, TaskRegion, TaskStatus};
use proptest::prelude::*;

/// Each task: predecessor picks (taken modulo its index) and the number of
/// times it answers incomplete before completing.
fn graph() -> impl Strategy<Value = Vec<(Vec<usize>, u32)>> {
    prop::collection::vec((prop::collection::vec(0usize..64, 0..4), 0u32..4), 1..24)
}

fn build(shape: &[(Vec<usize>, u32)]) -> TaskList<Vec<TaskId>> {
    let mut list = TaskList::new("p0");
    for (n, (picks, stalls)) in shape.iter().enumerate() {
        let mut deps = TaskIdSet::none();
        if n > 0 {
            for p in picks {
                deps = deps | TaskId((p % n) as u32);
            }
        }
        let mut left = *stalls;
        let me = TaskId(n as u32);
        list.add_task(format!("t{n}"), deps, move |seen: &mut Vec<TaskId>| {
            if left > 0 {
                left -= 1;
                TaskStatus::Incomplete
            } else {
                seen.push(me);
                TaskStatus::Complete
            }
        })
        .unwrap();
    }
    list
}

proptest! {
    #[test]
    fn no_task_completes_before_its_predecessors(shape in graph()) {
        let mut region = TaskRegion::new(vec![build(&shape)]);
        let mut seen = vec![Vec::new()];
        region.execute(&mut seen, 1_000).unwrap();

        let list = &region.lists()[0];
        let order = list.completion_order();
        prop_assert_eq!(order, seen[0].as_slice());
        prop_assert_eq!(order.len(), shape.len());

        let pos = |id: TaskId| order.iter().position(|&t| t == id).unwrap();
        for n in 0..shape.len() {
            let id = TaskId(n as u32);
            for dep in list.dependencies(id).unwrap().iter() {
                prop_assert!(pos(dep) < pos(id));
            }
        }
    }

    #[test]
    fn stalls_only_delay_completion(shape in graph()) {
        let mut region = TaskRegion::new(vec![build(&shape)]);
        let mut seen = vec![Vec::new()];
        let report = region.execute(&mut seen, 1_000).unwrap();
        let total_stalls: u64 = shape.iter().map(|(_, s)| u64::from(*s)).sum();
        prop_assert_eq!(report.incomplete_polls, total_stalls);
        prop_assert_eq!(report.tasks_run, total_stalls + shape.len() as u64);
    }
}
