//! Task graphs for one integrator stage on one patch.
//!
//! ```text
//! start_receiving ─┬─ calculate_flux1 ─┐
//!                  ├─ calculate_flux2 ─┼─ flux_ct ─┬─ send_flux_correction
//!                  └─ calculate_flux3 ─┘           └─ receive_flux_correction
//!   ─ flux_divergence ─ source_term ─ update_container ─┬─ send_boundary
//!                                                       └─ receive_boundary
//!   ─ set_boundaries ─┬─ clear_boundary
//!                     └─ [prolongate] ─ apply_bc ─ custom_bc ─ fill_derived
//!   ─ estimate_timestep, [check_refinement]            (last stage only)
//! ```
//!
//! Bracketed tasks exist only with adaptive refinement. The graph is
//! generic over [`HarmTasks`] so it can be driven by a recording context
//! as well as by a real patch.

use grmhd_core::Direction;
use grmhd_physics::StageWeights;
use grmhd_tasks::{TaskIdSet, TaskList, TaskListError, TaskStatus};

/// The operations a stage graph schedules, one method per task.
///
/// `stage` is the 1-based integrator stage and tags messages; `0` is used
/// by the initial boundary fill.
pub trait HarmTasks: Send + 'static {
    /// Reset per-stage receive bookkeeping.
    fn start_receiving(&mut self) -> TaskStatus;
    /// Face fluxes and speeds along `dir` from the primitives of `container`.
    fn calculate_flux(&mut self, container: &str, dir: Direction) -> TaskStatus;
    /// Constrained-transport rewrite of the magnetic fluxes of `container`.
    fn flux_ct(&mut self, container: &str) -> TaskStatus;
    /// Send this patch's low-face fluxes to the neighbours below.
    fn send_flux_correction(&mut self, container: &str, stage: usize) -> TaskStatus;
    /// Overwrite high-face fluxes with those of the neighbours above.
    fn receive_flux_correction(&mut self, container: &str, stage: usize) -> TaskStatus;
    /// Overwrite the rate buffer with the flux divergence of `container`.
    fn flux_divergence(&mut self, container: &str) -> TaskStatus;
    /// Add geometric source terms of `container` to the rate buffer.
    fn source_term(&mut self, container: &str) -> TaskStatus;
    /// Combine base, `prev` and the rate buffer into `target`.
    fn update_container(&mut self, prev: &str, target: &str, weights: StageWeights) -> TaskStatus;
    /// Send ghost slabs of `container` to every neighbour.
    fn send_boundary(&mut self, container: &str, stage: usize) -> TaskStatus;
    /// Collect ghost slabs from every neighbour.
    fn receive_boundary(&mut self, stage: usize) -> TaskStatus;
    /// Unpack collected slabs into the ghost zones of `container`.
    fn set_boundaries(&mut self, container: &str) -> TaskStatus;
    /// Drop collected slabs.
    fn clear_boundary(&mut self) -> TaskStatus;
    /// Fill ghosts bordering coarser patches.
    fn prolongate(&mut self, container: &str) -> TaskStatus;
    /// Physical boundary conditions on outer faces.
    fn apply_bc(&mut self, container: &str) -> TaskStatus;
    /// Problem-specific boundary hook.
    fn custom_bc(&mut self, container: &str) -> TaskStatus;
    /// Recover primitives from the updated conserved state.
    fn fill_derived(&mut self, container: &str) -> TaskStatus;
    /// Next timestep from the face speeds stored in `container`.
    fn estimate_timestep(&mut self, container: &str) -> TaskStatus;
    /// Tag the patch for refinement.
    fn check_refinement(&mut self, container: &str) -> TaskStatus;
}

/// What one stage reads, writes and appends.
#[derive(Clone, Debug, PartialEq)]
pub struct StagePlan {
    /// 1-based stage number.
    pub stage: usize,
    /// Whether this is the integrator's last stage.
    pub last: bool,
    /// Stage weights.
    pub weights: StageWeights,
    /// Container whose state the fluxes are computed from.
    pub read: String,
    /// Container the stage writes.
    pub write: String,
    /// Adds prolongation and refinement tagging.
    pub adaptive: bool,
}

const FLUX_TASKS: [&str; 3] = ["calculate_flux1", "calculate_flux2", "calculate_flux3"];

/// Build the task list of one stage for one patch.
///
/// # Errors
///
/// Only on an internal wiring mistake; every dependency is an earlier task.
pub fn build_stage<T: HarmTasks>(label: impl Into<String>, plan: &StagePlan) -> Result<TaskList<T>, TaskListError> {
    let mut tl = TaskList::new(label);
    let stage = plan.stage;
    let read = plan.read.clone();
    let write = plan.write.clone();

    let t_start = tl.add_task("start_receiving", TaskIdSet::none(), |p: &mut T| p.start_receiving())?;

    let mut t_fluxes = TaskIdSet::none();
    for (dir, name) in Direction::ALL.into_iter().zip(FLUX_TASKS) {
        let c = read.clone();
        let t = tl.add_task(name, t_start, move |p: &mut T| p.calculate_flux(&c, dir))?;
        t_fluxes = t_fluxes | t;
    }

    let c = read.clone();
    let t_ct = tl.add_task("flux_ct", t_fluxes, move |p: &mut T| p.flux_ct(&c))?;

    let c = read.clone();
    tl.add_task("send_flux_correction", t_ct, move |p: &mut T| {
        p.send_flux_correction(&c, stage)
    })?;
    let c = read.clone();
    let t_recv_flux = tl.add_task("receive_flux_correction", t_ct, move |p: &mut T| {
        p.receive_flux_correction(&c, stage)
    })?;

    let c = read.clone();
    let t_div = tl.add_task("flux_divergence", t_recv_flux, move |p: &mut T| p.flux_divergence(&c))?;
    let c = read.clone();
    let t_src = tl.add_task("source_term", t_div, move |p: &mut T| p.source_term(&c))?;

    let (prev, target, w) = (read.clone(), write.clone(), plan.weights);
    let t_update = tl.add_task("update_container", t_src, move |p: &mut T| {
        p.update_container(&prev, &target, w)
    })?;

    let t_set = add_boundary_tasks(&mut tl, t_update.into(), &write, stage, plan.adaptive)?;

    let c = write.clone();
    let t_fill = tl.add_task("fill_derived", t_set, move |p: &mut T| p.fill_derived(&c))?;

    if plan.last {
        let c = read;
        tl.add_task("estimate_timestep", t_fill, move |p: &mut T| p.estimate_timestep(&c))?;
        if plan.adaptive {
            let c = write;
            tl.add_task("check_refinement", t_fill, move |p: &mut T| p.check_refinement(&c))?;
        }
    }
    Ok(tl)
}

/// Build the list run once before the first step: fill the ghost zones of
/// `container` and estimate the first timestep from its state.
///
/// # Errors
///
/// Only on an internal wiring mistake.
pub fn build_initial<T: HarmTasks>(label: impl Into<String>, container: &str) -> Result<TaskList<T>, TaskListError> {
    let mut tl = TaskList::new(label);
    let t_start = tl.add_task("start_receiving", TaskIdSet::none(), |p: &mut T| p.start_receiving())?;
    let t_bc = add_boundary_tasks(&mut tl, t_start.into(), container, 0, false)?;

    let mut t_fluxes = TaskIdSet::none();
    for (dir, name) in Direction::ALL.into_iter().zip(FLUX_TASKS) {
        let c = container.to_string();
        let t = tl.add_task(name, t_bc.clone(), move |p: &mut T| p.calculate_flux(&c, dir))?;
        t_fluxes = t_fluxes | t;
    }
    let c = container.to_string();
    tl.add_task("estimate_timestep", t_fluxes, move |p: &mut T| p.estimate_timestep(&c))?;
    Ok(tl)
}

/// Exchange, boundary-condition and hook tasks after `after`. Returns the
/// dependency set of whatever runs next.
fn add_boundary_tasks<T: HarmTasks>(
    tl: &mut TaskList<T>,
    after: TaskIdSet,
    container: &str,
    stage: usize,
    adaptive: bool,
) -> Result<TaskIdSet, TaskListError> {
    let c = container.to_string();
    tl.add_task("send_boundary", after.clone(), move |p: &mut T| p.send_boundary(&c, stage))?;
    let t_recv = tl.add_task("receive_boundary", after, move |p: &mut T| p.receive_boundary(stage))?;

    let c = container.to_string();
    let t_set = tl.add_task("set_boundaries", t_recv, move |p: &mut T| p.set_boundaries(&c))?;
    tl.add_task("clear_boundary", t_set, |p: &mut T| p.clear_boundary())?;

    let before_bc = if adaptive {
        let c = container.to_string();
        tl.add_task("prolongate", t_set, move |p: &mut T| p.prolongate(&c))?
    } else {
        t_set
    };

    let c = container.to_string();
    let t_bc = tl.add_task("apply_bc", before_bc, move |p: &mut T| p.apply_bc(&c))?;
    let c = container.to_string();
    let t_custom = tl.add_task("custom_bc", t_bc, move |p: &mut T| p.custom_bc(&c))?;
    Ok(t_custom.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Context that accepts every task.
    struct Accept;

    impl HarmTasks for Accept {
        fn start_receiving(&mut self) -> TaskStatus {
            TaskStatus::Complete
        }
        fn calculate_flux(&mut self, _: &str, _: Direction) -> TaskStatus {
            TaskStatus::Complete
        }
        fn flux_ct(&mut self, _: &str) -> TaskStatus {
            TaskStatus::Complete
        }
        fn send_flux_correction(&mut self, _: &str, _: usize) -> TaskStatus {
            TaskStatus::Complete
        }
        fn receive_flux_correction(&mut self, _: &str, _: usize) -> TaskStatus {
            TaskStatus::Complete
        }
        fn flux_divergence(&mut self, _: &str) -> TaskStatus {
            TaskStatus::Complete
        }
        fn source_term(&mut self, _: &str) -> TaskStatus {
            TaskStatus::Complete
        }
        fn update_container(&mut self, _: &str, _: &str, _: StageWeights) -> TaskStatus {
            TaskStatus::Complete
        }
        fn send_boundary(&mut self, _: &str, _: usize) -> TaskStatus {
            TaskStatus::Complete
        }
        fn receive_boundary(&mut self, _: usize) -> TaskStatus {
            TaskStatus::Complete
        }
        fn set_boundaries(&mut self, _: &str) -> TaskStatus {
            TaskStatus::Complete
        }
        fn clear_boundary(&mut self) -> TaskStatus {
            TaskStatus::Complete
        }
        fn prolongate(&mut self, _: &str) -> TaskStatus {
            TaskStatus::Complete
        }
        fn apply_bc(&mut self, _: &str) -> TaskStatus {
            TaskStatus::Complete
        }
        fn custom_bc(&mut self, _: &str) -> TaskStatus {
            TaskStatus::Complete
        }
        fn fill_derived(&mut self, _: &str) -> TaskStatus {
            TaskStatus::Complete
        }
        fn estimate_timestep(&mut self, _: &str) -> TaskStatus {
            TaskStatus::Complete
        }
        fn check_refinement(&mut self, _: &str) -> TaskStatus {
            TaskStatus::Complete
        }
    }

    fn plan(last: bool, adaptive: bool) -> StagePlan {
        StagePlan {
            stage: 1,
            last,
            weights: StageWeights {
                gam0: 0.0,
                gam1: 1.0,
                beta: 1.0,
            },
            read: "base".into(),
            write: "1".into(),
            adaptive,
        }
    }

    fn deps_of(tl: &TaskList<Accept>, name: &str) -> Vec<String> {
        let id = tl.find(name).unwrap();
        tl.dependencies(id)
            .unwrap()
            .iter()
            .map(|d| tl.name(d).unwrap().to_string())
            .collect()
    }

    #[test]
    fn flux_tasks_hang_off_start_and_join_at_ct() {
        let tl: TaskList<Accept> = build_stage("p0", &plan(false, false)).unwrap();
        for name in FLUX_TASKS {
            assert_eq!(deps_of(&tl, name), vec!["start_receiving"]);
        }
        assert_eq!(deps_of(&tl, "flux_ct"), FLUX_TASKS.to_vec());
        assert_eq!(deps_of(&tl, "send_flux_correction"), vec!["flux_ct"]);
        assert_eq!(deps_of(&tl, "flux_divergence"), vec!["receive_flux_correction"]);
        assert_eq!(deps_of(&tl, "update_container"), vec!["source_term"]);
        assert_eq!(deps_of(&tl, "receive_boundary"), vec!["update_container"]);
        assert_eq!(deps_of(&tl, "apply_bc"), vec!["set_boundaries"]);
        assert_eq!(deps_of(&tl, "fill_derived"), vec!["custom_bc"]);
    }

    #[test]
    fn intermediate_stage_has_no_step_tasks() {
        let tl: TaskList<Accept> = build_stage("p0", &plan(false, true)).unwrap();
        assert!(tl.find("estimate_timestep").is_none());
        assert!(tl.find("check_refinement").is_none());
        assert_eq!(deps_of(&tl, "apply_bc"), vec!["prolongate"]);
    }

    #[test]
    fn last_stage_tasks_follow_recovery() {
        let tl: TaskList<Accept> = build_stage("p0", &plan(true, true)).unwrap();
        assert_eq!(deps_of(&tl, "estimate_timestep"), vec!["fill_derived"]);
        assert_eq!(deps_of(&tl, "check_refinement"), vec!["fill_derived"]);

        let fixed: TaskList<Accept> = build_stage("p0", &plan(true, false)).unwrap();
        assert!(fixed.find("check_refinement").is_none());
        assert!(fixed.find("prolongate").is_none());
        assert_eq!(fixed.len(), tl.len() - 2);
    }

    #[test]
    fn accepting_context_finishes_in_one_pass() {
        let mut tl: TaskList<Accept> = build_stage("p0", &plan(true, true)).unwrap();
        let report = tl.do_available(&mut Accept);
        assert!(tl.is_complete());
        assert_eq!(report.ran as usize, tl.len());
    }

    #[test]
    fn initial_list_estimates_after_ghost_fill() {
        let tl: TaskList<Accept> = build_initial("p0", "base").unwrap();
        assert!(tl.find("update_container").is_none());
        assert_eq!(deps_of(&tl, "calculate_flux2"), vec!["custom_bc"]);
        assert_eq!(deps_of(&tl, "estimate_timestep"), FLUX_TASKS.to_vec());
    }
}
