//! Stage graphs driven by a recording context.

use grmhd_driver::{build_initial, build_stage, StagePlan};
use grmhd_physics::StageWeights;
use grmhd_tasks::TaskRegion;
use grmhd_test_utils::RecordingTasks;
use proptest::prelude::*;

fn plan(last: bool, adaptive: bool) -> StagePlan {
    StagePlan {
        stage: 2,
        last,
        weights: StageWeights {
            gam0: 0.5,
            gam1: 0.5,
            beta: 0.5,
        },
        read: "1".into(),
        write: "base".into(),
        adaptive,
    }
}

fn run(plan: &StagePlan, stall: u32, patches: usize) -> Vec<RecordingTasks> {
    let lists = (0..patches)
        .map(|n| build_stage(format!("patch{n}"), plan).unwrap())
        .collect();
    let mut region = TaskRegion::new(lists);
    let mut ctx = vec![RecordingTasks::new(stall); patches];
    region.execute(&mut ctx, 100).unwrap();
    ctx
}

fn before(log: &RecordingTasks, first: &str, second: &str) -> bool {
    match (log.position(first), log.position(second)) {
        (Some(a), Some(b)) => a < b,
        _ => false,
    }
}

#[test]
fn receives_are_polled_without_rerunning_predecessors() {
    let ctx = run(&plan(true, false), 3, 1);
    let log = &ctx[0];
    for name in ["start_receiving", "flux_ct", "update_container", "fill_derived"] {
        assert_eq!(log.log.iter().filter(|n| *n == name).count(), 1, "{name}");
    }
    assert!(before(log, "receive_flux_correction", "flux_divergence"));
    assert!(before(log, "receive_boundary", "set_boundaries"));
}

#[test]
fn initial_fill_runs_boundaries_before_fluxes() {
    let mut region = TaskRegion::new(vec![build_initial("patch0", "base").unwrap()]);
    let mut ctx = vec![RecordingTasks::new(2)];
    region.execute(&mut ctx, 100).unwrap();
    let log = &ctx[0];
    assert!(before(log, "custom_bc", "calculate_flux1"));
    assert!(before(log, "calculate_flux3", "estimate_timestep"));
    assert!(log.position("fill_derived").is_none());
}

proptest! {
    #[test]
    fn stage_order_respects_data_dependencies(
        stall in 0u32..5,
        last in any::<bool>(),
        adaptive in any::<bool>(),
        patches in 1usize..4,
    ) {
        for log in run(&plan(last, adaptive), stall, patches) {
            for flux in ["calculate_flux1", "calculate_flux2", "calculate_flux3"] {
                prop_assert!(before(&log, "start_receiving", flux));
                prop_assert!(before(&log, flux, "flux_ct"));
            }
            prop_assert!(before(&log, "flux_ct", "send_flux_correction"));
            prop_assert!(before(&log, "flux_ct", "receive_flux_correction"));
            prop_assert!(before(&log, "receive_flux_correction", "flux_divergence"));
            prop_assert!(before(&log, "flux_divergence", "source_term"));
            prop_assert!(before(&log, "source_term", "update_container"));
            prop_assert!(before(&log, "update_container", "send_boundary"));
            prop_assert!(before(&log, "receive_boundary", "set_boundaries"));
            prop_assert!(before(&log, "set_boundaries", "clear_boundary"));
            prop_assert!(before(&log, "set_boundaries", "apply_bc"));
            prop_assert!(before(&log, "apply_bc", "custom_bc"));
            prop_assert!(before(&log, "custom_bc", "fill_derived"));

            prop_assert_eq!(log.position("prolongate").is_some(), adaptive);
            if adaptive {
                prop_assert!(before(&log, "prolongate", "apply_bc"));
            }
            prop_assert_eq!(log.position("estimate_timestep").is_some(), last);
            prop_assert_eq!(log.position("check_refinement").is_some(), last && adaptive);
            if last {
                prop_assert!(before(&log, "fill_derived", "estimate_timestep"));
            }
        }
    }
}
