//! Several patches stepping together: decomposition invariance, delayed
//! transport, physical boundaries, refinement hooks and fault reporting.

use std::f64::consts::TAU;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use approx::assert_relative_eq;
use grmhd_core::{Direction, Minkowski, PatchId, StateVector, NPRIM};
use grmhd_driver::{
    AmrTag, BoundaryExchange, BoundaryFace, ChannelExchange, Collaborators, DriverError, HarmDriver, PatchSetup,
    TaskFault,
};
use grmhd_mesh::MeshLayout;
use grmhd_test_utils::{
    bounds, concrete_state, driver_config, periodic_mesh, uniform_container, DeadExchange, DelayedExchange,
    FrozenRecovery, RecordingBoundary, TaggingRefinement,
};

/// Smooth periodic profile over an 8 x 8 x 4 zone domain. The field is
/// corner-divergence free: `B1` varies only along X2, `B2` only along X1.
fn profile(gk: usize, gj: usize, gi: usize) -> StateVector {
    let x = TAU * gi as f64 / 8.0;
    let y = TAU * gj as f64 / 8.0;
    let z = TAU * gk as f64 / 4.0;
    StateVector::primitive(
        1.0 + 0.3 * x.sin() * y.cos(),
        0.8 + 0.1 * z.cos(),
        [0.2 * y.sin(), 0.1 * x.cos(), 0.05],
        [0.3 * y.cos(), 0.2 * x.sin(), 0.1],
    )
}

fn run(npatch: [usize; 3], steps: usize) -> HarmDriver {
    let nx = [8 / npatch[0], 8 / npatch[1], 4 / npatch[2]];
    let (layout, setups) = periodic_mesh(npatch, nx, 2, 0.125, profile);
    let mut driver = HarmDriver::new(
        driver_config("rk2"),
        layout,
        setups,
        Collaborators::new(Box::new(FrozenRecovery::new())),
    )
    .unwrap();
    for _ in 0..steps {
        driver.step().unwrap();
    }
    driver
}

/// Conserved value of component `c` at global interior zone `(gk, gj, gi)`.
fn global_cons(driver: &HarmDriver, c: usize, gk: usize, gj: usize, gi: usize) -> f64 {
    let layout = driver.layout();
    let b = *layout.bounds();
    let n = [b.nx(Direction::X1), b.nx(Direction::X2), b.nx(Direction::X3)];
    let pos = [gi / n[0], gj / n[1], gk / n[2]];
    let id = layout
        .patches()
        .find(|&id| layout.position(id) == pos)
        .unwrap();
    let ng = b.ng();
    let base = driver.patch(id).unwrap().containers().base().unwrap();
    base.cons.get(c, gk % n[2] + ng, gj % n[1] + ng, gi % n[0] + ng)
}

#[test]
fn decomposition_does_not_change_the_answer() {
    let whole = run([1, 1, 1], 2);
    for npatch in [[2, 1, 1], [2, 2, 1], [2, 2, 2]] {
        let split = run(npatch, 2);
        assert_eq!(split.dt(), whole.dt(), "{npatch:?}");
        for c in 0..NPRIM {
            for gk in 0..4 {
                for gj in 0..8 {
                    for gi in 0..8 {
                        assert_relative_eq!(
                            global_cons(&split, c, gk, gj, gi),
                            global_cons(&whole, c, gk, gj, gi),
                            epsilon = 1e-13,
                            max_relative = 1e-12
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn magnetic_field_stays_divergence_free() {
    let driver = run([2, 2, 1], 3);
    assert!(driver.max_div_b().unwrap() < 1e-12);
}

#[test]
fn delayed_messages_only_cost_polls() {
    let nx = [4, 4, 4];
    let (layout, setups) = periodic_mesh([2, 2, 1], nx, 2, 0.125, profile);
    let exchanges = ChannelExchange::network(layout.num_patches())
        .into_iter()
        .map(|e| Box::new(DelayedExchange::new(e, 3)) as Box<dyn BoundaryExchange>)
        .collect();
    let mut delayed = HarmDriver::with_exchanges(
        driver_config("rk2"),
        layout,
        setups,
        Collaborators::new(Box::new(FrozenRecovery::new())),
        exchanges,
    )
    .unwrap();
    let metrics = delayed.step().unwrap().clone();
    assert!(metrics.incomplete_polls > 0);
    assert!(metrics.polls > 2);

    let prompt = run([2, 2, 1], 1);
    assert!(prompt.last_metrics().incomplete_polls < metrics.incomplete_polls);
    for (a, b) in delayed.patches().iter().zip(prompt.patches()) {
        let a = &a.containers().base().unwrap().cons;
        let b = &b.containers().base().unwrap().cons;
        assert_eq!(a.as_slice(), b.as_slice());
    }
}

#[test]
fn outer_faces_get_physical_boundaries() {
    let b = bounds([4, 4, 4], 2);
    let geometry = Arc::new(Minkowski::uniform(0.25));
    let layout = MeshLayout::new([2, 1, 1], [false, true, true], b).unwrap();
    let setups = (0..2)
        .map(|_| PatchSetup {
            geometry: geometry.clone(),
            base: uniform_container(b, geometry.as_ref(), concrete_state()),
        })
        .collect();
    let hook = RecordingBoundary::new();
    let collab = Collaborators::new(Box::new(FrozenRecovery::new())).with_custom_bc(Box::new(hook.clone()));
    let mut driver = HarmDriver::new(driver_config("rk1"), layout, setups, collab).unwrap();

    let low = BoundaryFace {
        dir: Direction::X1,
        high: false,
    };
    let high = BoundaryFace {
        dir: Direction::X1,
        high: true,
    };
    assert_eq!(driver.patch(PatchId(0)).unwrap().physical_faces(), &[low]);
    assert_eq!(driver.patch(PatchId(1)).unwrap().physical_faces(), &[high]);

    driver.step().unwrap();
    // one initial fill and one stage, on both patches
    let calls = hook.recorded();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|faces| faces.len() == 1));

    let base = driver.patch(PatchId(0)).unwrap().containers().base().unwrap();
    for c in 0..NPRIM {
        assert_eq!(base.cons.get(c, 3, 3, 0), base.cons.get(c, 3, 3, 2));
    }
}

#[test]
fn adaptive_meshes_run_refinement_hooks() {
    let (layout, setups) = periodic_mesh([2, 1, 1], [4, 4, 4], 2, 0.125, profile);
    let refinement = TaggingRefinement::new(AmrTag::Refine);
    let mut cfg = driver_config("rk2");
    cfg.adaptive = true;
    let collab =
        Collaborators::new(Box::new(FrozenRecovery::new())).with_refinement(Box::new(refinement.clone()));
    let mut driver = HarmDriver::new(cfg, layout, setups, collab).unwrap();
    assert!(driver.patches().iter().all(|p| p.amr_tag() == AmrTag::Same));

    driver.step().unwrap();
    assert!(driver.patches().iter().all(|p| p.amr_tag() == AmrTag::Refine));
    assert_eq!(refinement.prolongations.load(Ordering::Relaxed), 2 * 2);
    assert_eq!(refinement.checks.load(Ordering::Relaxed), 2);
}

#[test]
fn failed_recoveries_are_counted() {
    let (layout, setups) = periodic_mesh([2, 1, 1], [4, 4, 4], 2, 0.125, profile);
    let recovery = FrozenRecovery::failing(3);
    let mut driver = HarmDriver::new(
        driver_config("rk3"),
        layout,
        setups,
        Collaborators::new(Box::new(recovery.clone())),
    )
    .unwrap();
    let metrics = driver.step().unwrap();
    assert_eq!(metrics.failed_recoveries, 3 * 3 * 2);
    assert_eq!(recovery.calls(), 3 * 2);
}

#[test]
fn dead_transport_is_reported_as_patch_fault() {
    let (layout, setups) = periodic_mesh([1, 1, 1], [4, 4, 4], 2, 0.125, profile);
    let err = HarmDriver::with_exchanges(
        driver_config("rk2"),
        layout,
        setups,
        Collaborators::new(Box::new(FrozenRecovery::new())),
        vec![Box::new(DeadExchange)],
    )
    .err()
    .unwrap();
    match err {
        DriverError::PatchFault {
            patch,
            source: TaskFault::Disconnected { .. },
        } => assert_eq!(patch, PatchId(0)),
        other => panic!("expected PatchFault(Disconnected), got {other:?}"),
    }
}

#[test]
fn setups_must_match_layout() {
    let (layout, mut setups) = periodic_mesh([2, 1, 1], [4, 4, 4], 2, 0.125, profile);
    setups.pop();
    let err = HarmDriver::new(
        driver_config("rk2"),
        layout.clone(),
        setups,
        Collaborators::new(Box::new(FrozenRecovery::new())),
    )
    .err()
    .unwrap();
    assert!(matches!(err, DriverError::PatchCount { expected: 2, got: 1 }));

    let (_, mut setups) = periodic_mesh([2, 1, 1], [4, 4, 4], 2, 0.125, profile);
    let geometry = Arc::new(Minkowski::uniform(0.125));
    setups[1].base = uniform_container(bounds([4, 4, 2], 2), geometry.as_ref(), concrete_state());
    let err = HarmDriver::new(
        driver_config("rk2"),
        layout,
        setups,
        Collaborators::new(Box::new(FrozenRecovery::new())),
    )
    .err()
    .unwrap();
    assert!(matches!(err, DriverError::BoundsMismatch { patch: PatchId(1) }));
}

#[test]
fn invalid_config_is_rejected_before_setup() {
    let (layout, setups) = periodic_mesh([1, 1, 1], [4, 4, 4], 2, 0.125, profile);
    let mut cfg = driver_config("rk2");
    cfg.cfl = 2.0;
    let err = HarmDriver::new(cfg, layout, setups, Collaborators::new(Box::new(FrozenRecovery::new())))
        .err()
        .unwrap();
    assert!(matches!(err, DriverError::Config(_)));
}
