//! Uniform magnetised fluid at rest on one periodic patch.

use std::sync::Arc;

use approx::assert_relative_eq;
use grmhd_core::{Direction, Minkowski, Var};
use grmhd_driver::{Collaborators, HarmDriver, PatchSetup};
use grmhd_mesh::{MeshLayout, BASE_CONTAINER, DUDT_CONTAINER};
use grmhd_physics::{
    calculate_flux, flux_ct, flux_divergence, interior_corners, max_corner_div_b, DonorCell,
};
use grmhd_test_utils::{bounds, concrete_state, driver_config, eos, uniform_container, FrozenRecovery};

fn single_patch(integrator: &str) -> HarmDriver {
    let b = bounds([4, 4, 4], 2);
    let geometry = Arc::new(Minkowski::uniform(0.25));
    let base = uniform_container(b, geometry.as_ref(), concrete_state());
    HarmDriver::new(
        driver_config(integrator),
        MeshLayout::single_periodic(b),
        vec![PatchSetup { geometry, base }],
        Collaborators::new(Box::new(FrozenRecovery::new())),
    )
    .unwrap()
}

#[test]
fn fluxes_and_ct_keep_div_b_at_zero() {
    let b = bounds([4, 4, 4], 2);
    let geom = Minkowski::uniform(0.25);
    let mut c = uniform_container(b, &geom, concrete_state());
    for dir in Direction::ALL {
        calculate_flux(&mut c, dir, &geom, &eos(), &DonorCell);
    }
    flux_ct(&mut c.fluxes, &b);

    let mut dudt = c.cons.clone();
    flux_divergence(&c, &geom, &mut dudt);
    let dx = [0.25; 3];
    assert!(max_corner_div_b(&dudt, dx, &interior_corners(&b)) < 1e-12);
    assert!(max_corner_div_b(&c.cons, dx, &interior_corners(&b)) < 1e-12);
    for (k, j, i) in b.interior().iter() {
        for v in Var::ALL {
            assert_eq!(dudt.var(v, k, j, i), 0.0, "{v:?} at ({k}, {j}, {i})");
        }
    }
}

#[test]
fn one_step_leaves_uniform_state_unchanged() {
    for integrator in ["rk1", "rk2", "rk3"] {
        let mut driver = single_patch(integrator);
        let before = driver.patches()[0].containers().base().unwrap().cons.clone();
        let dt = driver.dt();
        driver.step().unwrap();

        let after = &driver.patches()[0].containers().base().unwrap().cons;
        let interior = bounds([4, 4, 4], 2).interior();
        for c in 0..grmhd_core::NPRIM {
            for (k, j, i) in interior.iter() {
                assert_relative_eq!(after.get(c, k, j, i), before.get(c, k, j, i), epsilon = 1e-14, max_relative = 1e-14);
            }
        }
        assert!(driver.max_div_b().unwrap() < 1e-12);
        assert_eq!(driver.time(), dt);
        assert_eq!(driver.step_id().0, 1);
    }
}

#[test]
fn timestep_follows_courant_condition() {
    let driver = single_patch("rk2");
    let base = driver.patches()[0].containers().base().unwrap();
    let ctop = base.ctop.get(0, 3, 3, 3);
    assert!(ctop > 0.0 && ctop < 1.0);
    for dir in Direction::ALL {
        assert_relative_eq!(base.ctop.get(dir.index(), 3, 3, 3), ctop, max_relative = 1e-14);
    }
    let expected = driver.config().cfl / (3.0 * ctop / 0.25);
    assert_relative_eq!(driver.dt(), expected, max_relative = 1e-14);
}

#[test]
fn step_registers_stage_containers() {
    let mut driver = single_patch("rk3");
    let metrics = driver.step().unwrap().clone();
    let names: Vec<_> = driver.patches()[0].containers().names().collect();
    assert_eq!(names, vec![BASE_CONTAINER, DUDT_CONTAINER, "1", "2"]);

    assert_eq!(metrics.stage_us.len(), 3);
    assert!(metrics.polls >= 3);
    assert!(metrics.tasks_run > 0);
    assert_eq!(metrics.failed_recoveries, 0);
}

#[test]
fn run_until_lands_on_end_time() {
    let mut driver = single_patch("rk2");
    let dt = driver.dt();
    let t_end = 2.5 * dt;
    let steps = driver.run_until(t_end).unwrap();
    assert_eq!(steps, 3);
    assert_eq!(driver.time(), t_end);
    assert!(driver.dt() > 0.0);
    assert_eq!(driver.run_until(t_end).unwrap(), 0);
}
