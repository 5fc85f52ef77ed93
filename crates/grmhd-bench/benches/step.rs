//! Criterion benchmarks for whole driver steps.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use grmhd_driver::{Collaborators, HarmDriver};
use grmhd_test_utils::{driver_config, periodic_mesh, FrozenRecovery};

fn driver(npatch: [usize; 3], integrator: &str) -> HarmDriver {
    let n = 32;
    let nx = [n / npatch[0], n / npatch[1], n / npatch[2]];
    let (layout, setups) = periodic_mesh(npatch, nx, grmhd_bench::GHOSTS, 1.0 / n as f64, |k, j, i| {
        grmhd_bench::wave_state(n, k, j, i)
    });
    let mut cfg = driver_config(integrator);
    cfg.max_polls = 1_000;
    HarmDriver::new(cfg, layout, setups, Collaborators::new(Box::new(FrozenRecovery::new()))).unwrap()
}

/// Benchmark: one RK2 step of a single 32^3 patch.
fn bench_step_single_patch(c: &mut Criterion) {
    let mut d = driver([1, 1, 1], "rk2");
    c.bench_function("step_rk2_1x32", |b| {
        b.iter(|| black_box(d.step().unwrap().tasks_run));
    });
}

/// Benchmark: the same domain split into eight 16^3 patches.
fn bench_step_eight_patches(c: &mut Criterion) {
    let mut d = driver([2, 2, 2], "rk2");
    c.bench_function("step_rk2_8x16", |b| {
        b.iter(|| black_box(d.step().unwrap().tasks_run));
    });
}

criterion_group!(benches, bench_step_single_patch, bench_step_eight_patches);
criterion_main!(benches);
