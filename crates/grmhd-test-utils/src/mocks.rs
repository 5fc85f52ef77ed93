//! Mock collaborators and transports.
//!
//! - [`FrozenRecovery`]: leaves primitives untouched, optionally reporting
//!   a fixed number of failed zones, and counts its calls.
//! - [`RecordingBoundary`]: custom boundary hook that records the faces it
//!   was handed.
//! - [`TaggingRefinement`]: refinement hooks returning a fixed tag and
//!   counting prolongations.
//! - [`DelayedExchange`]: wraps any transport and hides each message for
//!   a fixed number of receive attempts.
//! - [`RecordingTasks`]: a [`HarmTasks`] context that logs task names and
//!   keeps receives incomplete for a number of polls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use grmhd_core::{Direction, Geometry, PatchId};
use grmhd_driver::{
    AmrTag, BoundaryExchange, BoundaryFace, CustomBoundary, HarmTasks, MessageTag, Refinement, TaskFault,
};
use grmhd_mesh::{Container, Neighbor, NeighborOffset};
use grmhd_physics::{EquationOfState, PrimitiveRecovery, StageWeights};
use grmhd_tasks::TaskStatus;

/// Recovery that keeps the primitives it is given.
#[derive(Clone, Debug, Default)]
pub struct FrozenRecovery {
    pub failures_per_call: usize,
    pub calls: Arc<AtomicUsize>,
}

impl FrozenRecovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `n` failed zones on every call.
    pub fn failing(n: usize) -> Self {
        Self {
            failures_per_call: n,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl PrimitiveRecovery for FrozenRecovery {
    fn name(&self) -> &str {
        "frozen"
    }

    fn recover(&self, _c: &mut Container, _geom: &dyn Geometry, _eos: &dyn EquationOfState) -> usize {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.failures_per_call
    }
}

/// Custom boundary hook that records every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingBoundary {
    pub calls: Arc<Mutex<Vec<Vec<BoundaryFace>>>>,
}

impl RecordingBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faces handed to each call so far.
    pub fn recorded(&self) -> Vec<Vec<BoundaryFace>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CustomBoundary for RecordingBoundary {
    fn name(&self) -> &str {
        "recording"
    }

    fn apply(&self, _c: &mut Container, faces: &[BoundaryFace]) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(faces.to_vec());
        }
    }
}

/// Refinement hooks that always answer `tag`.
#[derive(Clone, Debug, Default)]
pub struct TaggingRefinement {
    pub tag: AmrTag,
    pub prolongations: Arc<AtomicUsize>,
    pub checks: Arc<AtomicUsize>,
}

impl TaggingRefinement {
    pub fn new(tag: AmrTag) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }
}

impl Refinement for TaggingRefinement {
    fn name(&self) -> &str {
        "tagging"
    }

    fn prolongate(&self, _c: &mut Container) {
        self.prolongations.fetch_add(1, Ordering::Relaxed);
    }

    fn check(&self, _c: &Container) -> AmrTag {
        self.checks.fetch_add(1, Ordering::Relaxed);
        self.tag
    }
}

/// Transport that withholds every message for `delay` receive attempts
/// before handing it over.
pub struct DelayedExchange<E> {
    inner: E,
    delay: u32,
    attempts: HashMap<(MessageTag, PatchId, NeighborOffset), u32>,
    pub sends: usize,
}

impl<E: BoundaryExchange> DelayedExchange<E> {
    pub fn new(inner: E, delay: u32) -> Self {
        Self {
            inner,
            delay,
            attempts: HashMap::new(),
            sends: 0,
        }
    }
}

impl<E: BoundaryExchange> BoundaryExchange for DelayedExchange<E> {
    fn send(&mut self, tag: MessageTag, to: &Neighbor, payload: Vec<f64>) -> Result<(), TaskFault> {
        self.sends += 1;
        self.inner.send(tag, to, payload)
    }

    fn try_receive(&mut self, tag: MessageTag, from: &Neighbor) -> Option<Vec<f64>> {
        let seen = self.attempts.entry((tag, from.patch, from.offset)).or_insert(0);
        if *seen < self.delay {
            *seen += 1;
            return None;
        }
        self.inner.try_receive(tag, from)
    }
}

/// Transport whose sends always fail.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeadExchange;

impl BoundaryExchange for DeadExchange {
    fn send(&mut self, _tag: MessageTag, to: &Neighbor, _payload: Vec<f64>) -> Result<(), TaskFault> {
        Err(TaskFault::Disconnected { peer: to.patch })
    }

    fn try_receive(&mut self, _tag: MessageTag, _from: &Neighbor) -> Option<Vec<f64>> {
        None
    }
}

/// Task context that records `"name"` for every completed task and keeps
/// each receive incomplete for `stall` attempts.
#[derive(Clone, Debug, Default)]
pub struct RecordingTasks {
    pub stall: u32,
    pub log: Vec<String>,
    pending: HashMap<&'static str, u32>,
}

impl RecordingTasks {
    pub fn new(stall: u32) -> Self {
        Self {
            stall,
            ..Self::default()
        }
    }

    /// Position of `name` in the completion log.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.log.iter().position(|n| n == name)
    }

    fn done(&mut self, name: &str) -> TaskStatus {
        self.log.push(name.to_string());
        TaskStatus::Complete
    }

    fn receive(&mut self, name: &'static str) -> TaskStatus {
        let seen = self.pending.entry(name).or_insert(0);
        if *seen < self.stall {
            *seen += 1;
            return TaskStatus::Incomplete;
        }
        self.done(name)
    }
}

impl HarmTasks for RecordingTasks {
    fn start_receiving(&mut self) -> TaskStatus {
        self.done("start_receiving")
    }
    fn calculate_flux(&mut self, _container: &str, dir: Direction) -> TaskStatus {
        self.done(&format!("calculate_flux{}", dir.number()))
    }
    fn flux_ct(&mut self, _container: &str) -> TaskStatus {
        self.done("flux_ct")
    }
    fn send_flux_correction(&mut self, _container: &str, _stage: usize) -> TaskStatus {
        self.done("send_flux_correction")
    }
    fn receive_flux_correction(&mut self, _container: &str, _stage: usize) -> TaskStatus {
        self.receive("receive_flux_correction")
    }
    fn flux_divergence(&mut self, _container: &str) -> TaskStatus {
        self.done("flux_divergence")
    }
    fn source_term(&mut self, _container: &str) -> TaskStatus {
        self.done("source_term")
    }
    fn update_container(&mut self, _prev: &str, _target: &str, _weights: StageWeights) -> TaskStatus {
        self.done("update_container")
    }
    fn send_boundary(&mut self, _container: &str, _stage: usize) -> TaskStatus {
        self.done("send_boundary")
    }
    fn receive_boundary(&mut self, _stage: usize) -> TaskStatus {
        self.receive("receive_boundary")
    }
    fn set_boundaries(&mut self, _container: &str) -> TaskStatus {
        self.done("set_boundaries")
    }
    fn clear_boundary(&mut self) -> TaskStatus {
        self.done("clear_boundary")
    }
    fn prolongate(&mut self, _container: &str) -> TaskStatus {
        self.done("prolongate")
    }
    fn apply_bc(&mut self, _container: &str) -> TaskStatus {
        self.done("apply_bc")
    }
    fn custom_bc(&mut self, _container: &str) -> TaskStatus {
        self.done("custom_bc")
    }
    fn fill_derived(&mut self, _container: &str) -> TaskStatus {
        self.done("fill_derived")
    }
    fn estimate_timestep(&mut self, _container: &str) -> TaskStatus {
        self.done("estimate_timestep")
    }
    fn check_refinement(&mut self, _container: &str) -> TaskStatus {
        self.done("check_refinement")
    }
}
