//! Per-patch state and the task operations that run on it.
//!
//! A task that hits a container or transport error records a
//! [`TaskFault`] on its patch and reports itself incomplete; every later
//! task on that patch does the same. The stage then stalls and the driver
//! turns the recorded fault into [`DriverError::PatchFault`](crate::DriverError::PatchFault).

use std::sync::Arc;

use grmhd_core::{Direction, Geometry, PatchId, StepId, NPRIM};
use grmhd_mesh::{
    boundary_faces, ContainerCollection, MeshLayout, Neighbor, NeighborOffset, BASE_CONTAINER,
    DUDT_CONTAINER,
};
use grmhd_physics::{
    calculate_flux, estimate_timestep, flux_ct, flux_divergence, source_term, update_conserved, EquationOfState,
    GammaLaw, PrimitiveRecovery, Reconstruction, StageWeights,
};
use grmhd_tasks::TaskStatus;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::boundaries::{BoundaryFace, CustomBoundary, PhysicalBoundary};
use crate::error::TaskFault;
use crate::exchange::{BoundaryExchange, MessageKind, MessageTag};
use crate::refinement::{AmrTag, Refinement};
use crate::stage::HarmTasks;

/// Pluggable pieces of the stage graph.
pub struct Collaborators {
    /// Face-state reconstruction feeding the flux assembler.
    pub reconstruction: Box<dyn Reconstruction>,
    /// Conserved-to-primitive recovery after each stage.
    pub recovery: Box<dyn PrimitiveRecovery>,
    /// Boundary condition on faces without a neighbour.
    pub physical_bc: Box<dyn PhysicalBoundary>,
    /// Optional problem-specific hook after the physical boundaries.
    pub custom_bc: Option<Box<dyn CustomBoundary>>,
    /// Refinement hooks, only scheduled on adaptive meshes.
    pub refinement: Box<dyn Refinement>,
}

impl Collaborators {
    /// Donor-cell reconstruction, outflow boundaries, no custom hook and
    /// no refinement, around the given recovery.
    pub fn new(recovery: Box<dyn PrimitiveRecovery>) -> Self {
        Self {
            reconstruction: Box::new(grmhd_physics::DonorCell),
            recovery,
            physical_bc: Box::new(crate::boundaries::Outflow),
            custom_bc: None,
            refinement: Box::new(crate::refinement::NoRefinement),
        }
    }

    /// Replace the reconstruction.
    pub fn with_reconstruction(mut self, r: Box<dyn Reconstruction>) -> Self {
        self.reconstruction = r;
        self
    }

    /// Replace the physical boundary condition.
    pub fn with_physical_bc(mut self, bc: Box<dyn PhysicalBoundary>) -> Self {
        self.physical_bc = bc;
        self
    }

    /// Install a custom boundary hook.
    pub fn with_custom_bc(mut self, bc: Box<dyn CustomBoundary>) -> Self {
        self.custom_bc = Some(bc);
        self
    }

    /// Replace the refinement hooks.
    pub fn with_refinement(mut self, r: Box<dyn Refinement>) -> Self {
        self.refinement = r;
        self
    }
}

/// Read-only state shared by every patch.
pub(crate) struct Shared {
    pub(crate) eos: GammaLaw,
    pub(crate) collab: Collaborators,
    pub(crate) cfl: f64,
    pub(crate) max_dt: f64,
}

/// One patch: its containers, neighbours, transport and stage bookkeeping.
pub struct PatchState {
    id: PatchId,
    containers: ContainerCollection,
    neighbors: SmallVec<[Neighbor; 26]>,
    physical_faces: SmallVec<[BoundaryFace; 6]>,
    exchange: Box<dyn BoundaryExchange>,
    geometry: Arc<dyn Geometry>,
    shared: Arc<Shared>,
    step: StepId,
    dt: f64,
    flux_received: [bool; 3],
    buffers: Vec<Option<Vec<f64>>>,
    new_dt: f64,
    amr_tag: AmrTag,
    failed_recoveries: usize,
    fault: Option<TaskFault>,
}

impl PatchState {
    pub(crate) fn new(
        id: PatchId,
        layout: &MeshLayout,
        containers: ContainerCollection,
        exchange: Box<dyn BoundaryExchange>,
        geometry: Arc<dyn Geometry>,
        shared: Arc<Shared>,
    ) -> Self {
        let neighbors = layout.neighbors(id);
        let physical_faces = BoundaryFace::all()
            .filter(|f| layout.neighbor(id, NeighborOffset::face(f.dir, f.high)).is_none())
            .collect();
        Self {
            id,
            containers,
            buffers: vec![None; neighbors.len()],
            neighbors,
            physical_faces,
            exchange,
            geometry,
            shared,
            step: StepId(0),
            dt: 0.0,
            flux_received: [false; 3],
            new_dt: f64::INFINITY,
            amr_tag: AmrTag::Same,
            failed_recoveries: 0,
            fault: None,
        }
    }

    /// This patch's id.
    pub fn id(&self) -> PatchId {
        self.id
    }

    /// Registered containers.
    pub fn containers(&self) -> &ContainerCollection {
        &self.containers
    }

    /// Mutable access to the containers, for hosts setting up or
    /// inspecting state between steps.
    pub fn containers_mut(&mut self) -> &mut ContainerCollection {
        &mut self.containers
    }

    /// Neighbours in the layout.
    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    /// Outer faces with no neighbour.
    pub fn physical_faces(&self) -> &[BoundaryFace] {
        &self.physical_faces
    }

    /// Geometry of this patch.
    pub fn geometry(&self) -> &dyn Geometry {
        self.geometry.as_ref()
    }

    /// Timestep estimate from the last completed step.
    pub fn new_dt(&self) -> f64 {
        self.new_dt
    }

    /// Refinement tag from the last completed step.
    pub fn amr_tag(&self) -> AmrTag {
        self.amr_tag
    }

    /// Fault recorded by a task, if any.
    pub fn fault(&self) -> Option<&TaskFault> {
        self.fault.as_ref()
    }

    /// Make every stage container of `stage_names` and the rate buffer
    /// exist, and set the step the following stages belong to.
    pub(crate) fn begin_step<'a>(
        &mut self,
        step: StepId,
        dt: f64,
        stage_names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), TaskFault> {
        self.step = step;
        self.dt = dt;
        self.containers.add_like(DUDT_CONTAINER, BASE_CONTAINER)?;
        for name in stage_names {
            self.containers.add_like(name, BASE_CONTAINER)?;
        }
        Ok(())
    }

    /// Take the counter of failed recoveries since the last call.
    pub(crate) fn take_failed_recoveries(&mut self) -> usize {
        std::mem::take(&mut self.failed_recoveries)
    }

    fn tag(&self, stage: usize, kind: MessageKind) -> MessageTag {
        MessageTag {
            step: self.step,
            stage,
            kind,
        }
    }

    /// Run `f` unless a fault is already recorded; record any fault it
    /// returns.
    fn guard(&mut self, task: &str, f: impl FnOnce(&mut Self) -> Result<TaskStatus, TaskFault>) -> TaskStatus {
        if self.fault.is_some() {
            return TaskStatus::Incomplete;
        }
        match f(self) {
            Ok(status) => status,
            Err(e) => {
                warn!(patch = %self.id, task, error = %e, "task fault");
                self.fault = Some(e);
                TaskStatus::Incomplete
            }
        }
    }
}

impl HarmTasks for PatchState {
    fn start_receiving(&mut self) -> TaskStatus {
        self.flux_received = [false; 3];
        self.buffers.iter_mut().for_each(|b| *b = None);
        TaskStatus::Complete
    }

    fn calculate_flux(&mut self, container: &str, dir: Direction) -> TaskStatus {
        self.guard("calculate_flux", |p| {
            let c = p.containers.get_mut(container)?;
            let shared = &p.shared;
            calculate_flux(
                c,
                dir,
                p.geometry.as_ref(),
                &shared.eos,
                shared.collab.reconstruction.as_ref(),
            );
            Ok(TaskStatus::Complete)
        })
    }

    fn flux_ct(&mut self, container: &str) -> TaskStatus {
        self.guard("flux_ct", |p| {
            let c = p.containers.get_mut(container)?;
            let bounds = *c.bounds();
            flux_ct(&mut c.fluxes, &bounds);
            Ok(TaskStatus::Complete)
        })
    }

    fn send_flux_correction(&mut self, container: &str, stage: usize) -> TaskStatus {
        self.guard("send_flux_correction", |p| {
            let tag = p.tag(stage, MessageKind::FluxCorrection);
            let c = p.containers.get(container)?;
            for dir in Direction::ALL {
                let below = NeighborOffset::face(dir, false);
                let Some(to) = p.neighbors.iter().find(|n| n.offset == below) else {
                    continue;
                };
                let payload = c.flux(dir).pack(&boundary_faces(c.bounds(), dir, false));
                p.exchange.send(tag, to, payload)?;
            }
            Ok(TaskStatus::Complete)
        })
    }

    fn receive_flux_correction(&mut self, container: &str, stage: usize) -> TaskStatus {
        self.guard("receive_flux_correction", |p| {
            let tag = p.tag(stage, MessageKind::FluxCorrection);
            let c = p.containers.get_mut(container)?;
            for dir in Direction::ALL {
                if p.flux_received[dir.index()] {
                    continue;
                }
                let above = NeighborOffset::face(dir, true);
                let Some(from) = p.neighbors.iter().find(|n| n.offset == above) else {
                    p.flux_received[dir.index()] = true;
                    continue;
                };
                let Some(payload) = p.exchange.try_receive(tag, from) else {
                    continue;
                };
                let faces = boundary_faces(c.bounds(), dir, true);
                if !c.flux_mut(dir).unpack(&faces, &payload) {
                    return Err(TaskFault::PayloadSize {
                        from: from.patch,
                        expected: NPRIM * faces.len(),
                        got: payload.len(),
                    });
                }
                p.flux_received[dir.index()] = true;
            }
            Ok(if p.flux_received.iter().all(|&r| r) {
                TaskStatus::Complete
            } else {
                TaskStatus::Incomplete
            })
        })
    }

    fn flux_divergence(&mut self, container: &str) -> TaskStatus {
        self.guard("flux_divergence", |p| {
            let (src, dudt) = p.containers.pair_mut(container, DUDT_CONTAINER)?;
            flux_divergence(src, p.geometry.as_ref(), &mut dudt.cons);
            Ok(TaskStatus::Complete)
        })
    }

    fn source_term(&mut self, container: &str) -> TaskStatus {
        self.guard("source_term", |p| {
            let (src, dudt) = p.containers.pair_mut(container, DUDT_CONTAINER)?;
            source_term(src, p.geometry.as_ref(), &p.shared.eos, &mut dudt.cons);
            Ok(TaskStatus::Complete)
        })
    }

    fn update_container(&mut self, prev: &str, target: &str, weights: StageWeights) -> TaskStatus {
        self.guard("update_container", |p| {
            let base = p.containers.base()?.cons.clone();
            let prev = p.containers.get(prev)?.cons.clone();
            let (dudt, out) = p.containers.pair_mut(DUDT_CONTAINER, target)?;
            let interior = out.bounds().interior();
            update_conserved(&base, &prev, &dudt.cons, weights, p.dt, &interior, &mut out.cons);
            Ok(TaskStatus::Complete)
        })
    }

    fn send_boundary(&mut self, container: &str, stage: usize) -> TaskStatus {
        self.guard("send_boundary", |p| {
            let tag = p.tag(stage, MessageKind::Boundary);
            let c = p.containers.get(container)?;
            for to in &p.neighbors {
                let slab = to.offset.send_box(c.bounds());
                let mut payload = c.prims.pack(&slab);
                payload.extend(c.cons.pack(&slab));
                p.exchange.send(tag, to, payload)?;
            }
            Ok(TaskStatus::Complete)
        })
    }

    fn receive_boundary(&mut self, stage: usize) -> TaskStatus {
        self.guard("receive_boundary", |p| {
            let tag = p.tag(stage, MessageKind::Boundary);
            for (from, slot) in p.neighbors.iter().zip(p.buffers.iter_mut()) {
                if slot.is_none() {
                    *slot = p.exchange.try_receive(tag, from);
                }
            }
            Ok(if p.buffers.iter().all(Option::is_some) {
                TaskStatus::Complete
            } else {
                TaskStatus::Incomplete
            })
        })
    }

    fn set_boundaries(&mut self, container: &str) -> TaskStatus {
        self.guard("set_boundaries", |p| {
            let c = p.containers.get_mut(container)?;
            for (from, slot) in p.neighbors.iter().zip(&p.buffers) {
                let Some(buf) = slot else { continue };
                let ghost = from.offset.ghost_box(c.bounds());
                let half = NPRIM * ghost.len();
                let size_fault = || TaskFault::PayloadSize {
                    from: from.patch,
                    expected: 2 * half,
                    got: buf.len(),
                };
                if buf.len() != 2 * half {
                    return Err(size_fault());
                }
                let (prims, cons) = buf.split_at(half);
                if !(c.prims.unpack(&ghost, prims) && c.cons.unpack(&ghost, cons)) {
                    return Err(size_fault());
                }
            }
            Ok(TaskStatus::Complete)
        })
    }

    fn clear_boundary(&mut self) -> TaskStatus {
        self.buffers.iter_mut().for_each(|b| *b = None);
        TaskStatus::Complete
    }

    fn prolongate(&mut self, container: &str) -> TaskStatus {
        self.guard("prolongate", |p| {
            let c = p.containers.get_mut(container)?;
            p.shared.collab.refinement.prolongate(c);
            Ok(TaskStatus::Complete)
        })
    }

    fn apply_bc(&mut self, container: &str) -> TaskStatus {
        self.guard("apply_bc", |p| {
            let c = p.containers.get_mut(container)?;
            for &face in &p.physical_faces {
                p.shared.collab.physical_bc.apply(c, face);
            }
            Ok(TaskStatus::Complete)
        })
    }

    fn custom_bc(&mut self, container: &str) -> TaskStatus {
        self.guard("custom_bc", |p| {
            let c = p.containers.get_mut(container)?;
            if let Some(hook) = &p.shared.collab.custom_bc {
                hook.apply(c, &p.physical_faces);
            }
            Ok(TaskStatus::Complete)
        })
    }

    fn fill_derived(&mut self, container: &str) -> TaskStatus {
        self.guard("fill_derived", |p| {
            let c = p.containers.get_mut(container)?;
            let recovery: &dyn PrimitiveRecovery = p.shared.collab.recovery.as_ref();
            let eos: &dyn EquationOfState = &p.shared.eos;
            let failed = recovery.recover(c, p.geometry.as_ref(), eos);
            if failed > 0 {
                debug!(patch = %p.id, failed, recovery = recovery.name(), "primitive recovery failed in some zones");
            }
            p.failed_recoveries += failed;
            Ok(TaskStatus::Complete)
        })
    }

    fn estimate_timestep(&mut self, container: &str) -> TaskStatus {
        self.guard("estimate_timestep", |p| {
            let c = p.containers.get(container)?;
            p.new_dt = estimate_timestep(
                &c.ctop,
                c.bounds(),
                p.geometry.as_ref(),
                p.shared.cfl,
                p.shared.max_dt,
            );
            Ok(TaskStatus::Complete)
        })
    }

    fn check_refinement(&mut self, container: &str) -> TaskStatus {
        self.guard("check_refinement", |p| {
            let c = p.containers.get(container)?;
            p.amr_tag = p.shared.collab.refinement.check(c);
            Ok(TaskStatus::Complete)
        })
    }
}
