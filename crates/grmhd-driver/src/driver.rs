//! Multi-patch, multi-stage step driver.
//!
//! [`HarmDriver`] owns every patch of a [`MeshLayout`]. Each step registers
//! the stage containers, then runs one [`TaskRegion`] per integrator stage:
//! one task list per patch, polled in parallel until every list is
//! complete. A region is a barrier, so stage `s + 1` never starts on one
//! patch while stage `s` is still running on another.

use std::sync::Arc;
use std::time::Instant;

use grmhd_core::{Geometry, PatchId, StepId};
use grmhd_mesh::{Container, ContainerCollection, MeshLayout, BASE_CONTAINER};
use grmhd_physics::{interior_corners, max_corner_div_b, zone_widths, GammaLaw};
use grmhd_tasks::{RegionReport, SchedulerError, TaskList, TaskRegion};
use tracing::{debug, info};

use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::exchange::{BoundaryExchange, ChannelExchange};
use crate::metrics::StepMetrics;
use crate::patch::{Collaborators, PatchState, Shared};
use crate::stage::{build_initial, build_stage, StagePlan};

/// Initial data for one patch.
pub struct PatchSetup {
    /// Geometry over the patch, including its halo.
    pub geometry: Arc<dyn Geometry>,
    /// Starting state. Primitives and conserved variables must agree over
    /// the interior; ghost zones are filled by the driver.
    pub base: Container,
}

/// Steps a mesh of patches through the ideal-GRMHD update.
pub struct HarmDriver {
    config: DriverConfig,
    layout: MeshLayout,
    patches: Vec<PatchState>,
    time: f64,
    step: StepId,
    dt: f64,
    metrics: StepMetrics,
}

impl HarmDriver {
    /// Build a driver whose patches talk over in-process channels.
    ///
    /// # Errors
    ///
    /// See [`HarmDriver::with_exchanges`].
    pub fn new(
        config: DriverConfig,
        layout: MeshLayout,
        setups: Vec<PatchSetup>,
        collaborators: Collaborators,
    ) -> Result<Self, DriverError> {
        let exchanges = ChannelExchange::network(layout.num_patches())
            .into_iter()
            .map(|e| Box::new(e) as Box<dyn BoundaryExchange>)
            .collect();
        Self::with_exchanges(config, layout, setups, collaborators, exchanges)
    }

    /// Build a driver with one caller-supplied transport per patch, fill
    /// every ghost zone and estimate the first timestep.
    ///
    /// # Errors
    ///
    /// [`DriverError::Config`] if `config` is invalid,
    /// [`DriverError::PatchCount`] or [`DriverError::BoundsMismatch`] if the
    /// setups do not fit `layout`, and any error of the initial boundary
    /// fill or timestep estimate.
    pub fn with_exchanges(
        config: DriverConfig,
        layout: MeshLayout,
        setups: Vec<PatchSetup>,
        collaborators: Collaborators,
        exchanges: Vec<Box<dyn BoundaryExchange>>,
    ) -> Result<Self, DriverError> {
        config.validate()?;
        let expected = layout.num_patches();
        for got in [setups.len(), exchanges.len()] {
            if got != expected {
                return Err(DriverError::PatchCount { expected, got });
            }
        }

        let eos = GammaLaw::new(config.gamma).map_err(crate::error::ConfigError::from)?;
        let shared = Arc::new(Shared {
            eos,
            collab: collaborators,
            cfl: config.cfl,
            max_dt: config.max_dt,
        });

        let mut patches = Vec::with_capacity(expected);
        for ((id, setup), exchange) in layout.patches().zip(setups).zip(exchanges) {
            if setup.base.bounds() != layout.bounds() {
                return Err(DriverError::BoundsMismatch { patch: id });
            }
            let containers = ContainerCollection::with_base(setup.base);
            patches.push(PatchState::new(
                id,
                &layout,
                containers,
                exchange,
                setup.geometry,
                Arc::clone(&shared),
            ));
        }

        let mut driver = Self {
            config,
            layout,
            patches,
            time: 0.0,
            step: StepId(0),
            dt: 0.0,
            metrics: StepMetrics::default(),
        };

        let lists = driver
            .patches
            .iter()
            .map(|p| build_initial(format!("patch{}/init", p.id()), BASE_CONTAINER))
            .collect::<Result<Vec<_>, _>>()?;
        driver.run_region(lists)?;
        driver.dt = driver.mesh_dt()?;
        debug!(
            patches = driver.patches.len(),
            integrator = %driver.config.integrator,
            dt = driver.dt,
            "driver initialised"
        );
        Ok(driver)
    }

    /// Configuration in use.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Patch layout.
    pub fn layout(&self) -> &MeshLayout {
        &self.layout
    }

    /// Every patch, in id order.
    pub fn patches(&self) -> &[PatchState] {
        &self.patches
    }

    /// Mutable access to every patch, for hosts editing state between
    /// steps.
    pub fn patches_mut(&mut self) -> &mut [PatchState] {
        &mut self.patches
    }

    /// Patch by id.
    pub fn patch(&self, id: PatchId) -> Option<&PatchState> {
        self.patches.get(id.0 as usize)
    }

    /// Simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Steps completed.
    pub fn step_id(&self) -> StepId {
        self.step
    }

    /// Timestep the next step will take.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Metrics of the most recent step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Largest corner `|div B|` of the base state over every patch.
    ///
    /// # Errors
    ///
    /// [`DriverError::Mesh`] if a patch lost its base container.
    pub fn max_div_b(&self) -> Result<f64, DriverError> {
        let mut worst = 0.0_f64;
        for p in &self.patches {
            let base = p.containers().base()?;
            let d = max_corner_div_b(&base.cons, zone_widths(p.geometry()), &interior_corners(base.bounds()));
            if d.is_nan() {
                return Ok(f64::NAN);
            }
            worst = worst.max(d);
        }
        Ok(worst)
    }

    /// Advance every patch by one step of [`HarmDriver::dt`].
    ///
    /// # Errors
    ///
    /// [`DriverError::PatchFault`] if a task faulted,
    /// [`DriverError::Scheduler`] if a stage stalled without one, and
    /// [`DriverError::InvalidTimestep`] if the next estimate is not a
    /// positive finite number.
    pub fn step(&mut self) -> Result<&StepMetrics, DriverError> {
        let started = Instant::now();
        let kind = self.config.integrator;
        let nstages = kind.nstages();
        let dt = self.dt;

        let names: Vec<String> = (1..nstages).map(|s| kind.stage_name(s)).collect();
        for p in &mut self.patches {
            let id = p.id();
            p.begin_step(self.step, dt, names.iter().map(String::as_str))
                .map_err(|source| DriverError::PatchFault { patch: id, source })?;
        }

        let mut metrics = StepMetrics {
            dt,
            ..StepMetrics::default()
        };
        for (n, &weights) in kind.weights().iter().enumerate() {
            let stage = n + 1;
            let stage_started = Instant::now();
            let plan = StagePlan {
                stage,
                last: stage == nstages,
                weights,
                read: kind.stage_name(stage - 1),
                write: kind.stage_name(stage),
                adaptive: self.config.adaptive,
            };
            let lists = self
                .patches
                .iter()
                .map(|p| build_stage(format!("patch{}/stage{stage}", p.id()), &plan))
                .collect::<Result<Vec<_>, _>>()?;
            let report = self.run_region(lists)?;

            metrics.stage_us.push(stage_started.elapsed().as_micros() as u64);
            metrics.polls += report.polls;
            metrics.incomplete_polls += report.incomplete_polls;
            metrics.tasks_run += report.tasks_run;
        }
        metrics.failed_recoveries = self
            .patches
            .iter_mut()
            .map(PatchState::take_failed_recoveries)
            .sum();

        self.time += dt;
        self.step = self.step.next();
        self.dt = self.mesh_dt()?;
        metrics.total_us = started.elapsed().as_micros() as u64;

        info!(
            step = %self.step,
            time = self.time,
            dt,
            next_dt = self.dt,
            polls = metrics.polls,
            "step complete"
        );
        self.metrics = metrics;
        Ok(&self.metrics)
    }

    /// Step until the simulation time reaches `t_end`, shortening the last
    /// step to land on it. Returns the number of steps taken.
    ///
    /// # Errors
    ///
    /// Any error of [`HarmDriver::step`].
    pub fn run_until(&mut self, t_end: f64) -> Result<u64, DriverError> {
        let mut steps = 0;
        while self.time < t_end {
            let remaining = t_end - self.time;
            let last = self.dt >= remaining;
            if last {
                self.dt = remaining;
            }
            self.step()?;
            steps += 1;
            if last {
                self.time = t_end;
            }
        }
        Ok(steps)
    }

    fn run_region(&mut self, lists: Vec<TaskList<PatchState>>) -> Result<RegionReport, DriverError> {
        let mut region = TaskRegion::new(lists);
        region
            .execute(&mut self.patches, self.config.max_polls)
            .map_err(|e| self.explain_stall(e))
    }

    /// Attribute a stalled region to a recorded fault, if any.
    fn explain_stall(&self, e: SchedulerError) -> DriverError {
        match self.patches.iter().find_map(|p| p.fault().map(|f| (p.id(), f))) {
            Some((patch, source)) => DriverError::PatchFault {
                patch,
                source: source.clone(),
            },
            None => DriverError::Scheduler(e),
        }
    }

    fn mesh_dt(&self) -> Result<f64, DriverError> {
        let dt = self
            .patches
            .iter()
            .map(PatchState::new_dt)
            .fold(f64::INFINITY, |a, b| if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) });
        if dt > 0.0 && dt.is_finite() {
            Ok(dt)
        } else {
            Err(DriverError::InvalidTimestep { dt })
        }
    }
}
