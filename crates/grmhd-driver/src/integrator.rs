//! Low-storage multi-stage integrators.
//!
//! Stage `s` (1-based) writes
//! `U_s = gam0 * U_base + gam1 * U_{s-1} + beta * dt * dUdt(U_{s-1})`.
//! The last stage writes back into the base container, so every step starts
//! and ends on `base`.

use std::fmt;
use std::str::FromStr;

use grmhd_mesh::BASE_CONTAINER;
use grmhd_physics::StageWeights;

use crate::error::ConfigError;

const RK1: [StageWeights; 1] = [StageWeights {
    gam0: 0.0,
    gam1: 1.0,
    beta: 1.0,
}];

const RK2: [StageWeights; 2] = [
    StageWeights {
        gam0: 0.0,
        gam1: 1.0,
        beta: 1.0,
    },
    StageWeights {
        gam0: 0.5,
        gam1: 0.5,
        beta: 0.5,
    },
];

const RK3: [StageWeights; 3] = [
    StageWeights {
        gam0: 0.0,
        gam1: 1.0,
        beta: 1.0,
    },
    StageWeights {
        gam0: 0.75,
        gam1: 0.25,
        beta: 0.25,
    },
    StageWeights {
        gam0: 1.0 / 3.0,
        gam1: 2.0 / 3.0,
        beta: 2.0 / 3.0,
    },
];

/// Available integration schemes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IntegratorKind {
    /// Forward Euler.
    Rk1,
    /// Two-stage strong-stability-preserving (Heun).
    #[default]
    Rk2,
    /// Three-stage strong-stability-preserving.
    Rk3,
}

impl IntegratorKind {
    /// Weights of every stage, first stage first.
    pub const fn weights(self) -> &'static [StageWeights] {
        match self {
            Self::Rk1 => &RK1,
            Self::Rk2 => &RK2,
            Self::Rk3 => &RK3,
        }
    }

    /// Number of stages.
    pub const fn nstages(self) -> usize {
        self.weights().len()
    }

    /// Weights of 1-based stage `stage`, if it exists.
    pub fn stage(self, stage: usize) -> Option<StageWeights> {
        stage
            .checked_sub(1)
            .and_then(|s| self.weights().get(s))
            .copied()
    }

    /// Container written by 1-based stage `stage` (`0` names the state
    /// the step starts from).
    pub fn stage_name(self, stage: usize) -> String {
        if stage == 0 || stage >= self.nstages() {
            BASE_CONTAINER.to_string()
        } else {
            stage.to_string()
        }
    }

    /// Name as accepted by `Driver/integrator`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rk1 => "rk1",
            Self::Rk2 => "rk2",
            Self::Rk3 => "rk3",
        }
    }
}

impl fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegratorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rk1" => Ok(Self::Rk1),
            "rk2" => Ok(Self::Rk2),
            "rk3" => Ok(Self::Rk3),
            _ => Err(ConfigError::UnknownIntegrator {
                name: s.to_string(),
            }),
        }
    }
}
