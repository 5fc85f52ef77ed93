//! Equation-of-state capability.

use grmhd_core::ParameterError;

/// Closes the fluid equations: pressure and sound speed from density and
/// internal energy.
///
/// Passed by reference into every kernel that needs it. Implementations do
/// not validate their inputs; a negative density yields whatever the
/// arithmetic yields.
pub trait EquationOfState: Send + Sync {
    /// Gas pressure.
    fn pressure(&self, rho: f64, u: f64) -> f64;

    /// Square of the relativistic sound speed.
    fn sound_speed_sq(&self, rho: f64, u: f64) -> f64;
}

/// Ideal gas, `p = (gamma - 1) u`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GammaLaw {
    gamma: f64,
}

impl GammaLaw {
    /// Gamma-law EOS with adiabatic index `gamma`.
    ///
    /// # Errors
    ///
    /// [`ParameterError::InvalidAdiabaticIndex`] unless `gamma` is finite and
    /// greater than one.
    pub fn new(gamma: f64) -> Result<Self, ParameterError> {
        if !gamma.is_finite() || gamma <= 1.0 {
            return Err(ParameterError::InvalidAdiabaticIndex { value: gamma });
        }
        Ok(Self { gamma })
    }

    /// The adiabatic index.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl EquationOfState for GammaLaw {
    #[inline]
    fn pressure(&self, _rho: f64, u: f64) -> f64 {
        (self.gamma - 1.0) * u
    }

    #[inline]
    fn sound_speed_sq(&self, rho: f64, u: f64) -> f64 {
        self.gamma * (self.gamma - 1.0) * u / (rho + self.gamma * u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_indices() {
        for g in [1.0, 0.5, -2.0, f64::NAN, f64::INFINITY] {
            assert!(GammaLaw::new(g).is_err(), "gamma {g} accepted");
        }
    }

    #[test]
    fn pressure_and_sound_speed() {
        let eos = GammaLaw::new(5.0 / 3.0).unwrap();
        assert!((eos.pressure(1.0, 1.5) - 1.0).abs() < 1e-14);
        // cs^2 = gamma p / (rho + u + p)
        let cs2 = eos.sound_speed_sq(1.0, 1.5);
        assert!((cs2 - (5.0 / 3.0) / 3.5).abs() < 1e-14);
    }

    #[test]
    fn sound_speed_stays_subluminal_when_hot() {
        let eos = GammaLaw::new(4.0 / 3.0).unwrap();
        let cs2 = eos.sound_speed_sq(1e-12, 1e6);
        assert!(cs2 < 1.0 / 3.0 + 1e-9);
    }
}
