//! Driver configuration, read from a [`ParameterInput`] and validated
//! before any container is built.

use grmhd_core::ParameterError;

use crate::error::ConfigError;
use crate::integrator::IntegratorKind;
use crate::params::ParameterInput;

/// Default Courant factor.
pub const DEFAULT_CFL: f64 = 0.9;

/// Default scheduler poll horizon per stage.
pub const DEFAULT_MAX_POLLS: u64 = 1_000_000;

/// Physics packages requested under the `Packages` block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Packages {
    /// Ideal GRMHD, the base package.
    pub grmhd: bool,
    /// Hydrodynamics without magnetic fields.
    pub grhd: bool,
    /// Electron heating.
    pub electrons: bool,
    /// Passive scalars.
    pub scalars: bool,
}

impl Default for Packages {
    fn default() -> Self {
        Self {
            grmhd: true,
            grhd: false,
            electrons: false,
            scalars: false,
        }
    }
}

/// Everything the step driver needs besides the mesh and collaborators.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    /// Adiabatic index of the gamma-law EOS.
    pub gamma: f64,
    /// Courant factor.
    pub cfl: f64,
    /// Cap on the timestep estimate.
    pub max_dt: f64,
    /// Time integration scheme.
    pub integrator: IntegratorKind,
    /// Requested physics packages.
    pub packages: Packages,
    /// Adds the prolongation and refinement-check tasks.
    pub adaptive: bool,
    /// Polling rounds allowed per stage before the driver gives up.
    pub max_polls: u64,
}

impl DriverConfig {
    /// Configuration with defaults for everything except `gamma`.
    pub fn new(gamma: f64) -> Self {
        Self {
            gamma,
            cfl: DEFAULT_CFL,
            max_dt: f64::INFINITY,
            integrator: IntegratorKind::default(),
            packages: Packages::default(),
            adaptive: false,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    /// Read every driver parameter, recording defaults for absent ones,
    /// then validate.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidParameter`] for missing or malformed values
    /// and any error from [`DriverConfig::validate`].
    pub fn from_params(p: &mut ParameterInput) -> Result<Self, ConfigError> {
        let gamma = p.get_real("GRMHD", "gamma")?;
        let cfl = p.get_or_add_real("GRMHD", "cfl", DEFAULT_CFL)?;
        let max_dt = p.get_or_add_real("GRMHD", "max_dt", f64::INFINITY)?;
        let integrator = p
            .get_or_add_string("Driver", "integrator", IntegratorKind::default().name())
            .parse()?;
        let packages = Packages {
            grmhd: p.get_or_add_bool("Packages", "GRMHD", true)?,
            grhd: p.get_or_add_bool("Packages", "GRHD", false)?,
            electrons: p.get_or_add_bool("Packages", "howes_electrons", false)?,
            scalars: p.get_or_add_bool("Packages", "scalars", false)?,
        };
        let adaptive = p.get_or_add_bool("Mesh", "refinement_adaptive", false)?;
        let raw_polls = p.get_or_add_int("Driver", "max_polls", DEFAULT_MAX_POLLS as i64)?;
        let max_polls = u64::try_from(raw_polls).map_err(|_| ParameterError::InvalidValue {
            block: "Driver".into(),
            key: "max_polls".into(),
            value: raw_polls.to_string(),
            expected: "non-negative integer",
        })?;

        let cfg = Self {
            gamma,
            cfl,
            max_dt,
            integrator,
            packages,
            adaptive,
            max_polls,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every structural invariant.
    ///
    /// # Errors
    ///
    /// The first violated invariant as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Adiabatic index finite and above one.
        if !self.gamma.is_finite() || self.gamma <= 1.0 {
            return Err(ParameterError::InvalidAdiabaticIndex { value: self.gamma }.into());
        }
        // 2. Courant factor in (0, 1].
        if !(self.cfl > 0.0 && self.cfl <= 1.0) {
            return Err(ConfigError::InvalidCfl { value: self.cfl });
        }
        // 3. Timestep cap positive (infinity allowed).
        if !(self.max_dt > 0.0) {
            return Err(ConfigError::InvalidMaxDt { value: self.max_dt });
        }
        // 4. GRMHD is the only base package this build provides.
        if self.packages.grhd {
            return Err(ConfigError::UnsupportedPackage { name: "GRHD" });
        }
        if !self.packages.grmhd {
            return Err(ConfigError::NoBasePackage);
        }
        // 5. Optional packages are not provided.
        if self.packages.electrons {
            return Err(ConfigError::UnsupportedPackage {
                name: "howes_electrons",
            });
        }
        if self.packages.scalars {
            return Err(ConfigError::UnsupportedPackage { name: "scalars" });
        }
        // 6. A stage must be allowed at least one polling round.
        if self.max_polls == 0 {
            return Err(ConfigError::ZeroPollHorizon);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParameterInput {
        ParameterInput::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn defaults_from_gamma_only() {
        let mut p = params(&[("GRMHD/gamma", "1.6666666666666667")]);
        let cfg = DriverConfig::from_params(&mut p).unwrap();
        assert_eq!(cfg, DriverConfig::new(5.0 / 3.0));
        assert!(p.contains("Packages", "GRHD"));
        assert!(p.contains("Mesh", "refinement_adaptive"));
    }

    #[test]
    fn gamma_is_required() {
        let mut p = ParameterInput::new();
        match DriverConfig::from_params(&mut p) {
            Err(ConfigError::InvalidParameter(ParameterError::MissingParameter { key, .. })) => {
                assert_eq!(key, "gamma");
            }
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }

    #[test]
    fn gamma_must_exceed_one() {
        for bad in [1.0, 0.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                DriverConfig::new(bad).validate(),
                Err(ConfigError::InvalidParameter(ParameterError::InvalidAdiabaticIndex { .. }))
            ));
        }
    }

    #[test]
    fn cfl_range() {
        let mut cfg = DriverConfig::new(1.4);
        cfg.cfl = 1.0;
        assert!(cfg.validate().is_ok());
        for bad in [0.0, -0.3, 1.5, f64::NAN] {
            cfg.cfl = bad;
            assert!(matches!(cfg.validate(), Err(ConfigError::InvalidCfl { .. })));
        }
    }

    #[test]
    fn package_rules() {
        let mut p = params(&[("GRMHD/gamma", "1.4"), ("Packages/GRMHD", "false")]);
        assert_eq!(DriverConfig::from_params(&mut p), Err(ConfigError::NoBasePackage));

        let mut p = params(&[("GRMHD/gamma", "1.4"), ("Packages/GRHD", "true")]);
        assert_eq!(
            DriverConfig::from_params(&mut p),
            Err(ConfigError::UnsupportedPackage { name: "GRHD" })
        );

        let mut cfg = DriverConfig::new(1.4);
        cfg.packages.scalars = true;
        assert_eq!(cfg.validate(), Err(ConfigError::UnsupportedPackage { name: "scalars" }));
    }

    #[test]
    fn driver_block() {
        let mut p = params(&[
            ("GRMHD/gamma", "1.4"),
            ("Driver/integrator", "rk3"),
            ("Driver/max_polls", "0"),
        ]);
        assert_eq!(DriverConfig::from_params(&mut p), Err(ConfigError::ZeroPollHorizon));

        p.set("Driver", "max_polls", 40);
        let cfg = DriverConfig::from_params(&mut p).unwrap();
        assert_eq!(cfg.integrator, IntegratorKind::Rk3);
        assert_eq!(cfg.max_polls, 40);

        p.set("Driver", "max_polls", -2);
        assert!(matches!(
            DriverConfig::from_params(&mut p),
            Err(ConfigError::InvalidParameter(ParameterError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn adaptivity_flag() {
        let mut p = params(&[("GRMHD/gamma", "1.4"), ("Mesh/refinement_adaptive", "true")]);
        assert!(DriverConfig::from_params(&mut p).unwrap().adaptive);
    }
}
