//! Environment configuration.

use nalgebra::DVector;

use crate::core::{EnvError, Result};
use crate::reward::RewardCoeffs;

/// Construction-time settings of a [`WalkerEnv`](crate::env::WalkerEnv).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnvConfig {
    /// Seconds between two policy actions.
    pub control_dt: f64,
    /// Seconds per physics integration step.
    pub simulation_dt: f64,
    /// Scale applied to every action component before adding the mean.
    pub action_std: f64,
    pub joint_p_gain: f64,
    pub joint_d_gain: f64,
    /// Names of the bodies allowed to touch the ground.
    pub foot_bodies: Vec<String>,
    pub reward: RewardCoeffs,
    /// Half-width of the uniform joint-angle perturbation applied on reset.
    pub init_noise: f64,
    pub robot_name: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            control_dt: 0.01,
            simulation_dt: 0.0025,
            action_std: 0.3,
            joint_p_gain: 50.0,
            joint_d_gain: 0.2,
            foot_bodies: ["LF_SHANK", "RF_SHANK", "LH_SHANK", "RH_SHANK"]
                .into_iter()
                .map(String::from)
                .collect(),
            reward: RewardCoeffs::default(),
            init_noise: 0.0,
            robot_name: "robot".into(),
        }
    }
}

/// Reject a time step that is not a finite positive number.
pub fn check_time_step(dt: f64) -> Result<f64> {
    if dt.is_finite() && dt > 0.0 { Ok(dt) } else { Err(EnvError::InvalidTimeStep(dt)) }
}

impl EnvConfig {
    pub fn validate(&self) -> Result<()> {
        check_time_step(self.control_dt)?;
        check_time_step(self.simulation_dt)?;
        if !(self.action_std > 0.0) {
            return Err(EnvError::InvalidConfig(format!("action_std must be > 0, got {}", self.action_std)));
        }
        if self.foot_bodies.is_empty() {
            return Err(EnvError::InvalidConfig("foot_bodies must not be empty".into()));
        }
        if !(self.init_noise.is_finite() && self.init_noise >= 0.0) {
            return Err(EnvError::InvalidConfig(format!("init_noise must be finite and >= 0, got {}", self.init_noise)));
        }
        Ok(())
    }
}

/// Bulk override of the initial state, action normalization and PD gains.
///
/// Lengths must be `gcDim`, `gvDim`, `actionDim`, `actionDim`, `gvDim`, `gvDim`.
#[derive(Clone, Debug, PartialEq)]
pub struct InitConstants {
    pub init_positions: DVector<f64>,
    pub init_velocities: DVector<f64>,
    pub action_mean: DVector<f64>,
    pub action_std: DVector<f64>,
    pub p_gain: DVector<f64>,
    pub d_gain: DVector<f64>,
}

/// Number of control substeps per control step.
///
/// The ratio is truncated after adding a `1e-10` tolerance, so `0.01 / 0.0025`
/// gives four even when the division lands just below the integer. At least one
/// substep always runs.
pub fn substeps(control_dt: f64, simulation_dt: f64) -> usize {
    ((control_dt / simulation_dt + 1e-10) as usize).max(1)
}

/// Whether `control_dt` is a whole multiple (at least one) of `simulation_dt`.
pub fn is_whole_ratio(control_dt: f64, simulation_dt: f64) -> bool {
    let ratio = control_dt / simulation_dt;
    ratio + 1e-10 >= 1.0 && (ratio - ratio.round()).abs() < 1e-8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = EnvConfig::default();
        cfg.validate().expect("default config should validate");
        assert_eq!(cfg.foot_bodies.len(), 4);
        assert_eq!(substeps(cfg.control_dt, cfg.simulation_dt), 4);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut cfg = EnvConfig::default();
        cfg.simulation_dt = 0.0;
        assert!(matches!(cfg.validate(), Err(EnvError::InvalidTimeStep(_))));

        let mut cfg = EnvConfig::default();
        cfg.action_std = -0.3;
        assert!(matches!(cfg.validate(), Err(EnvError::InvalidConfig(_))));

        let mut cfg = EnvConfig::default();
        cfg.foot_bodies.clear();
        assert!(matches!(cfg.validate(), Err(EnvError::InvalidConfig(_))));

        let mut cfg = EnvConfig::default();
        cfg.init_noise = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = EnvConfig::default();
        cfg.init_noise = f64::INFINITY;
        assert!(matches!(cfg.validate(), Err(EnvError::InvalidConfig(_))));
    }

    #[test]
    fn substeps_tolerates_rounding_and_never_drops_to_zero() {
        assert_eq!(substeps(0.01, 0.001), 10);
        assert_eq!(substeps(0.3, 0.1), 3);
        assert_eq!(substeps(0.001, 0.01), 1);
        assert!(is_whole_ratio(0.3, 0.1));
        assert!(!is_whole_ratio(0.01, 0.003));
        assert!(!is_whole_ratio(0.001, 0.01));
    }
}
