//! PD gains and the affine map from policy actions to joint-angle targets.

use nalgebra::DVector;

use crate::state::BASE_GV_DIM;

/// Proportional and derivative gains over all generalized velocities.
/// The base block is always zero: the floating base is not actuated.
#[derive(Clone, Debug, PartialEq)]
pub struct PdGains {
    pub p_gain: DVector<f64>,
    pub d_gain: DVector<f64>,
}

impl PdGains {
    /// Constant gains on every joint, zero on the base.
    ///
    /// # Panics
    /// When `gv_dim < 6`.
    pub fn uniform(gv_dim: usize, joint_p: f64, joint_d: f64) -> Self {
        assert!(gv_dim >= BASE_GV_DIM, "gains need gvDim >= 6 for the floating base, got {gv_dim}");
        let n_joints = gv_dim - BASE_GV_DIM;
        let mut p_gain = DVector::zeros(gv_dim);
        let mut d_gain = DVector::zeros(gv_dim);
        p_gain.rows_mut(BASE_GV_DIM, n_joints).fill(joint_p);
        d_gain.rows_mut(BASE_GV_DIM, n_joints).fill(joint_d);
        Self { p_gain, d_gain }
    }

    pub fn joint_p_gain(&self) -> &[f64] { &self.p_gain.as_slice()[BASE_GV_DIM..] }

    pub fn joint_d_gain(&self) -> &[f64] { &self.d_gain.as_slice()[BASE_GV_DIM..] }
}

/// Maps a normalized action into physical joint targets: `action * std + mean`.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionNormalizer {
    mean: DVector<f64>,
    std: DVector<f64>,
}

impl ActionNormalizer {
    /// Panics when lengths differ or any `std` entry is not strictly positive.
    pub fn new(mean: DVector<f64>, std: DVector<f64>) -> Self {
        assert_eq!(mean.len(), std.len(), "action mean and std must have the same length");
        for (i, &s) in std.iter().enumerate() {
            assert!(s > 0.0, "action std[{i}] must be > 0, got {s}");
        }
        Self { mean, std }
    }

    /// Mean at the given joint angles, the same `std` on every joint.
    pub fn centered_on(joint_angles: &[f64], std: f64) -> Self {
        let mean = DVector::from_column_slice(joint_angles);
        let std = DVector::from_element(joint_angles.len(), std);
        Self::new(mean, std)
    }

    pub fn dim(&self) -> usize { self.mean.len() }

    pub fn mean(&self) -> &DVector<f64> { &self.mean }

    pub fn std(&self) -> &DVector<f64> { &self.std }

    /// Write `action * std + mean` into `out`.
    pub fn denormalize_into(&self, action: &[f32], out: &mut [f64]) {
        assert_eq!(action.len(), self.dim(), "action length must equal actionDim");
        assert_eq!(out.len(), self.dim(), "output length must equal actionDim");
        for (i, o) in out.iter_mut().enumerate() {
            *o = action[i] as f64 * self.std[i] + self.mean[i];
        }
    }

    pub fn denormalize(&self, action: &[f32]) -> Vec<f64> {
        let mut out = vec![0.0; self.dim()];
        self.denormalize_into(action, &mut out);
        out
    }
}
