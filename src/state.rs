//! Generalized state and PD target buffers owned by one environment.

use nalgebra::DVector;

/// Base pose of the default stance: position `(0, 0, 0.5)` and identity orientation.
pub const DEFAULT_BASE_POSE: [f64; 7] = [0.0, 0.0, 0.50, 1.0, 0.0, 0.0, 0.0];

/// Crouched quadruped stance, three joints (hip abduction, hip flexion, knee) per leg
/// in LF, RF, LH, RH order.
pub const DEFAULT_JOINT_STANCE: [f64; 12] = [
    0.03, 0.4, -0.8,
    -0.03, 0.4, -0.8,
    0.03, -0.4, 0.8,
    -0.03, -0.4, 0.8,
];

/// Number of generalized-coordinate entries describing the floating base.
pub const BASE_GC_DIM: usize = 7;
/// Number of generalized-velocity entries describing the floating base.
pub const BASE_GV_DIM: usize = 6;

/// Generalized positions and velocities of the robot.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneralizedState {
    pub positions: DVector<f64>,
    pub velocities: DVector<f64>,
}

impl GeneralizedState {
    /// Zero state for a model with `gc_dim` coordinates and `gv_dim` velocities.
    pub fn zeros(gc_dim: usize, gv_dim: usize) -> Self {
        Self { positions: DVector::zeros(gc_dim), velocities: DVector::zeros(gv_dim) }
    }

    pub fn gc_dim(&self) -> usize { self.positions.len() }

    pub fn gv_dim(&self) -> usize { self.velocities.len() }

    pub fn n_joints(&self) -> usize { self.gv_dim() - BASE_GV_DIM }

    /// Base height in the world frame.
    pub fn base_height(&self) -> f64 { self.positions[2] }

    /// Base orientation quaternion as `[w, x, y, z]`.
    pub fn base_quaternion(&self) -> [f64; 4] {
        [self.positions[3], self.positions[4], self.positions[5], self.positions[6]]
    }

    pub fn joint_angles(&self) -> &[f64] { &self.positions.as_slice()[BASE_GC_DIM..] }

    pub fn joint_velocities(&self) -> &[f64] { &self.velocities.as_slice()[BASE_GV_DIM..] }
}

/// Default initial pose for a model with the given dimensions.
///
/// The joint block takes [`DEFAULT_JOINT_STANCE`] when the model has exactly
/// twelve joints and stays zero otherwise.
///
/// # Panics
/// When `gc_dim < 7` or `gv_dim < 6`, i.e. the model has no floating base.
pub fn default_init_pose(gc_dim: usize, gv_dim: usize) -> GeneralizedState {
    assert!(
        gc_dim >= BASE_GC_DIM && gv_dim >= BASE_GV_DIM,
        "floating-base model needs gcDim >= 7 and gvDim >= 6, got gcDim {gc_dim}, gvDim {gv_dim}"
    );
    let mut pose = GeneralizedState::zeros(gc_dim, gv_dim);
    pose.positions.rows_mut(0, BASE_GC_DIM).copy_from_slice(&DEFAULT_BASE_POSE);
    let n_joints = gc_dim - BASE_GC_DIM;
    if n_joints == DEFAULT_JOINT_STANCE.len() {
        pose.positions.rows_mut(BASE_GC_DIM, n_joints).copy_from_slice(&DEFAULT_JOINT_STANCE);
    } else {
        tracing::warn!(n_joints, "no default stance for this joint count, joints start at zero");
    }
    pose
}

/// PD targets pushed to the engine every control step.
///
/// Only the joint block of `position` is ever written; base entries and the
/// whole `velocity` vector stay zero.
#[derive(Clone, Debug, PartialEq)]
pub struct PdTarget {
    pub position: DVector<f64>,
    pub velocity: DVector<f64>,
}

impl PdTarget {
    pub fn zeros(gc_dim: usize, gv_dim: usize) -> Self {
        Self { position: DVector::zeros(gc_dim), velocity: DVector::zeros(gv_dim) }
    }

    pub fn joint_targets(&self) -> &[f64] { &self.position.as_slice()[BASE_GC_DIM..] }

    /// Joint block of the position target, the only part callers may write.
    pub fn joint_targets_mut(&mut self) -> &mut [f64] { &mut self.position.as_mut_slice()[BASE_GC_DIM..] }
}
