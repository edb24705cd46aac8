//! Physics engine adapter.
//!
//! The environment never integrates dynamics itself. A simulator backend
//! implements [`PhysicsWorld`] for a world holding a ground plane and exactly
//! one articulated robot, and the environment drives it through this trait.
//! Tests drive the environment against a scripted fake.

use std::path::Path;

use nalgebra::DVector;

use crate::core::Result;

/// How the articulated system turns commands into joint forces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMode {
    /// Feed-forward generalized force only.
    ForceAndTorque,
    /// Internal PD controller on position/velocity targets plus feed-forward force.
    PdPlusFeedforwardTorque,
}

/// A contact reported by the engine for the current configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// Index of the robot body taking part in the contact.
    pub local_body_index: usize,
}

impl Contact {
    pub fn new(local_body_index: usize) -> Self { Self { local_body_index } }
}

/// Capabilities the environment consumes from a rigid-body simulator.
///
/// Vectors are in generalized coordinates (`gc`, length
/// [`generalized_coordinate_dim`](PhysicsWorld::generalized_coordinate_dim))
/// or generalized velocities (`gv`, length
/// [`degrees_of_freedom`](PhysicsWorld::degrees_of_freedom)). The first seven
/// `gc` entries are the base position and `w, x, y, z` quaternion, the first six
/// `gv` entries are the base linear and angular velocity in the world frame.
pub trait PhysicsWorld {
    /// Load the articulated robot from a description file into the world.
    fn load_robot(&mut self, description: &Path) -> Result<()>;

    /// Name the robot so a visualizer can find it.
    fn set_robot_name(&mut self, name: &str);

    fn set_control_mode(&mut self, mode: ControlMode);

    fn add_ground(&mut self);

    fn generalized_coordinate_dim(&self) -> usize;

    fn degrees_of_freedom(&self) -> usize;

    /// Index of the named body, `None` when the model has no such body.
    fn body_index(&self, name: &str) -> Option<usize>;

    fn set_pd_gains(&mut self, p_gain: &DVector<f64>, d_gain: &DVector<f64>);

    fn set_generalized_force(&mut self, force: &DVector<f64>);

    fn set_state(&mut self, gc: &DVector<f64>, gv: &DVector<f64>);

    /// Copy the current state into the given buffers.
    fn get_state(&self, gc: &mut DVector<f64>, gv: &mut DVector<f64>);

    fn set_pd_target(&mut self, position_target: &DVector<f64>, velocity_target: &DVector<f64>);

    /// Generalized force applied during the last integration step.
    fn generalized_force(&self) -> DVector<f64>;

    fn contacts(&self) -> Vec<Contact>;

    fn set_time_step(&mut self, dt: f64);

    /// Advance the world by one fixed time step.
    fn integrate(&mut self);
}
