//! Observation assembly from the generalized state.
//!
//! Layout, for `n` joints (`1 + 3 + 3 + 3 + 2n` entries):
//!
//! | range            | content                                         |
//! |------------------|-------------------------------------------------|
//! | `0`              | base height                                     |
//! | `1..4`           | third row of the base rotation matrix           |
//! | `4..4+n`         | joint angles                                    |
//! | `4+n..7+n`       | base linear velocity in the body frame          |
//! | `7+n..10+n`      | base angular velocity in the body frame         |
//! | `10+n..10+2n`    | joint velocities                                |

use nalgebra::{DVector, Quaternion, Rotation3, UnitQuaternion, Vector3};

use crate::state::GeneralizedState;

/// Observation length for a model with `n_joints` actuated joints.
pub fn ob_dim(n_joints: usize) -> usize { 1 + 3 + 3 + 3 + 2 * n_joints }

/// Rotation taking body-frame vectors into the world frame, from a `[w, x, y, z]` quaternion.
pub fn base_rotation(quat: [f64; 4]) -> Rotation3<f64> {
    let [w, x, y, z] = quat;
    UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)).to_rotation_matrix()
}

/// Observation vector plus the body-frame base twist it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub values: DVector<f64>,
    pub body_linear_velocity: Vector3<f64>,
    pub body_angular_velocity: Vector3<f64>,
}

impl Observation {
    pub fn zeros(ob_dim: usize) -> Self {
        Self {
            values: DVector::zeros(ob_dim),
            body_linear_velocity: Vector3::zeros(),
            body_angular_velocity: Vector3::zeros(),
        }
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Forward velocity of the base, the body-frame `x` component.
    pub fn forward_velocity(&self) -> f64 { self.body_linear_velocity.x }

    /// Copy the observation into a single-precision buffer.
    pub fn write_f32(&self, out: &mut [f32]) {
        assert_eq!(out.len(), self.values.len(), "observation buffer length must equal obDim");
        for (o, &v) in out.iter_mut().zip(self.values.iter()) {
            *o = v as f32;
        }
    }

    pub fn to_f32_vec(&self) -> Vec<f32> { self.values.iter().map(|&v| v as f32).collect() }
}

/// Builds observations for a fixed joint count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObservationBuilder {
    n_joints: usize,
}

impl ObservationBuilder {
    pub fn new(n_joints: usize) -> Self { Self { n_joints } }

    pub fn ob_dim(&self) -> usize { ob_dim(self.n_joints) }

    pub fn build(&self, state: &GeneralizedState) -> Observation {
        let mut ob = Observation::zeros(self.ob_dim());
        self.build_into(state, &mut ob);
        ob
    }

    /// Rebuild `ob` in place from `state`.
    pub fn build_into(&self, state: &GeneralizedState, ob: &mut Observation) {
        let n = self.n_joints;
        assert_eq!(state.n_joints(), n, "state joint count must match the builder");
        assert_eq!(ob.values.len(), self.ob_dim(), "observation buffer length must equal obDim");

        let rot = base_rotation(state.base_quaternion());
        let rot_t = rot.transpose();
        let v = &state.velocities;
        ob.body_linear_velocity = rot_t * Vector3::new(v[0], v[1], v[2]);
        ob.body_angular_velocity = rot_t * Vector3::new(v[3], v[4], v[5]);

        let m = rot.matrix();
        let out = ob.values.as_mut_slice();
        out[0] = state.base_height();
        out[1] = m[(2, 0)];
        out[2] = m[(2, 1)];
        out[3] = m[(2, 2)];
        out[4..4 + n].copy_from_slice(state.joint_angles());
        out[4 + n..7 + n].copy_from_slice(ob.body_linear_velocity.as_slice());
        out[7 + n..10 + n].copy_from_slice(ob.body_angular_velocity.as_slice());
        out[10 + n..10 + 2 * n].copy_from_slice(state.joint_velocities());
    }
}
