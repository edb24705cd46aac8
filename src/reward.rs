//! Reward shaping and contact-based termination.

use std::collections::BTreeSet;

use nalgebra::DVector;

use crate::physics::Contact;

/// Coefficients of the locomotion reward
/// `-force * |tau|^2 + velocity * min(velocity_cap, v_x)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardCoeffs {
    pub force: f64,
    pub velocity: f64,
    pub velocity_cap: f64,
    /// Reported as the terminal reward when the robot falls.
    pub terminal: f64,
}

impl Default for RewardCoeffs {
    fn default() -> Self {
        Self { force: 4e-5, velocity: 0.3, velocity_cap: 4.0, terminal: 0.0 }
    }
}

impl RewardCoeffs {
    /// Reward for one control step given the generalized force and body-frame forward velocity.
    pub fn reward(&self, generalized_force: &DVector<f64>, forward_velocity: f64) -> f64 {
        -self.force * generalized_force.norm_squared()
            + self.velocity * self.velocity_cap.min(forward_velocity)
    }
}

/// Outcome of a termination check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Termination {
    pub terminal: bool,
    pub terminal_reward: f32,
}

impl Termination {
    pub const ONGOING: Termination = Termination { terminal: false, terminal_reward: 0.0 };
}

/// Bodies allowed to touch the ground. Contact on any other body ends the episode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FootContactSet {
    bodies: BTreeSet<usize>,
}

impl FootContactSet {
    pub fn new<I: IntoIterator<Item = usize>>(bodies: I) -> Self {
        Self { bodies: bodies.into_iter().collect() }
    }

    pub fn contains(&self, body: usize) -> bool { self.bodies.contains(&body) }

    pub fn len(&self) -> usize { self.bodies.len() }

    pub fn is_empty(&self) -> bool { self.bodies.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ { self.bodies.iter().copied() }

    /// First contact whose body is not a foot, if any.
    pub fn first_illegal<'a>(&self, contacts: &'a [Contact]) -> Option<&'a Contact> {
        contacts.iter().find(|c| !self.contains(c.local_body_index))
    }

    /// Terminal with `terminal_coeff` as reward on any non-foot contact, ongoing otherwise.
    pub fn evaluate(&self, contacts: &[Contact], terminal_coeff: f64) -> Termination {
        match self.first_illegal(contacts) {
            Some(contact) => {
                tracing::debug!(body = contact.local_body_index, "non-foot contact, episode terminal");
                Termination { terminal: true, terminal_reward: terminal_coeff as f32 }
            }
            None => Termination::ONGOING,
        }
    }
}
