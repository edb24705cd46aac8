//! Action and observation spaces.

pub mod space;
pub mod interop;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

pub use space::Space;

/// A box of `f32` vectors with per-dimension inclusive bounds and a length fixed at runtime.
/// Bounds may be infinite; only fully bounded boxes can be sampled.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxSpace {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl BoxSpace {
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Self {
        assert_eq!(low.len(), high.len(), "low and high must have the same length");
        for i in 0..low.len() {
            assert!(low[i] <= high[i], "low[{i}] > high[{i}]");
        }
        Self { low, high }
    }

    /// The whole real line on every one of `dim` dimensions.
    pub fn unbounded(dim: usize) -> Self {
        Self::new(vec![f32::NEG_INFINITY; dim], vec![f32::INFINITY; dim])
    }

    /// Whether every bound is finite.
    pub fn is_bounded(&self) -> bool {
        self.low.iter().chain(&self.high).all(|b| b.is_finite())
    }

    pub fn dim(&self) -> usize { self.low.len() }

    pub fn low(&self) -> &[f32] { &self.low }
    pub fn high(&self) -> &[f32] { &self.high }
}

impl Space for BoxSpace {
    type Element = Vec<f32>;

    /// Panics on a box with an infinite bound.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        assert!(self.is_bounded(), "cannot sample a box with infinite bounds");
        self.low
            .iter()
            .zip(&self.high)
            .map(|(&lo, &hi)| Uniform::new_inclusive(lo, hi).sample(rng))
            .collect()
    }

    fn contains(&self, elem: &Self::Element) -> bool {
        elem.len() == self.dim()
            && elem.iter().enumerate().all(|(i, &v)| self.low[i] <= v && v <= self.high[i])
    }
}
