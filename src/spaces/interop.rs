//! Optional conversions to `ndarray` for training loops built on it.

#[cfg(feature = "ndarray")]
pub mod ndarray_impl {
    use ndarray::Array1;

    use crate::observation::Observation;
    use crate::spaces::BoxSpace;

    /// Error type for conversions from ndarray with the wrong length.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct NdarrayShapeError {
        pub expected: usize,
        pub found: usize,
    }

    impl Observation {
        /// Single-precision copy of the observation.
        pub fn to_ndarray(&self) -> Array1<f32> {
            Array1::from_vec(self.to_f32_vec())
        }
    }

    impl BoxSpace {
        /// Convert an `ndarray::Array1<f32>` into an element of this space.
        pub fn element_from_ndarray(&self, arr: &Array1<f32>) -> Result<Vec<f32>, NdarrayShapeError> {
            if arr.len() != self.dim() {
                return Err(NdarrayShapeError { expected: self.dim(), found: arr.len() });
            }
            Ok(arr.to_vec())
        }
    }

}
