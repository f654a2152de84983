//! 2-D vector type used throughout the core.
//!
//! Addition, scaling and exact componentwise equality come from
//! [`glam::DVec2`] directly; [`VectorExt`] adds the operations whose
//! failure mode has to be explicit.

use crate::error::{SimError, SimResult};

/// Position, velocity and acceleration vectors.
pub type Vector2 = glam::DVec2;

pub trait VectorExt {
    /// Euclidean distance from `self` to `other`.
    fn distance_to(self, other: Vector2) -> f64;

    /// Unit vector in the direction of `self`.
    ///
    /// ### Errors
    /// [`SimError::DivisionByZero`] if the length is zero (or not finite),
    /// so NaN components never leak out.
    fn normalized(self) -> SimResult<Vector2>;
}

impl VectorExt for Vector2 {
    #[inline]
    fn distance_to(self, other: Vector2) -> f64 {
        let d = other - self;
        (d.x * d.x + d.y * d.y).sqrt()
    }

    fn normalized(self) -> SimResult<Vector2> {
        let n = self.length();
        if n == 0.0 || !n.is_finite() {
            return Err(SimError::DivisionByZero);
        }
        Ok(self / n)
    }
}
