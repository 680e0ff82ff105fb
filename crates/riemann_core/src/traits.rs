use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as sample coordinates.
/// Must support basic arithmetic, debug printing, and conversion from usize/f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}
