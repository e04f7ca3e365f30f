pub mod geometry;
pub(crate) mod logging;
pub(crate) mod ndarray_extensions;
pub mod transformation;

pub use ndarray_extensions::norm;
