//! Forward-points curves and their interpolation.

pub mod interpolator;
pub mod quote;
pub mod store;
pub mod tenor;
