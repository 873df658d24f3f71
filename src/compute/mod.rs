//! Compute module - Frame geometry, rasterization and the spring simulation.

mod frame;
mod raster;
mod spring;
mod viewport;

pub use frame::*;
pub use raster::*;
pub use spring::*;
pub use viewport::*;
