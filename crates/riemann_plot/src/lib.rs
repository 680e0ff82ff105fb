//! Native rendering of a `riemann_core::scene::Scene` through plotters.
pub mod camera;
pub mod error;
pub mod render;
