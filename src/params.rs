//! Generation parameters with documented ranges and defaults.
//!
//! Every knob that reaches the generators is defined here:
//! - Fractal (fBm) parameters shared by all channels
//! - Recipes for the cloud textures that bundle several fractal layers

mod detail;
mod fractal;

pub use detail::{DetailSettings, PerlinWorleySettings};
pub use fractal::FractalParameters;
