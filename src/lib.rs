//! Cloudnoise library - tileable procedural noise for volumetric clouds

pub mod channels;
pub mod cli;
pub mod detail;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod field;
pub mod fractal;
pub mod grid;
pub mod noise;
pub mod normalize;
pub mod params;

pub use dispatch::NoiseContext;
pub use error::{NoiseError, Result};
pub use field::{Dimension, Domain, MultiChannelVolume, NoiseField};
