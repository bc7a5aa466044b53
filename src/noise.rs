//! Single-octave noise synthesizers.
//!
//! Provides lattice gradient noise ([`Perlin`]) and nearest-feature-point
//! noise ([`Worley`]). Both divide the domain into `frequency` cells per axis
//! (`cell_size = size / frequency`) and wrap their random lattice, so every
//! field they produce tiles seamlessly.

pub mod perlin;
pub mod worley;

pub use perlin::Perlin;
pub use worley::Worley;

use crate::dispatch::NoiseContext;
use crate::error::{NoiseError, Result};
use crate::field::{Domain, NoiseField};

/// Noise evaluator producing one field per `(domain, seed, frequency)`
pub trait Synthesizer: Sync {
    fn name(&self) -> &'static str;

    /// Evaluate one octave. Equal inputs always produce an identical field.
    fn evaluate(
        &self,
        ctx: &NoiseContext,
        domain: Domain,
        seed: i32,
        frequency: u32,
    ) -> Result<NoiseField>;
}

/// Validate the shared inputs and derive the cell edge length in texels.
///
/// The lattice holds `frequency^d` cells and is addressed with `i32`
/// arithmetic, so larger lattices are rejected.
pub(crate) fn cell_size(domain: Domain, frequency: u32) -> Result<f32> {
    domain.validate()?;
    if frequency < 1 {
        return Err(NoiseError::invalid("frequency must be >= 1"));
    }
    let lattice = frequency
        .checked_pow(domain.dimension.axes())
        .filter(|&cells| cells <= i32::MAX as u32);
    if lattice.is_none() {
        return Err(NoiseError::invalid(format!(
            "frequency {} gives a lattice too large for a {:?} domain",
            frequency, domain.dimension
        )));
    }
    Ok(domain.size as f32 / frequency as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_size_bounded() {
        assert!(cell_size(Domain::cube(8), 1024).is_ok());
        assert!(cell_size(Domain::cube(8), 2048).is_err());
        assert!(cell_size(Domain::square(8), 46_340).is_ok());
        assert!(matches!(
            cell_size(Domain::square(8), 65_536),
            Err(NoiseError::InvalidParameter(_))
        ));
    }
}
