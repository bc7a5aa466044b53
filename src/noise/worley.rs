//! Cellular (Worley) noise: distance to the nearest feature point.

use glam::{IVec3, UVec3, Vec3};

use super::{cell_size, Synthesizer};
use crate::dispatch::{Kernel, NoiseContext};
use crate::error::Result;
use crate::field::{Dimension, Domain, NoiseField};
use crate::grid::{feature_grid, WrapGrid};

/// Worley synthesizer.
///
/// Values are the nearest feature distance divided by the cell size, capped at
/// 1. With `invert` set the field is flipped to `1 - v` after evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Worley {
    pub invert: bool,
}

impl Worley {
    pub fn inverted() -> Self {
        Self { invert: true }
    }
}

impl Synthesizer for Worley {
    fn name(&self) -> &'static str {
        if self.invert {
            "worley-inverted"
        } else {
            "worley"
        }
    }

    fn evaluate(
        &self,
        ctx: &NoiseContext,
        domain: Domain,
        seed: i32,
        frequency: u32,
    ) -> Result<NoiseField> {
        let cell_size = cell_size(domain, frequency)?;
        let features = feature_grid(domain.dimension, frequency, seed);
        let kernel = WorleyKernel {
            features: &features,
            cell_size,
            dimension: domain.dimension,
        };
        let mut field = ctx.evaluate(domain, &Kernel::Worley(kernel))?;
        if self.invert {
            for v in field.values_mut() {
                *v = 1.0 - *v;
            }
        }
        Ok(field)
    }
}

/// Per-cell nearest-feature search against a borrowed feature lattice
#[derive(Debug, Clone, Copy)]
pub struct WorleyKernel<'a> {
    pub features: &'a WrapGrid<Vec3>,
    pub cell_size: f32,
    pub dimension: Dimension,
}

impl WorleyKernel<'_> {
    /// Texel position of the feature point owned by lattice cell `cell`.
    ///
    /// Points are snapped down to the texel lattice so each one is a sampleable
    /// texel of the domain.
    #[inline]
    pub fn feature_point(&self, cell: IVec3) -> Vec3 {
        let origin = cell.as_vec3() * self.cell_size;
        (origin + self.features.get(cell) * self.cell_size).floor()
    }

    /// Distance to the nearest feature point over the 3^d neighborhood, in [0, 1]
    pub fn sample(&self, cell: UVec3) -> f32 {
        let p = cell.as_vec3();
        let home = (p / self.cell_size).floor().as_ivec3();
        let depth = match self.dimension {
            Dimension::Two => 0,
            Dimension::Three => 1,
        };

        let mut nearest = f32::INFINITY;
        for dz in -depth..=depth {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let point = self.feature_point(home + IVec3::new(dx, dy, dz));
                    nearest = nearest.min(p.distance(point));
                }
            }
        }
        (nearest / self.cell_size).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_2d_scenario() {
        let ctx = NoiseContext::cpu();
        let field = Worley::default()
            .evaluate(&ctx, Domain::square(16), 7, 4)
            .unwrap();

        for &v in field.values() {
            assert!((0.0..=1.0).contains(&v), "value {} out of range", v);
        }
        assert!(field.values().iter().any(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_at_every_feature_point() {
        let ctx = NoiseContext::cpu();
        for domain in [Domain::square(16), Domain::cube(12)] {
            let frequency = 4;
            let field = Worley::default().evaluate(&ctx, domain, 21, frequency).unwrap();

            let features = feature_grid(domain.dimension, frequency, 21);
            let kernel = WorleyKernel {
                features: &features,
                cell_size: domain.size as f32 / frequency as f32,
                dimension: domain.dimension,
            };
            let e = features.extent();
            for z in 0..e.z {
                for y in 0..e.y {
                    for x in 0..e.x {
                        let point = kernel.feature_point(IVec3::new(x as i32, y as i32, z as i32));
                        assert_eq!(field.get(point.as_uvec3()), 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_one_zero_per_lattice_cell() {
        let ctx = NoiseContext::cpu();
        let domain = Domain::square(16);
        let field = Worley::default().evaluate(&ctx, domain, 3, 2).unwrap();
        let zeros = field.values().iter().filter(|&&v| v == 0.0).count();
        assert_eq!(zeros, 4);
    }

    #[test]
    fn test_inversion() {
        let ctx = NoiseContext::cpu();
        let domain = Domain::cube(8);
        let plain = Worley::default().evaluate(&ctx, domain, 5, 2).unwrap();
        let inverted = Worley::inverted().evaluate(&ctx, domain, 5, 2).unwrap();
        for (a, b) in plain.values().iter().zip(inverted.values()) {
            assert_eq!(1.0 - a, *b);
        }
    }

    #[test]
    fn test_deterministic() {
        let ctx = NoiseContext::cpu();
        let domain = Domain::cube(10);
        let a = Worley::default().evaluate(&ctx, domain, -8, 3).unwrap();
        let b = Worley::default().evaluate(&ctx, domain, -8, 3).unwrap();
        assert_eq!(a, b);
    }
}
