//! Gradient (Perlin) noise over a wrapped lattice of ±1 gradients.

use glam::{IVec3, UVec3, Vec2, Vec3};

use super::{cell_size, Synthesizer};
use crate::dispatch::{Kernel, NoiseContext};
use crate::error::Result;
use crate::field::{Dimension, Domain, NoiseField};
use crate::grid::{gradient_grid, WrapGrid};

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`
#[inline]
pub fn fade(t: f32) -> f32 {
    ((6.0 * t - 15.0) * t + 10.0) * t * t * t
}

#[inline]
fn lerp(a: f32, b: f32, w: f32) -> f32 {
    a + (b - a) * w
}

/// Perlin synthesizer; output is remapped from [-1, 1] to [0, 1]
#[derive(Debug, Clone, Copy, Default)]
pub struct Perlin;

impl Synthesizer for Perlin {
    fn name(&self) -> &'static str {
        "perlin"
    }

    fn evaluate(
        &self,
        ctx: &NoiseContext,
        domain: Domain,
        seed: i32,
        frequency: u32,
    ) -> Result<NoiseField> {
        let cell_size = cell_size(domain, frequency)?;
        let gradients = gradient_grid(domain.dimension, frequency, seed);
        let kernel = PerlinKernel {
            gradients: &gradients,
            cell_size,
            dimension: domain.dimension,
        };
        ctx.evaluate(domain, &Kernel::Perlin(kernel))
    }
}

/// Per-cell Perlin evaluation against a borrowed gradient lattice
#[derive(Debug, Clone, Copy)]
pub struct PerlinKernel<'a> {
    pub gradients: &'a WrapGrid<Vec3>,
    /// Lattice spacing in texels
    pub cell_size: f32,
    pub dimension: Dimension,
}

impl PerlinKernel<'_> {
    /// Noise at an integer texel, in [0, 1]
    pub fn sample(&self, cell: UVec3) -> f32 {
        let p = cell.as_vec3();
        let lattice = (p / self.cell_size).floor();
        let t = (p - lattice * self.cell_size) / self.cell_size;
        let base = lattice.as_ivec3();

        let v = match self.dimension {
            Dimension::Two => self.interpolate_2d(base, t.truncate()),
            Dimension::Three => self.interpolate_3d(base, t),
        };
        (v + 1.0) / 2.0
    }

    #[inline]
    fn dot2(&self, base: IVec3, corner: IVec3, t: Vec2) -> f32 {
        let g = self.gradients.get(base + corner).truncate();
        g.dot(t - corner.truncate().as_vec2())
    }

    #[inline]
    fn dot3(&self, base: IVec3, corner: IVec3, t: Vec3) -> f32 {
        self.gradients.get(base + corner).dot(t - corner.as_vec3())
    }

    // Corners are ordered x-major: d[cx*2 + cy]
    fn interpolate_2d(&self, base: IVec3, t: Vec2) -> f32 {
        let d0 = self.dot2(base, IVec3::new(0, 0, 0), t);
        let d1 = self.dot2(base, IVec3::new(0, 1, 0), t);
        let d2 = self.dot2(base, IVec3::new(1, 0, 0), t);
        let d3 = self.dot2(base, IVec3::new(1, 1, 0), t);

        let fx = fade(t.x);
        let fy = fade(t.y);
        lerp(lerp(d0, d1, fy), lerp(d2, d3, fy), fx)
    }

    // Corners are ordered x-major: d[cx*4 + cy*2 + cz]
    fn interpolate_3d(&self, base: IVec3, t: Vec3) -> f32 {
        let mut d = [0.0f32; 8];
        for (i, slot) in d.iter_mut().enumerate() {
            let corner = IVec3::new((i >> 2) as i32 & 1, (i >> 1) as i32 & 1, i as i32 & 1);
            *slot = self.dot3(base, corner, t);
        }

        let fx = fade(t.x);
        let fy = fade(t.y);
        let fz = fade(t.z);
        lerp(
            lerp(lerp(d[0], d[1], fz), lerp(d[2], d[3], fz), fy),
            lerp(lerp(d[4], d[5], fz), lerp(d[6], d[7], fz), fy),
            fx,
        )
    }
}
