//! Toroidally addressed lattice storage for per-cell random values.
//!
//! Both synthesizers hang their randomness off a [`WrapGrid`]: Perlin stores one
//! gradient per lattice vertex, Worley one feature-point offset per cell. Every
//! lookup wraps with a mathematical modulo so neighbor searches at negative
//! offsets land on the opposite edge and the resulting field tiles.

use glam::{IVec3, UVec3, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::field::Dimension;

/// Reduce `c` into `[0, size)`, wrapping negatives onto the far edge
#[inline]
pub fn wrap(c: i32, size: i32) -> i32 {
    c.rem_euclid(size)
}

/// Fixed-size 2D or 3D array addressed with wrap-around coordinates.
///
/// A 2D grid is a 3D grid with depth 1, so the z coordinate of every lookup
/// collapses to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapGrid<V> {
    extent: IVec3,
    cells: Vec<V>,
}

impl<V: Copy> WrapGrid<V> {
    /// Build a grid by calling `fill` once per cell, z outermost and x innermost.
    ///
    /// Panics if the extent is zero on any axis or holds more than `i32::MAX`
    /// cells; synthesizers reject such lattices before building them.
    pub fn from_fn(extent: UVec3, mut fill: impl FnMut(UVec3) -> V) -> Self {
        assert!(
            extent.min_element() > 0,
            "wrap grid extent must be positive"
        );
        let len = extent.x as usize * extent.y as usize * extent.z as usize;
        assert!(
            len <= i32::MAX as usize,
            "wrap grid of {} cells exceeds the addressable size",
            len
        );
        let mut cells = Vec::with_capacity(len);
        for z in 0..extent.z {
            for y in 0..extent.y {
                for x in 0..extent.x {
                    cells.push(fill(UVec3::new(x, y, z)));
                }
            }
        }
        Self {
            extent: extent.as_ivec3(),
            cells,
        }
    }

    pub fn extent(&self) -> UVec3 {
        self.extent.as_uvec3()
    }

    /// Cells in storage order (x fastest)
    pub fn cells(&self) -> &[V] {
        &self.cells
    }

    #[inline]
    fn slot(&self, coord: IVec3) -> usize {
        let x = wrap(coord.x, self.extent.x);
        let y = wrap(coord.y, self.extent.y);
        let z = wrap(coord.z, self.extent.z);
        (x + y * self.extent.x + z * self.extent.x * self.extent.y) as usize
    }

    #[inline]
    pub fn get(&self, coord: IVec3) -> V {
        self.cells[self.slot(coord)]
    }

    pub fn set(&mut self, coord: IVec3, value: V) {
        let slot = self.slot(coord);
        self.cells[slot] = value;
    }
}

fn lattice_extent(dimension: Dimension, cells_per_axis: u32) -> UVec3 {
    match dimension {
        Dimension::Two => UVec3::new(cells_per_axis, cells_per_axis, 1),
        Dimension::Three => UVec3::splat(cells_per_axis),
    }
}

fn seeded_rng(seed: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed as i64 as u64)
}

/// Lattice of axis-aligned ±1 gradients, one per vertex.
///
/// Components are drawn x, y (, z) per cell; in 2D the z component is 0.
pub fn gradient_grid(dimension: Dimension, cells_per_axis: u32, seed: i32) -> WrapGrid<Vec3> {
    let mut rng = seeded_rng(seed);
    let mut sign = move || {
        if rng.gen_range(-1.0f32..1.0) < 0.0 {
            -1.0
        } else {
            1.0
        }
    };
    WrapGrid::from_fn(lattice_extent(dimension, cells_per_axis), |_| {
        match dimension {
            Dimension::Two => {
                let x = sign();
                let y = sign();
                Vec3::new(x, y, 0.0)
            }
            Dimension::Three => {
                let x = sign();
                let y = sign();
                let z = sign();
                Vec3::new(x, y, z)
            }
        }
    })
}

/// One feature point per cell, stored as an offset in `[0,1)` from the cell origin.
pub fn feature_grid(dimension: Dimension, cells_per_axis: u32, seed: i32) -> WrapGrid<Vec3> {
    let mut rng = seeded_rng(seed);
    WrapGrid::from_fn(lattice_extent(dimension, cells_per_axis), |_| {
        match dimension {
            Dimension::Two => {
                let x: f32 = rng.gen();
                let y: f32 = rng.gen();
                Vec3::new(x, y, 0.0)
            }
            Dimension::Three => {
                let x: f32 = rng.gen();
                let y: f32 = rng.gen();
                let z: f32 = rng.gen();
                Vec3::new(x, y, z)
            }
        }
    })
}
