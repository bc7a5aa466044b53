//! Data-parallel kernel dispatch over 2D/3D domains.
//!
//! Synthesizers never loop over cells themselves. They describe a pure per-cell
//! [`Kernel`] and hand it to the [`GridEvaluator`] held by a [`NoiseContext`].
//! The evaluator partitions the domain into fixed-size work-groups and runs
//! them on its substrate (rayon threads or wgpu compute).

mod cpu;
#[cfg(feature = "gpu")]
mod gpu;

use glam::UVec3;

pub use cpu::CpuEvaluator;
#[cfg(feature = "gpu")]
pub use gpu::GpuEvaluator;

use crate::error::{NoiseError, Result};
use crate::field::{Dimension, Domain, NoiseField};
use crate::noise::perlin::PerlinKernel;
use crate::noise::worley::WorleyKernel;

/// Work-group edge length (cells per axis)
pub const WORKGROUP_EDGE: u32 = 8;

/// Pure per-cell function: the output for a cell depends only on its coordinate
#[derive(Debug, Clone, Copy)]
pub enum Kernel<'a> {
    Perlin(PerlinKernel<'a>),
    Worley(WorleyKernel<'a>),
}

impl Kernel<'_> {
    #[inline]
    pub fn sample(&self, cell: UVec3) -> f32 {
        match self {
            Kernel::Perlin(k) => k.sample(cell),
            Kernel::Worley(k) => k.sample(cell),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Kernel::Perlin(_) => "perlin",
            Kernel::Worley(_) => "worley",
        }
    }
}

/// Execution substrate that maps a kernel over every cell of a domain.
///
/// Implementations may run cells in any order; kernels are pure so the result
/// never depends on scheduling. `dispatch` returns only once every cell has
/// been written.
pub trait GridEvaluator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Evaluate `kernel` at every cell, returning values in [`Domain::index`] order
    fn dispatch(&self, domain: Domain, kernel: &Kernel<'_>) -> Result<Vec<f32>>;
}

/// Ceiling-padded partition of a domain into work-groups
#[derive(Debug, Clone, Copy)]
pub struct WorkGroups {
    domain: Domain,
    edge: UVec3,
    counts: UVec3,
}

impl WorkGroups {
    pub fn new(domain: Domain, edge: u32) -> Self {
        let edge = match domain.dimension {
            Dimension::Two => UVec3::new(edge, edge, 1),
            Dimension::Three => UVec3::splat(edge),
        };
        let extent = domain.extent();
        let counts = (extent + edge - UVec3::ONE) / edge;
        Self {
            domain,
            edge,
            counts,
        }
    }

    /// Groups per axis
    pub fn counts(&self) -> UVec3 {
        self.counts
    }

    pub fn len(&self) -> usize {
        (self.counts.x * self.counts.y * self.counts.z) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// In-range cells of group `index`; padding cells past the domain edge are skipped
    pub fn cells(&self, index: usize) -> impl Iterator<Item = UVec3> {
        let c = self.counts;
        let group = UVec3::new(
            index as u32 % c.x,
            (index as u32 / c.x) % c.y,
            index as u32 / (c.x * c.y),
        );
        let origin = group * self.edge;
        let end = (origin + self.edge).min(self.domain.extent());
        (origin.z..end.z).flat_map(move |z| {
            (origin.y..end.y).flat_map(move |y| (origin.x..end.x).map(move |x| UVec3::new(x, y, z)))
        })
    }
}

/// Caller-owned generation context holding the dispatch substrate.
///
/// Build one up front and pass it by reference into every synthesizer call.
pub struct NoiseContext {
    evaluator: Box<dyn GridEvaluator>,
}

impl NoiseContext {
    /// Context backed by the rayon thread pool
    pub fn cpu() -> Self {
        Self::with_evaluator(Box::new(CpuEvaluator::default()))
    }

    /// Context backed by a wgpu compute device; kernels are compiled here once
    #[cfg(feature = "gpu")]
    pub fn gpu() -> Result<Self> {
        Ok(Self::with_evaluator(Box::new(GpuEvaluator::new()?)))
    }

    pub fn with_evaluator(evaluator: Box<dyn GridEvaluator>) -> Self {
        log::debug!("noise context using {} evaluator", evaluator.name());
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &dyn GridEvaluator {
        self.evaluator.as_ref()
    }

    /// Run `kernel` over `domain` and wrap the result as a field
    pub fn evaluate(&self, domain: Domain, kernel: &Kernel<'_>) -> Result<NoiseField> {
        domain.validate()?;
        log::debug!(
            "dispatch {} over {:?} on {}",
            kernel.label(),
            domain,
            self.evaluator.name()
        );
        let values = self.evaluator.dispatch(domain, kernel)?;
        if values.len() != domain.len() {
            return Err(NoiseError::Gpu(format!(
                "{} evaluator returned {} cells, expected {}",
                self.evaluator.name(),
                values.len(),
                domain.len()
            )));
        }
        NoiseField::from_values(domain, values)
    }
}

impl Default for NoiseContext {
    fn default() -> Self {
        Self::cpu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_partial_groups_cover_every_cell_once() {
        for domain in [Domain::square(13), Domain::cube(9), Domain::cube(8)] {
            let groups = WorkGroups::new(domain, WORKGROUP_EDGE);
            let mut seen = HashSet::new();
            for g in 0..groups.len() {
                for cell in groups.cells(g) {
                    assert!(cell.cmplt(domain.extent()).all());
                    assert!(seen.insert(domain.index(cell)), "cell {:?} visited twice", cell);
                }
            }
            assert_eq!(seen.len(), domain.len());
        }
    }

    #[test]
    fn test_group_edge_never_changes_result() {
        use crate::noise::{Perlin, Synthesizer, Worley};

        let contexts: Vec<NoiseContext> = [1, 5, 8]
            .into_iter()
            .map(|edge| NoiseContext::with_evaluator(Box::new(CpuEvaluator::with_group_edge(edge))))
            .collect();
        let domain = Domain::cube(13);
        let synthesizers: [&dyn Synthesizer; 2] = [&Perlin, &Worley::default()];

        for synth in synthesizers {
            let fields: Vec<NoiseField> = contexts
                .iter()
                .map(|ctx| synth.evaluate(ctx, domain, 21, 3).unwrap())
                .collect();
            for field in &fields[1..] {
                let same = field
                    .values()
                    .iter()
                    .zip(fields[0].values())
                    .all(|(a, b)| a.to_bits() == b.to_bits());
                assert!(same, "{} differs across group edges", synth.name());
            }
        }
    }

    #[test]
    fn test_group_counts_round_up() {
        assert_eq!(
            WorkGroups::new(Domain::square(17), 8).counts(),
            UVec3::new(3, 3, 1)
        );
        assert_eq!(WorkGroups::new(Domain::cube(16), 8).counts(), UVec3::splat(2));
    }
}
