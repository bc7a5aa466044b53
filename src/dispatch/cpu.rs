//! CPU substrate: work-groups scheduled on the rayon thread pool.

use rayon::prelude::*;

use super::{GridEvaluator, Kernel, WorkGroups, WORKGROUP_EDGE};
use crate::error::Result;
use crate::field::Domain;

/// Runs each work-group as one rayon task
#[derive(Debug, Clone, Copy)]
pub struct CpuEvaluator {
    group_edge: u32,
}

impl CpuEvaluator {
    pub fn with_group_edge(group_edge: u32) -> Self {
        Self {
            group_edge: group_edge.max(1),
        }
    }
}

impl Default for CpuEvaluator {
    fn default() -> Self {
        Self::with_group_edge(WORKGROUP_EDGE)
    }
}

impl GridEvaluator for CpuEvaluator {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn dispatch(&self, domain: Domain, kernel: &Kernel<'_>) -> Result<Vec<f32>> {
        let groups = WorkGroups::new(domain, self.group_edge);

        let blocks: Vec<Vec<(usize, f32)>> = (0..groups.len())
            .into_par_iter()
            .map(|g| {
                groups
                    .cells(g)
                    .map(|cell| (domain.index(cell), kernel.sample(cell)))
                    .collect()
            })
            .collect();

        let mut output = vec![0.0; domain.len()];
        for (index, value) in blocks.into_iter().flatten() {
            output[index] = value;
        }
        Ok(output)
    }
}
