//! Dense scalar and multi-channel fields over square or cubic domains.

use glam::UVec3;
use serde::{Deserialize, Serialize};

use crate::error::{NoiseError, Result};

/// Number of spatial axes in a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Two,
    Three,
}

impl Dimension {
    pub fn axes(self) -> u32 {
        match self {
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }
}

/// Square (2D) or cubic (3D) sampling domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    pub dimension: Dimension,
    /// Cells per axis
    pub size: u32,
}

impl Domain {
    /// Create a 2D domain of `size`×`size` cells
    pub fn square(size: u32) -> Self {
        Self {
            dimension: Dimension::Two,
            size,
        }
    }

    /// Create a 3D domain of `size`³ cells
    pub fn cube(size: u32) -> Self {
        Self {
            dimension: Dimension::Three,
            size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(NoiseError::invalid("domain size must be > 0"));
        }
        Ok(())
    }

    /// Extent per axis; the z extent of a 2D domain is 1
    pub fn extent(&self) -> UVec3 {
        match self.dimension {
            Dimension::Two => UVec3::new(self.size, self.size, 1),
            Dimension::Three => UVec3::splat(self.size),
        }
    }

    pub fn len(&self) -> usize {
        let e = self.extent();
        e.x as usize * e.y as usize * e.z as usize
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Linear index of a cell, x varying fastest
    #[inline]
    pub fn index(&self, cell: UVec3) -> usize {
        let s = self.size as usize;
        cell.x as usize + cell.y as usize * s + cell.z as usize * s * s
    }

    /// Inverse of [`Domain::index`]
    #[inline]
    pub fn coord(&self, index: usize) -> UVec3 {
        let s = self.size as usize;
        UVec3::new(
            (index % s) as u32,
            ((index / s) % s) as u32,
            (index / (s * s)) as u32,
        )
    }
}

/// Owned dense scalar field
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    domain: Domain,
    values: Vec<f32>,
}

impl NoiseField {
    /// Field with every cell set to zero
    pub fn zeros(domain: Domain) -> Self {
        Self {
            domain,
            values: vec![0.0; domain.len()],
        }
    }

    pub fn from_values(domain: Domain, values: Vec<f32>) -> Result<Self> {
        if values.len() != domain.len() {
            return Err(NoiseError::invalid(format!(
                "field has {} values but domain {:?} holds {}",
                values.len(),
                domain,
                domain.len()
            )));
        }
        Ok(Self { domain, values })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Value at a cell (z is ignored for 2D domains)
    pub fn get(&self, cell: UVec3) -> f32 {
        self.values[self.domain.index(cell)]
    }
}

/// Four independently generated fields stored as RGBA texels
#[derive(Debug, Clone, PartialEq)]
pub struct MultiChannelVolume {
    domain: Domain,
    texels: Vec<[f32; 4]>,
}

impl MultiChannelVolume {
    pub(crate) fn from_texels(domain: Domain, texels: Vec<[f32; 4]>) -> Self {
        debug_assert_eq!(texels.len(), domain.len());
        Self { domain, texels }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn texels(&self) -> &[[f32; 4]] {
        &self.texels
    }

    pub fn texels_mut(&mut self) -> &mut [[f32; 4]] {
        &mut self.texels
    }

    pub fn get(&self, cell: UVec3) -> [f32; 4] {
        self.texels[self.domain.index(cell)]
    }

    /// Copy one channel (0 = R … 3 = A) out as a scalar field
    pub fn channel(&self, channel: usize) -> NoiseField {
        NoiseField {
            domain: self.domain,
            values: self.texels.iter().map(|t| t[channel]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip_for_cube() {
        let domain = Domain::cube(5);
        let cell = UVec3::new(4, 1, 3);
        let index = domain.index(cell);
        assert_eq!(index, 4 + 5 + 3 * 25);
        assert_eq!(domain.coord(index), cell);
    }

    #[test]
    fn test_square_domain_has_unit_depth() {
        let domain = Domain::square(8);
        assert_eq!(domain.extent(), UVec3::new(8, 8, 1));
        assert_eq!(domain.len(), 64);
    }

    #[test]
    fn test_zero_size_domain_rejected() {
        assert!(matches!(
            Domain::cube(0).validate(),
            Err(NoiseError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_from_values_checks_length() {
        assert!(NoiseField::from_values(Domain::square(2), vec![0.0; 3]).is_err());
        assert!(NoiseField::from_values(Domain::square(2), vec![0.0; 4]).is_ok());
    }
}
