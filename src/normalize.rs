//! Two-phase range normalization.
//!
//! Phase one reduces the whole field to its minimum and maximum. Phase two
//! rescales every cell with `(v - min) / (max - min)`. The rescale needs the
//! finished reduction, so the two phases never overlap.
//!
//! A constant field (`max == min`) rescales to all zeros.

use rayon::prelude::*;

use crate::field::{MultiChannelVolume, NoiseField};

/// Observed value range of a field or channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Identity of the min/max reduction
    pub const EMPTY: ValueRange = ValueRange {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    #[inline]
    fn include(self, v: f32) -> Self {
        Self {
            min: self.min.min(v),
            max: self.max.max(v),
        }
    }

    #[inline]
    fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// True when the range spans no values (constant or empty field)
    pub fn is_degenerate(&self) -> bool {
        !(self.max > self.min)
    }

    #[inline]
    pub fn rescale(&self, v: f32) -> f32 {
        if self.is_degenerate() {
            0.0
        } else {
            (v - self.min) / (self.max - self.min)
        }
    }
}

/// Reduction phase over a scalar slice
pub fn value_range(values: &[f32]) -> ValueRange {
    values
        .par_iter()
        .fold(|| ValueRange::EMPTY, |range, &v| range.include(v))
        .reduce(|| ValueRange::EMPTY, ValueRange::merge)
}

/// Reduction phase over every channel of an RGBA slice
pub fn channel_ranges(texels: &[[f32; 4]]) -> [ValueRange; 4] {
    texels
        .par_iter()
        .fold(
            || [ValueRange::EMPTY; 4],
            |mut ranges, texel| {
                for (range, &v) in ranges.iter_mut().zip(texel) {
                    *range = range.include(v);
                }
                ranges
            },
        )
        .reduce(
            || [ValueRange::EMPTY; 4],
            |mut a, b| {
                for (range, other) in a.iter_mut().zip(b) {
                    *range = range.merge(other);
                }
                a
            },
        )
}

/// Stretch a field to fill [0, 1]; returns the range observed before rescaling
pub fn normalize_field(field: &mut NoiseField) -> ValueRange {
    let range = value_range(field.values());
    log::debug!("normalize field: min={} max={}", range.min, range.max);

    field
        .values_mut()
        .par_iter_mut()
        .for_each(|v| *v = range.rescale(*v));
    range
}

/// Stretch every channel of a volume to fill [0, 1] independently
pub fn normalize_volume(volume: &mut MultiChannelVolume) -> [ValueRange; 4] {
    let ranges = channel_ranges(volume.texels());
    log::debug!("normalize volume channels: {:?}", ranges);

    volume.texels_mut().par_iter_mut().for_each(|texel| {
        for (v, range) in texel.iter_mut().zip(&ranges) {
            *v = range.rescale(*v);
        }
    });
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::pack;
    use crate::dispatch::NoiseContext;
    use crate::field::Domain;
    use crate::fractal::composite;
    use crate::noise::Perlin;
    use crate::params::FractalParameters;

    #[test]
    fn test_normalized_field_spans_unit_range() {
        let ctx = NoiseContext::cpu();
        let params = FractalParameters::new(2, 4, 0.5);
        let mut field = composite(&ctx, &Perlin, Domain::cube(16), 4, &params).unwrap();

        let before = normalize_field(&mut field);
        assert!(before.max > before.min);

        let after = value_range(field.values());
        assert!(after.min.abs() < 1e-6);
        assert!((after.max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_field_becomes_zero() {
        let domain = Domain::square(4);
        let mut field = NoiseField::from_values(domain, vec![0.3; 16]).unwrap();
        let range = normalize_field(&mut field);
        assert!(range.is_degenerate());
        assert!(field.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_volume_channels_normalized_independently() {
        let domain = Domain::square(2);
        let field = |values: Vec<f32>| NoiseField::from_values(domain, values).unwrap();
        let mut volume = pack(
            &field(vec![0.0, 0.5, 1.0, 2.0]),
            &field(vec![-4.0, -2.0, 0.0, 4.0]),
            &field(vec![0.7; 4]),
            &field(vec![0.25, 0.5, 0.5, 0.75]),
        )
        .unwrap();

        let ranges = normalize_volume(&mut volume);
        assert_eq!(ranges[1], ValueRange { min: -4.0, max: 4.0 });

        let t = volume.texels();
        assert_eq!(t[0], [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(t[3], [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(t[1][0], 0.25);
        assert_eq!(t[1][1], 0.25);
        assert_eq!(t[2][3], 0.5);
    }
}
