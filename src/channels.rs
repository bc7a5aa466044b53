//! Combining scalar fields: RGBA channel packing and additive blending.

use rayon::prelude::*;

use crate::error::{NoiseError, Result};
use crate::field::{Domain, MultiChannelVolume, NoiseField};

fn ensure_same_domain(expected: Domain, field: &NoiseField, label: &str) -> Result<()> {
    if field.domain() != expected {
        return Err(NoiseError::invalid(format!(
            "{} channel domain {:?} does not match {:?}",
            label,
            field.domain(),
            expected
        )));
    }
    Ok(())
}

/// Zip four fields into one RGBA volume; no blending between channels
pub fn pack(
    red: &NoiseField,
    green: &NoiseField,
    blue: &NoiseField,
    alpha: &NoiseField,
) -> Result<MultiChannelVolume> {
    let domain = red.domain();
    ensure_same_domain(domain, green, "green")?;
    ensure_same_domain(domain, blue, "blue")?;
    ensure_same_domain(domain, alpha, "alpha")?;

    let texels = (0..domain.len())
        .into_par_iter()
        .map(|i| {
            [
                red.values()[i],
                green.values()[i],
                blue.values()[i],
                alpha.values()[i],
            ]
        })
        .collect();
    Ok(MultiChannelVolume::from_texels(domain, texels))
}

/// Blend `overlay` into `base`: `(base * (1 - weight) + overlay * weight) * multiply`
pub fn blend(
    base: &NoiseField,
    overlay: &NoiseField,
    weight: f32,
    multiply: f32,
) -> Result<NoiseField> {
    ensure_same_domain(base.domain(), overlay, "overlay")?;
    if !weight.is_finite() || !multiply.is_finite() {
        return Err(NoiseError::invalid(format!(
            "blend weight {} and multiply {} must be finite",
            weight, multiply
        )));
    }

    let values = base
        .values()
        .par_iter()
        .zip(overlay.values().par_iter())
        .map(|(b, o)| (b * (1.0 - weight) + o * weight) * multiply)
        .collect();
    NoiseField::from_values(base.domain(), values)
}
