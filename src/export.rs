//! PNG writer for generated fields.
//!
//! 2D fields are written as-is. Volumes are written as a horizontal atlas of
//! z-slices (`size * depth` wide, `size` tall), slice 0 on the left.

use std::path::Path;

use image::{ImageBuffer, Luma, Rgba};

use crate::error::Result;
use crate::field::{MultiChannelVolume, NoiseField};

fn to_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * u8::MAX as f32).round() as u8
}

/// Write a scalar field as a 16-bit grayscale PNG
pub fn save_field_png(field: &NoiseField, path: impl AsRef<Path>) -> Result<()> {
    let extent = field.domain().extent();
    let (size, depth) = (extent.x, extent.z);
    let image = ImageBuffer::from_fn(size * depth, size, |px, py| {
        let cell = glam::UVec3::new(px % size, py, px / size);
        Luma([to_u16(field.get(cell))])
    });
    image.save(path.as_ref())?;
    log::info!(
        "wrote {}x{} grayscale atlas to {}",
        image.width(),
        image.height(),
        path.as_ref().display()
    );
    Ok(())
}

/// Write an RGBA volume as an 8-bit-per-channel PNG
pub fn save_volume_png(volume: &MultiChannelVolume, path: impl AsRef<Path>) -> Result<()> {
    let extent = volume.domain().extent();
    let (size, depth) = (extent.x, extent.z);
    let image = ImageBuffer::from_fn(size * depth, size, |px, py| {
        let cell = glam::UVec3::new(px % size, py, px / size);
        Rgba(volume.get(cell).map(to_u8))
    });
    image.save(path.as_ref())?;
    log::info!(
        "wrote {}x{} rgba atlas to {}",
        image.width(),
        image.height(),
        path.as_ref().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantization_clamps() {
        assert_eq!(to_u16(0.0), 0);
        assert_eq!(to_u16(1.0), u16::MAX);
        assert_eq!(to_u16(1.7), u16::MAX);
        assert_eq!(to_u8(-0.2), 0);
        assert_eq!(to_u8(0.5), 128);
    }
}
