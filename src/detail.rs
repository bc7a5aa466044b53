//! Cloud texture recipes built from fractal Perlin and Worley layers.

use crate::channels::{blend, pack};
use crate::dispatch::NoiseContext;
use crate::error::Result;
use crate::field::{Domain, MultiChannelVolume, NoiseField};
use crate::fractal::composite;
use crate::noise::{Perlin, Worley};
use crate::normalize::{normalize_field, normalize_volume};
use crate::params::{DetailSettings, PerlinWorleySettings};

/// Generate the 2D Perlin-Worley texture, normalized to [0, 1]
pub fn perlin_worley(ctx: &NoiseContext, settings: &PerlinWorleySettings) -> Result<NoiseField> {
    settings.validate()?;
    let domain = Domain::square(settings.resolution);
    let worley = Worley {
        invert: settings.invert_worley,
    };

    log::info!(
        "perlin-worley {}x{} seed={}",
        settings.resolution,
        settings.resolution,
        settings.seed
    );
    let perlin_layer = composite(ctx, &Perlin, domain, settings.seed, &settings.perlin)?;
    let worley_layer = composite(
        ctx,
        &worley,
        domain,
        settings.seed.wrapping_add(1),
        &settings.worley,
    )?;

    let mut field = blend(
        &perlin_layer,
        &worley_layer,
        settings.blend,
        settings.multiply,
    )?;
    normalize_field(&mut field);
    Ok(field)
}

/// Generate the RGBA cloud detail volume, each channel normalized to [0, 1]
pub fn cloud_detail_volume(
    ctx: &NoiseContext,
    settings: &DetailSettings,
) -> Result<MultiChannelVolume> {
    settings.validate()?;
    let domain = Domain::cube(settings.resolution);
    let seed = settings.seed;
    let worley = Worley::default();

    log::info!(
        "cloud detail volume {}^3 seed={}",
        settings.resolution,
        seed
    );

    let red = {
        let perlin_layer = composite(ctx, &Perlin, domain, seed, &settings.red_perlin)?;
        let red_worley = Worley {
            invert: settings.invert_worley,
        };
        let worley_layer = composite(
            ctx,
            &red_worley,
            domain,
            seed.wrapping_add(1),
            &settings.red_worley,
        )?;
        blend(&perlin_layer, &worley_layer, settings.red_blend, 1.0)?
    };
    log::info!("red channel done");

    let green = composite(ctx, &worley, domain, seed.wrapping_add(2), &settings.green)?;
    let blue = composite(ctx, &worley, domain, seed.wrapping_add(3), &settings.blue)?;
    let alpha = composite(ctx, &worley, domain, seed.wrapping_add(4), &settings.alpha)?;
    log::info!("worley channels done");

    let mut volume = pack(&red, &green, &blue, &alpha)?;
    let ranges = normalize_volume(&mut volume);
    log::info!("channel ranges before normalization: {:?}", ranges);
    Ok(volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{channel_ranges, value_range};
    use crate::params::FractalParameters;

    fn small_detail() -> DetailSettings {
        DetailSettings {
            resolution: 16,
            seed: 3,
            red_perlin: FractalParameters::new(2, 3, 0.5),
            red_worley: FractalParameters::new(2, 2, 0.5),
            green: FractalParameters::new(2, 2, 0.5),
            blue: FractalParameters::new(4, 2, 0.5),
            alpha: FractalParameters::new(8, 1, 0.5),
            ..DetailSettings::default()
        }
    }

    #[test]
    fn test_detail_channels_span_unit_range() {
        let ctx = NoiseContext::cpu();
        let volume = cloud_detail_volume(&ctx, &small_detail()).unwrap();
        assert_eq!(volume.domain(), Domain::cube(16));

        for range in channel_ranges(volume.texels()) {
            assert!(range.min.abs() < 1e-6, "min {}", range.min);
            assert!((range.max - 1.0).abs() < 1e-6, "max {}", range.max);
        }
    }

    #[test]
    fn test_detail_channels_use_distinct_seeds() {
        let ctx = NoiseContext::cpu();
        let mut settings = small_detail();
        settings.green = settings.blue;
        let volume = cloud_detail_volume(&ctx, &settings).unwrap();
        // Same parameters, different seed offsets
        assert_ne!(volume.channel(1), volume.channel(2));
    }

    #[test]
    fn test_detail_is_reproducible() {
        let ctx = NoiseContext::cpu();
        let a = cloud_detail_volume(&ctx, &small_detail()).unwrap();
        let b = cloud_detail_volume(&ctx, &small_detail()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_perlin_worley_normalized() {
        let ctx = NoiseContext::cpu();
        let settings = PerlinWorleySettings {
            resolution: 32,
            seed: 12,
            multiply: 1.5,
            ..PerlinWorleySettings::default()
        };
        let field = perlin_worley(&ctx, &settings).unwrap();
        let range = value_range(field.values());
        assert_eq!(range.min, 0.0);
        assert_eq!(range.max, 1.0);
    }

    #[test]
    fn test_invalid_resolution_rejected() {
        let ctx = NoiseContext::cpu();
        let settings = PerlinWorleySettings {
            resolution: 0,
            ..PerlinWorleySettings::default()
        };
        assert!(perlin_worley(&ctx, &settings).is_err());
    }
}
