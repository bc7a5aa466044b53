//! Cloudnoise - tileable Perlin/Worley textures for volumetric clouds
//!
//! Generates a single fractal field, the 2D Perlin-Worley blend or the 3D RGBA
//! detail volume, logs a value summary and optionally writes a PNG.

use clap::Parser;

use cloudnoise::cli::{Args, Backend, Mode};
use cloudnoise::detail::{cloud_detail_volume, perlin_worley};
use cloudnoise::export::{save_field_png, save_volume_png};
use cloudnoise::fractal::composite;
use cloudnoise::noise::{Perlin, Synthesizer, Worley};
use cloudnoise::normalize::{channel_ranges, value_range};
use cloudnoise::{NoiseContext, NoiseField};

fn create_context(backend: Backend) -> Result<NoiseContext, Box<dyn std::error::Error>> {
    match backend {
        Backend::Cpu => Ok(NoiseContext::cpu()),
        #[cfg(feature = "gpu")]
        Backend::Gpu => Ok(NoiseContext::gpu()?),
        #[cfg(not(feature = "gpu"))]
        Backend::Gpu => {
            log::warn!("built without the gpu feature, using cpu");
            Ok(NoiseContext::cpu())
        }
    }
}

fn report_field(label: &str, field: &NoiseField) {
    let range = value_range(field.values());
    let mean = field.values().iter().map(|&v| v as f64).sum::<f64>() / field.values().len() as f64;
    log::info!(
        "{}: {} cells, min {:.4}, max {:.4}, mean {:.4}",
        label,
        field.values().len(),
        range.min,
        range.max,
        mean
    );
}

fn run_single(
    args: &Args,
    ctx: &NoiseContext,
    synth: &dyn Synthesizer,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = args.fractal_parameters();
    let field = composite(ctx, synth, args.domain(), args.seed(), &params)?;
    report_field(synth.name(), &field);
    if let Some(path) = &args.output {
        save_field_png(&field, path)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let ctx = create_context(args.parse_backend())?;
    log::info!("using {} evaluator", ctx.evaluator().name());

    match args.parse_mode() {
        Mode::Perlin => run_single(&args, &ctx, &Perlin)?,
        Mode::Worley => {
            let worley = Worley {
                invert: args.invert,
            };
            run_single(&args, &ctx, &worley)?
        }
        Mode::PerlinWorley => {
            let settings = args.perlin_worley_settings()?;
            let field = perlin_worley(&ctx, &settings)?;
            report_field("perlin-worley", &field);
            if let Some(path) = &args.output {
                save_field_png(&field, path)?;
            }
        }
        Mode::Detail => {
            let settings = args.detail_settings()?;
            let volume = cloud_detail_volume(&ctx, &settings)?;
            for (name, range) in ["r", "g", "b", "a"]
                .iter()
                .zip(channel_ranges(volume.texels()))
            {
                log::info!("channel {}: min {:.4}, max {:.4}", name, range.min, range.max);
            }
            if let Some(path) = &args.output {
                save_volume_png(&volume, path)?;
            }
        }
    }

    Ok(())
}
