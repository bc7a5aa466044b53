//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::error::Result;
use crate::field::Domain;
use crate::params::{DetailSettings, FractalParameters, PerlinWorleySettings};

/// What the binary generates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fractal Perlin field
    Perlin,
    /// Fractal Worley field
    Worley,
    /// 2D Perlin-Worley blend
    PerlinWorley,
    /// 3D RGBA cloud detail volume
    Detail,
}

/// Where kernels execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Cpu,
    Gpu,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "cloudnoise")]
#[command(about = "Tileable Perlin/Worley noise generator for volumetric clouds", long_about = None)]
pub struct Args {
    /// Output kind: perlin, worley, perlin-worley, detail (default)
    #[arg(long, value_name = "MODE", default_value = "detail")]
    pub mode: String,

    /// Texels per axis (overrides the settings file)
    #[arg(long, value_name = "TEXELS")]
    pub size: Option<u32>,

    /// Base seed (overrides the settings file)
    #[arg(long)]
    pub seed: Option<i32>,

    /// Lattice cells per axis of the first octave
    #[arg(long, default_value = "4")]
    pub frequency: u32,

    /// Number of octaves
    #[arg(long, default_value = "3")]
    pub octaves: u32,

    /// Amplitude falloff per octave
    #[arg(long, default_value = "0.5")]
    pub persistence: f32,

    /// Generate a cube instead of a square (perlin and worley modes)
    #[arg(long)]
    pub three_d: bool,

    /// Execution backend: cpu (default), gpu
    #[arg(long, value_name = "BACKEND", default_value = "cpu")]
    pub backend: String,

    /// JSON settings for the perlin-worley and detail recipes
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Write the result as a PNG
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Invert Worley output (1 - distance)
    #[arg(long)]
    pub invert: bool,
}

impl Args {
    /// Parse generation mode from command-line arguments
    pub fn parse_mode(&self) -> Mode {
        match self.mode.to_lowercase().as_str() {
            "perlin" => Mode::Perlin,
            "worley" => Mode::Worley,
            "perlin-worley" | "perlinworley" => Mode::PerlinWorley,
            "detail" => Mode::Detail,
            other => {
                log::warn!("unknown mode '{}', using detail", other);
                Mode::Detail
            }
        }
    }

    /// Parse execution backend from command-line arguments
    pub fn parse_backend(&self) -> Backend {
        match self.backend.to_lowercase().as_str() {
            "cpu" => Backend::Cpu,
            "gpu" => Backend::Gpu,
            other => {
                log::warn!("unknown backend '{}', using cpu", other);
                Backend::Cpu
            }
        }
    }

    pub fn fractal_parameters(&self) -> FractalParameters {
        FractalParameters::new(self.frequency, self.octaves, self.persistence)
    }

    /// Domain for the single-synthesizer modes
    pub fn domain(&self) -> Domain {
        let size = self.size.unwrap_or(64);
        if self.three_d {
            Domain::cube(size)
        } else {
            Domain::square(size)
        }
    }

    pub fn seed(&self) -> i32 {
        self.seed.unwrap_or(0)
    }

    /// Perlin-Worley settings from the settings file, or from the fractal
    /// arguments applied to both layers
    pub fn perlin_worley_settings(&self) -> Result<PerlinWorleySettings> {
        let mut settings = match &self.settings {
            Some(path) => PerlinWorleySettings::load(path)?,
            None => PerlinWorleySettings {
                perlin: self.fractal_parameters(),
                worley: self.fractal_parameters(),
                ..PerlinWorleySettings::default()
            },
        };
        if let Some(size) = self.size {
            settings.resolution = size;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        settings.invert_worley |= self.invert;
        Ok(settings)
    }

    /// Detail settings from the settings file or defaults
    pub fn detail_settings(&self) -> Result<DetailSettings> {
        let mut settings = match &self.settings {
            Some(path) => DetailSettings::load(path)?,
            None => DetailSettings::default(),
        };
        if let Some(size) = self.size {
            settings.resolution = size;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        settings.invert_worley |= self.invert;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Dimension;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("cloudnoise").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.parse_mode(), Mode::Detail);
        assert_eq!(args.parse_backend(), Backend::Cpu);
        assert_eq!(args.fractal_parameters(), FractalParameters::new(4, 3, 0.5));
        assert_eq!(args.domain(), Domain::square(64));
    }

    #[test]
    fn test_mode_and_domain() {
        let args = parse(&["--mode", "Worley", "--size", "32", "--three-d"]);
        assert_eq!(args.parse_mode(), Mode::Worley);
        assert_eq!(args.domain().dimension, Dimension::Three);
        assert_eq!(args.domain().size, 32);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let args = parse(&["--mode", "clouds", "--backend", "tpu"]);
        assert_eq!(args.parse_mode(), Mode::Detail);
        assert_eq!(args.parse_backend(), Backend::Cpu);
    }

    #[test]
    fn test_overrides_applied_to_recipes() {
        let args = parse(&["--size", "16", "--seed", "9", "--octaves", "2", "--invert"]);

        let pw = args.perlin_worley_settings().unwrap();
        assert_eq!(pw.resolution, 16);
        assert_eq!(pw.seed, 9);
        assert_eq!(pw.perlin.octaves, 2);
        assert!(pw.invert_worley);

        let detail = args.detail_settings().unwrap();
        assert_eq!(detail.resolution, 16);
        assert_eq!(detail.seed, 9);
        assert!(detail.invert_worley);
    }

    #[test]
    fn test_missing_settings_file_is_error() {
        let args = parse(&["--settings", "/nonexistent/cloudnoise.json"]);
        assert!(args.detail_settings().is_err());
    }
}
