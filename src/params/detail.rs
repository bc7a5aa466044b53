//! Recipes for the textures fed to the cloud renderer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::FractalParameters;
use crate::error::{NoiseError, Result};

/// 3D cloud detail volume: Perlin-Worley in R, Worley octaves in G, B, A.
///
/// Channel seeds are offsets from `seed`: R Perlin +0, R Worley +1, G +2, B +3, A +4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSettings {
    /// Texels per axis of the cubic volume
    pub resolution: u32,

    pub seed: i32,

    /// R channel, Perlin layer
    pub red_perlin: FractalParameters,

    /// R channel, Worley layer
    pub red_worley: FractalParameters,

    /// Weight of the Worley layer when blending the R channel (0 = pure Perlin)
    pub red_blend: f32,

    /// Invert the R channel Worley layer before blending
    pub invert_worley: bool,

    pub green: FractalParameters,
    pub blue: FractalParameters,
    pub alpha: FractalParameters,
}

impl Default for DetailSettings {
    fn default() -> Self {
        Self {
            resolution: 64,
            seed: 0,
            red_perlin: FractalParameters::new(4, 4, 0.5),
            red_worley: FractalParameters::new(4, 3, 0.5),
            red_blend: 0.5,
            invert_worley: false,
            green: FractalParameters::new(4, 3, 0.5),
            blue: FractalParameters::new(8, 3, 0.5),
            alpha: FractalParameters::new(16, 3, 0.5),
        }
    }
}

impl DetailSettings {
    /// Load settings from a JSON document; omitted fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(NoiseError::invalid("resolution must be > 0"));
        }
        validate_blend(self.red_blend)?;
        for params in [
            &self.red_perlin,
            &self.red_worley,
            &self.green,
            &self.blue,
            &self.alpha,
        ] {
            params.validate()?;
        }
        Ok(())
    }
}

/// 2D Perlin-Worley texture blended from one Perlin and one Worley fractal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerlinWorleySettings {
    /// Texels per side of the square texture
    pub resolution: u32,

    /// Perlin uses `seed`, Worley uses `seed + 1`
    pub seed: i32,

    pub perlin: FractalParameters,
    pub worley: FractalParameters,

    /// Weight of the Worley layer (0 = pure Perlin, 1 = pure Worley)
    pub blend: f32,

    /// Gain applied after blending, before range normalization
    pub multiply: f32,

    pub invert_worley: bool,
}

impl Default for PerlinWorleySettings {
    fn default() -> Self {
        Self {
            resolution: 256,
            seed: 0,
            perlin: FractalParameters::new(4, 4, 0.5),
            worley: FractalParameters::new(4, 3, 0.5),
            blend: 0.5,
            multiply: 1.0,
            invert_worley: false,
        }
    }
}

impl PerlinWorleySettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(NoiseError::invalid("resolution must be > 0"));
        }
        validate_blend(self.blend)?;
        if !self.multiply.is_finite() {
            return Err(NoiseError::invalid("multiply must be finite"));
        }
        self.perlin.validate()?;
        self.worley.validate()
    }
}

fn validate_blend(blend: f32) -> Result<()> {
    if !blend.is_finite() {
        return Err(NoiseError::invalid(format!(
            "blend weight must be finite, got {}",
            blend
        )));
    }
    Ok(())
}
