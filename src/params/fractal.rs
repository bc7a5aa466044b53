//! Fractal Brownian motion parameters.

use serde::{Deserialize, Serialize};

use crate::error::{NoiseError, Result};

/// Octave layering parameters for one fractal field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalParameters {
    /// Lattice cells per axis for the first octave (must be >= 1).
    /// Doubles every octave.
    pub frequency: u32,

    /// Number of octaves; 0 and 1 both mean a single plain evaluation
    pub octaves: u32,

    /// Amplitude multiplier applied per octave (gain), nominally in [0, 1].
    /// Negative values are rejected; they can cancel the amplitude sum.
    pub persistence: f32,
}

impl Default for FractalParameters {
    fn default() -> Self {
        Self {
            frequency: 4,
            octaves: 3,
            persistence: 0.5,
        }
    }
}

impl FractalParameters {
    pub fn new(frequency: u32, octaves: u32, persistence: f32) -> Self {
        Self {
            frequency,
            octaves,
            persistence,
        }
    }

    /// Validate before any dispatch: frequency >= 1, finite non-negative persistence
    pub fn validate(&self) -> Result<()> {
        if self.frequency < 1 {
            return Err(NoiseError::invalid("frequency must be >= 1"));
        }
        if !self.persistence.is_finite() || self.persistence < 0.0 {
            return Err(NoiseError::invalid(format!(
                "persistence must be finite and >= 0, got {}",
                self.persistence
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FractalParameters::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_frequency_and_nan() {
        assert!(FractalParameters::new(0, 3, 0.5).validate().is_err());
        assert!(FractalParameters::new(2, 3, f32::NAN).validate().is_err());
    }

    #[test]
    fn test_rejects_negative_persistence() {
        assert!(matches!(
            FractalParameters::new(2, 2, -1.0).validate(),
            Err(NoiseError::InvalidParameter(_))
        ));
        assert!(FractalParameters::new(2, 2, 0.0).validate().is_ok());
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let params: FractalParameters = serde_json::from_str(r#"{ "octaves": 5 }"#).unwrap();
        assert_eq!(params.octaves, 5);
        assert_eq!(params.frequency, FractalParameters::default().frequency);
    }
}
