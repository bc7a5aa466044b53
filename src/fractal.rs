//! Fractal Brownian motion compositing.
//!
//! Octave `i` is evaluated at `seed + i` and `frequency * 2^i` and weighted by
//! `persistence^i`. The weighted sum is divided by the sum of the weights (the
//! magnitude) so the result stays in the range of a single octave.

use rayon::prelude::*;

use crate::dispatch::NoiseContext;
use crate::error::{NoiseError, Result};
use crate::field::{Domain, NoiseField};
use crate::noise::{cell_size, Synthesizer};
use crate::params::FractalParameters;

/// One layer of a fractal sum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Octave {
    pub seed: i32,
    pub frequency: u32,
    pub amplitude: f32,
}

/// Seeds, frequencies and weights of every octave for one composite
#[derive(Debug, Clone, PartialEq)]
pub struct OctaveSchedule {
    octaves: Vec<Octave>,
}

impl OctaveSchedule {
    /// Expand parameters into octaves.
    ///
    /// Rejects schedules whose top frequency overflows `u32` and schedules
    /// whose amplitude sum is not a positive finite number.
    pub fn new(seed: i32, params: &FractalParameters) -> Result<Self> {
        params.validate()?;
        let count = params.octaves.max(1);

        // frequency * 2^(count-1) fits in u32 iff the shift stays within the leading zeros
        if count - 1 > params.frequency.leading_zeros() {
            return Err(NoiseError::invalid(format!(
                "octave frequency overflows (base {}, {} octaves)",
                params.frequency, params.octaves
            )));
        }

        let mut octaves = Vec::with_capacity(count as usize);
        let mut amplitude = 1.0f32;
        for i in 0..count {
            octaves.push(Octave {
                seed: seed.wrapping_add(i as i32),
                frequency: params.frequency << i,
                amplitude,
            });
            amplitude *= params.persistence;
        }

        let schedule = Self { octaves };
        let magnitude = schedule.magnitude();
        if !(magnitude.is_finite() && magnitude > 0.0) {
            return Err(NoiseError::invalid(format!(
                "octave amplitudes sum to {} (persistence {}, {} octaves)",
                magnitude, params.persistence, params.octaves
            )));
        }
        Ok(schedule)
    }

    pub fn octaves(&self) -> &[Octave] {
        &self.octaves
    }

    /// Sum of the octave amplitudes, accumulated in octave order
    pub fn magnitude(&self) -> f32 {
        self.octaves
            .iter()
            .fold(0.0f32, |magnitude, octave| magnitude + octave.amplitude)
    }
}

impl<'a> IntoIterator for &'a OctaveSchedule {
    type Item = &'a Octave;
    type IntoIter = std::slice::Iter<'a, Octave>;

    fn into_iter(self) -> Self::IntoIter {
        self.octaves.iter()
    }
}

/// Composite `params.octaves` octaves of `synthesizer` into one field.
///
/// With fewer than two octaves the synthesizer result is returned untouched.
pub fn composite<S: Synthesizer + ?Sized>(
    ctx: &NoiseContext,
    synthesizer: &S,
    domain: Domain,
    seed: i32,
    params: &FractalParameters,
) -> Result<NoiseField> {
    domain.validate()?;
    let schedule = OctaveSchedule::new(seed, params)?;

    if params.octaves <= 1 {
        return synthesizer.evaluate(ctx, domain, seed, params.frequency);
    }

    // Every octave lattice is checked before the first dispatch
    for octave in schedule.octaves() {
        cell_size(domain, octave.frequency)?;
    }

    let mut accumulator = NoiseField::zeros(domain);
    for octave in schedule.octaves() {
        log::debug!(
            "{} octave seed={} frequency={} amplitude={}",
            synthesizer.name(),
            octave.seed,
            octave.frequency,
            octave.amplitude
        );
        let layer = synthesizer.evaluate(ctx, domain, octave.seed, octave.frequency)?;
        let amplitude = octave.amplitude;
        accumulator
            .values_mut()
            .par_iter_mut()
            .zip(layer.values().par_iter())
            .for_each(|(acc, v)| *acc += amplitude * v);
    }

    let magnitude = schedule.magnitude();
    accumulator
        .values_mut()
        .par_iter_mut()
        .for_each(|acc| *acc /= magnitude);
    Ok(accumulator)
}
