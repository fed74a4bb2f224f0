//! Gain envelope and the star-to-sound parameter maps.

use std::f64::consts::FRAC_PI_2;

/// A linear attack/decay/sustain/release gain envelope.
///
/// `attack`, `decay` and `release` are durations in seconds; `sustain` is
/// the 0..1 gain level held between decay and release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.05,
            decay: 0.15,
            sustain: 0.66,
            release: 5.0,
        }
    }
}

impl Envelope {
    /// Scale the time stages, leaving the sustain level alone.
    ///
    /// The transit scheduler uses factor `10 / clock rate`, so the audible
    /// shape stays perceptually similar across simulation speeds.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            attack: self.attack * factor,
            decay: self.decay * factor,
            sustain: self.sustain,
            release: self.release * factor,
        }
    }
}

/// Map a transit altitude to a frequency: stars that culminate at the zenith
/// get the top of the band, stars that barely clear the horizon the bottom.
pub fn note_from_altitude(altitude: f64, min_hz: f64, max_hz: f64) -> f64 {
    let scale = 1.0 - (1.0 - altitude / FRAC_PI_2).abs();
    min_hz + scale * (max_hz - min_hz)
}

/// Map a magnitude to a 0..1 amplitude, normalized against the catalog's
/// brightest and dimmest entries. Lower magnitude = brighter = louder.
pub fn amp_from_magnitude(magnitude: f64, brightest: f64, dimmest: f64) -> f64 {
    let range = dimmest - brightest;
    if !(range > 0.0) {
        return 1.0;
    }
    ((dimmest - magnitude) / range).clamp(0.0, 1.0)
}
