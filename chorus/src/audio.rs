//! The audio endpoint seam.
//!
//! The core computes tones and their timing; actually making sound is the
//! embedder's job. [`AudioOut`] is the narrow interface the scheduler needs:
//! a clock, a way to start a gain-enveloped oscillator voice, and a way to
//! fade one out. [`SilentAudio`] is the in-process implementation used by
//! tests and headless tools.

/// Identity of one scheduled oscillator voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub u64);

/// A fully scheduled tone: frequency plus absolute-time gain breakpoints on
/// the endpoint's clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    /// Oscillator frequency in Hz.
    pub frequency: f64,
    /// When the oscillator starts, seconds on the endpoint clock.
    pub start: f64,
    /// When the oscillator is hard-stopped.
    pub stop: f64,
    /// `(time, gain)` breakpoints; gain ramps linearly between them.
    pub gain_ramp: Vec<(f64, f64)>,
}

/// External audio-graph endpoint (oscillator + gain + destination).
pub trait AudioOut {
    /// Current time of the endpoint's clock, in seconds. Runs at wall-clock
    /// speed regardless of the simulation rate.
    fn now(&self) -> f64;

    /// Schedule a voice: oscillator at `tone.frequency`, gain following
    /// `tone.gain_ramp`, started and stopped at the tone's times.
    fn start(&mut self, voice: VoiceId, tone: &Tone);

    /// Fade a voice to silence by `ramp_to`, then hard-stop it at `stop_at`.
    ///
    /// The ramp-then-stop shape is required: cutting a voice at nonzero gain
    /// produces an audible click.
    fn release(&mut self, voice: VoiceId, ramp_to: f64, stop_at: f64);
}

/// A recording endpoint with a manually advanced clock and no hardware.
#[derive(Debug, Default)]
pub struct SilentAudio {
    now: f64,
    /// Every voice started, in order.
    pub started: Vec<(VoiceId, Tone)>,
    /// Every `(voice, ramp_to, stop_at)` release, in order.
    pub released: Vec<(VoiceId, f64, f64)>,
}

impl SilentAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump the clock to an absolute time.
    pub fn set_now(&mut self, now: f64) {
        self.now = now;
    }

    /// Advance the clock by a number of seconds.
    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds;
    }
}

impl AudioOut for SilentAudio {
    fn now(&self) -> f64 {
        self.now
    }

    fn start(&mut self, voice: VoiceId, tone: &Tone) {
        self.started.push((voice, tone.clone()));
    }

    fn release(&mut self, voice: VoiceId, ramp_to: f64, stop_at: f64) {
        self.released.push((voice, ramp_to, stop_at));
    }
}
