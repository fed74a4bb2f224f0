//! The transit scheduler: watches approaching stars, queues their tones,
//! and drives voices through the audio endpoint.

use crate::audio::{AudioOut, Tone, VoiceId};
use crate::envelope::{amp_from_magnitude, note_from_altitude, Envelope};
use crate::synth::{StarSynth, SynthState};
use crate::timer::TimerQueue;
use almanac::Observer;
use skymap::Star;
use std::collections::HashMap;

/// Seconds over which a cancelled voice ramps to silence.
const CANCEL_RAMP_S: f64 = 0.2;
/// Seconds after cancellation at which the voice is hard-stopped.
const CANCEL_STOP_S: f64 = 0.4;
/// Oscillator run-out past the end of the release ramp.
const VOICE_TAIL_S: f64 = 0.1;

/// Tuning for the transit chorus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChorusConfig {
    pub envelope: Envelope,
    /// Peak gain for the brightest catalog star.
    pub max_amp: f64,
    /// Bottom of the frequency band, Hz.
    pub min_hz: f64,
    /// Top of the frequency band, Hz.
    pub max_hz: f64,
    /// Seconds ahead of start time at which a voice is built. Longer means
    /// more voices alive at once on the endpoint.
    pub queue_buffer: f64,
    /// Hour-angle window before upper transit in which tones are queued.
    pub approach_window: f64,
}

impl Default for ChorusConfig {
    fn default() -> Self {
        Self {
            envelope: Envelope::default(),
            max_amp: 0.3,
            min_hz: 40.0,
            max_hz: 400.0,
            queue_buffer: 1.0,
            approach_window: std::f64::consts::PI / 12.0,
        }
    }
}

/// Schedules one tone per star per meridian crossing.
///
/// Timing comes from the star's own transit countdown; all waiting happens
/// on the cancellable [`TimerQueue`], never by blocking. The owner must call
/// [`TransitChorus::cancel_all`] whenever the observer frame or clock rate
/// changes — queued timings are invalid the moment they do.
#[derive(Debug)]
pub struct TransitChorus<A: AudioOut> {
    out: A,
    config: ChorusConfig,
    timers: TimerQueue<u32>,
    synths: HashMap<u32, StarSynth>,
    next_voice: u64,
}

impl<A: AudioOut> TransitChorus<A> {
    pub fn new(out: A, config: ChorusConfig) -> Self {
        Self {
            out,
            config,
            timers: TimerQueue::new(),
            synths: HashMap::new(),
            next_voice: 0,
        }
    }

    pub fn out(&self) -> &A {
        &self.out
    }

    pub fn out_mut(&mut self) -> &mut A {
        &mut self.out
    }

    /// True if the star has a tone scheduled but not yet sounding.
    pub fn is_queued(&self, hr: u32) -> bool {
        self.synths.get(&hr).is_some_and(StarSynth::is_queued)
    }

    /// True if the star's tone is currently sounding.
    pub fn is_playing(&self, hr: u32) -> bool {
        self.synths.get(&hr).is_some_and(StarSynth::is_playing)
    }

    /// Number of stars with a queued or playing tone.
    pub fn active(&self) -> usize {
        self.synths.values().filter(|s| !s.is_idle()).count()
    }

    /// Queue a tone for a star approaching upper transit, if none is active.
    ///
    /// Called once per tick per visible star. `brightest`/`dimmest` are the
    /// catalog magnitude extremes used to normalize loudness.
    pub fn consider(
        &mut self,
        star: &Star,
        observer: &Observer,
        rate: f64,
        brightest: f64,
        dimmest: f64,
    ) {
        let hour_angle = star.hour_angle(observer);
        if hour_angle >= 0.0 || hour_angle < -self.config.approach_window {
            return;
        }
        let high_transit = star.high_transit(observer);
        if high_transit <= 0.0 {
            return;
        }
        let synth = self.synths.entry(star.hr).or_default();
        if !synth.is_idle() {
            return;
        }

        // real seconds until the crossing, at the current clock rate
        let start_offset = star.next_transit(observer, rate) / 1000.0;
        let start = self.out.now() + start_offset;
        let envelope = self.config.envelope.scaled(10.0 / rate);
        let amp = self.config.max_amp * amp_from_magnitude(star.mag, brightest, dimmest);
        let frequency = note_from_altitude(high_transit, self.config.min_hz, self.config.max_hz);

        let attack_end = start + envelope.attack;
        let decay_end = attack_end + envelope.decay;
        let release_end = decay_end + envelope.release;
        let tone = Tone {
            frequency,
            start,
            stop: release_end + VOICE_TAIL_S,
            gain_ramp: vec![
                (start, 0.0),
                (attack_end, amp),
                (decay_end, amp * envelope.sustain),
                (release_end, 0.0),
            ],
        };

        log::debug!(
            "HR {}: queued {:.0} Hz transit tone, {:.1}s out",
            star.hr,
            frequency,
            start_offset
        );
        let task = self
            .timers
            .schedule(start - self.config.queue_buffer, star.hr);
        synth.state = SynthState::Queued {
            task,
            tone,
            voice: None,
        };
    }

    /// Fire every due timer task, advancing the affected synths.
    pub fn process(&mut self) {
        let now = self.out.now();
        while let Some((_, hr)) = self.timers.pop_due(now) {
            self.fire(hr, now);
        }
    }

    fn fire(&mut self, hr: u32, now: f64) {
        let Some(synth) = self.synths.get_mut(&hr) else {
            return;
        };
        match std::mem::take(&mut synth.state) {
            SynthState::Idle => {}
            SynthState::Queued {
                tone, voice: None, ..
            } => {
                // begin: build the voice, unless its start already passed
                // (possible after a rate change)
                if tone.start < now {
                    log::debug!("HR {hr}: missed queue, dropping tone");
                    return;
                }
                let voice = VoiceId(self.next_voice);
                self.next_voice += 1;
                self.out.start(voice, &tone);
                let task = self.timers.schedule(tone.start, hr);
                synth.state = SynthState::Queued {
                    task,
                    tone,
                    voice: Some(voice),
                };
            }
            SynthState::Queued {
                tone,
                voice: Some(voice),
                ..
            } => {
                // the voice's start time arrived
                let task = self.timers.schedule(tone.stop, hr);
                synth.state = SynthState::Playing { task, voice };
            }
            SynthState::Playing { .. } => {
                // natural end of the tone; stay idle
            }
        }
    }

    /// Cancel a star's tone in any state, ramping an active voice to
    /// silence instead of cutting it.
    pub fn cancel(&mut self, hr: u32) {
        let now = self.out.now();
        let Some(synth) = self.synths.get_mut(&hr) else {
            return;
        };
        match std::mem::take(&mut synth.state) {
            SynthState::Idle => {}
            SynthState::Queued { task, voice, .. } => {
                self.timers.cancel(task);
                if let Some(voice) = voice {
                    self.out
                        .release(voice, now + CANCEL_RAMP_S, now + CANCEL_STOP_S);
                }
            }
            SynthState::Playing { task, voice } => {
                self.timers.cancel(task);
                self.out
                    .release(voice, now + CANCEL_RAMP_S, now + CANCEL_STOP_S);
            }
        }
    }

    /// Cancel everything, unconditionally. Required after any date jump,
    /// relocation or rate change — every queued timing is stale.
    pub fn cancel_all(&mut self) {
        let active: Vec<u32> = self
            .synths
            .iter()
            .filter(|(_, synth)| !synth.is_idle())
            .map(|(&hr, _)| hr)
            .collect();
        if !active.is_empty() {
            log::debug!("cancelling {} transit tones", active.len());
        }
        for hr in active {
            self.cancel(hr);
        }
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentAudio;
    use chrono::{TimeZone, Utc};

    /// Observer with LST 5.0241104258 rad: lat 0.7, long 0,
    /// 2022-09-08T20:00:00Z.
    fn observer() -> Observer {
        let date = Utc.with_ymd_and_hms(2022, 9, 8, 20, 0, 0).unwrap();
        Observer::new(date, 0.0, 0.7)
    }

    const LST_T0: f64 = 5.0241104258338325;

    fn approaching_star() -> Star {
        // hour angle -0.1: inside the default π/12 approach window
        Star::new(1, LST_T0 + 0.1, 0.5, 2.0)
    }

    fn chorus() -> TransitChorus<SilentAudio> {
        TransitChorus::new(SilentAudio::new(), ChorusConfig::default())
    }

    #[test]
    fn test_consider_queues_once() {
        let obs = observer();
        let star = approaching_star();
        let mut chorus = chorus();

        chorus.consider(&star, &obs, 1.0, -1.46, 7.2);
        assert!(chorus.is_queued(1));
        assert!(!chorus.is_playing(1));

        // a second look while queued must not double-queue
        chorus.consider(&star, &obs, 1.0, -1.46, 7.2);
        assert_eq!(chorus.timers.len(), 1);
    }

    #[test]
    fn test_receding_star_not_queued() {
        let obs = observer();
        let mut chorus = chorus();
        // hour angle +0.1: already past the meridian
        let past = Star::new(2, LST_T0 - 0.1, 0.5, 2.0);
        chorus.consider(&past, &obs, 1.0, -1.46, 7.2);
        assert!(!chorus.is_queued(2));

        // approaching but outside the window
        let early = Star::new(3, LST_T0 + 1.0, 0.5, 2.0);
        chorus.consider(&early, &obs, 1.0, -1.46, 7.2);
        assert!(!chorus.is_queued(3));
    }

    #[test]
    fn test_full_lifecycle() {
        let obs = observer();
        let star = approaching_star();
        let mut chorus = chorus();
        let rate = 100.0;

        chorus.consider(&star, &obs, rate, -1.46, 7.2);
        let start = chorus.out().now() + star.next_transit(&obs, rate) / 1000.0;

        // begin task fires one queue_buffer before start
        chorus.out_mut().set_now(start - 0.5);
        chorus.process();
        assert!(chorus.is_queued(1), "voice built but not yet started");
        assert_eq!(chorus.out().started.len(), 1);
        let tone = chorus.out().started[0].1.clone();
        assert!((tone.start - start).abs() < 1e-9);
        // envelope stages scaled by 10/rate
        assert!((tone.gain_ramp[1].0 - (start + 0.005)).abs() < 1e-9);

        // start time arrives
        chorus.out_mut().set_now(start + 0.001);
        chorus.process();
        assert!(chorus.is_playing(1));
        assert!(!chorus.is_queued(1));

        // natural end
        chorus.out_mut().set_now(tone.stop + 0.001);
        chorus.process();
        assert!(!chorus.is_playing(1));
        assert!(chorus.out().released.is_empty(), "no cancel ramp on natural end");
    }

    #[test]
    fn test_missed_queue_is_dropped() {
        let obs = observer();
        let star = approaching_star();
        let mut chorus = chorus();
        chorus.consider(&star, &obs, 100.0, -1.46, 7.2);
        let start = chorus.out().now() + star.next_transit(&obs, 100.0) / 1000.0;

        // the clock has leapt past the start time before the begin task ran
        chorus.out_mut().set_now(start + 5.0);
        chorus.process();
        assert!(!chorus.is_queued(1));
        assert!(!chorus.is_playing(1));
        assert!(chorus.out().started.is_empty());
    }

    #[test]
    fn test_cancel_ramps_active_voice() {
        let obs = observer();
        let star = approaching_star();
        let mut chorus = chorus();
        let rate = 100.0;
        chorus.consider(&star, &obs, rate, -1.46, 7.2);
        let start = chorus.out().now() + star.next_transit(&obs, rate) / 1000.0;

        chorus.out_mut().set_now(start - 0.5);
        chorus.process();
        chorus.out_mut().set_now(start + 0.001);
        chorus.process();
        assert!(chorus.is_playing(1));

        chorus.cancel_all();
        assert!(!chorus.is_playing(1));
        assert_eq!(chorus.out().released.len(), 1);
        let (_, ramp_to, stop_at) = chorus.out().released[0];
        let now = chorus.out().now();
        assert!((ramp_to - (now + CANCEL_RAMP_S)).abs() < 1e-9);
        assert!((stop_at - (now + CANCEL_STOP_S)).abs() < 1e-9);
        assert!(chorus.timers.is_empty());
    }

    #[test]
    fn test_cancel_before_voice_exists() {
        let obs = observer();
        let star = approaching_star();
        let mut chorus = chorus();
        chorus.consider(&star, &obs, 1.0, -1.46, 7.2);
        chorus.cancel_all();
        assert!(!chorus.is_queued(1));
        // nothing was started, so nothing needs a fade
        assert!(chorus.out().released.is_empty());
        // and the star can be queued again afterwards
        chorus.consider(&star, &obs, 1.0, -1.46, 7.2);
        assert!(chorus.is_queued(1));
    }

    #[test]
    fn test_note_follows_transit_altitude() {
        let obs = observer();
        let mut chorus = chorus();
        let rate = 100.0;
        // dec == lat culminates at the zenith
        let zenith = Star::new(10, LST_T0 + 0.05, 0.7, 0.0);
        chorus.consider(&zenith, &obs, rate, 0.0, 8.0);
        let start = chorus.out().now() + zenith.next_transit(&obs, rate) / 1000.0;
        chorus.out_mut().set_now(start - 0.5);
        chorus.process();
        let tone = &chorus.out().started[0].1;
        assert!((tone.frequency - 400.0).abs() < 1.0);
    }
}
