//! The top-level driver tying clock, observer, sky and chorus together.

use crate::audio::AudioOut;
use crate::transit::{ChorusConfig, TransitChorus};
use almanac::{Observer, ObserverUpdate, SimClock};
use chrono::{DateTime, Utc};
use skymap::{Sky, Star};
use std::time::Duration;

/// One running simulation: a rate-scaled clock, the observer frame it feeds,
/// the partitioned star catalog, and the transit chorus sounding over it.
///
/// Per-tick ordering is fixed: advance the clock, update the observer, fire
/// due audio tasks, then walk the visible stars. Every star read happens
/// after its cache was reconciled with the frame, so renders and tone
/// parameters within one tick are mutually consistent.
pub struct Session<A: AudioOut> {
    clock: SimClock,
    observer: Observer,
    sky: Sky,
    chorus: TransitChorus<A>,
}

impl<A: AudioOut> Session<A> {
    /// Start a session at the given simulated date, location (radians,
    /// east/north positive) and clock rate.
    pub fn new(
        start: DateTime<Utc>,
        longitude: f64,
        latitude: f64,
        rate: f64,
        stars: Vec<Star>,
        out: A,
        config: ChorusConfig,
    ) -> Self {
        Self {
            clock: SimClock::new(start, rate),
            observer: Observer::new(start, longitude, latitude),
            sky: Sky::new(stars),
            chorus: TransitChorus::new(out, config),
        }
    }

    /// Advance one frame: `real_elapsed` is wall-clock time since the last
    /// tick; `draw` is called once per currently visible star.
    pub fn tick(&mut self, real_elapsed: Duration, mut draw: impl FnMut(&Star)) {
        let date = self.clock.advance(real_elapsed);
        self.observer.update(ObserverUpdate::default().date(date));
        self.chorus.process();

        let rate = self.clock.rate();
        let brightest = self.sky.brightest_mag();
        let dimmest = self.sky.dimmest_mag();
        let observer = &self.observer;
        let chorus = &mut self.chorus;
        self.sky.each_visible(observer, |star| {
            draw(star);
            chorus.consider(star, observer, rate, brightest, dimmest);
        });
    }

    /// Move the observer. The visibility partition is rebuilt and every
    /// queued or playing tone is cancelled; their timings belonged to the
    /// old horizon.
    pub fn set_location(&mut self, longitude: f64, latitude: f64) {
        let delta = self.observer.update(
            ObserverUpdate::default()
                .longitude(longitude)
                .latitude(latitude),
        );
        if delta.moved() {
            log::info!("observer moved to long {longitude:.4}, lat {latitude:.4}");
            self.sky.rebuild(&self.observer);
            self.chorus.cancel_all();
        }
    }

    /// Jump the simulated date, forwards or backwards. Rebuilds the
    /// partition and cancels all pending audio.
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.clock.set_date(date);
        let delta = self.observer.update(ObserverUpdate::default().date(date));
        if delta.any() {
            log::info!("simulated date set to {date}");
            self.sky.rebuild(&self.observer);
            self.chorus.cancel_all();
        }
    }

    /// Change the clock rate. Pending tone timings assume a fixed rate, so
    /// everything queued is cancelled; approaching stars requeue on the next
    /// tick at the new rate.
    pub fn set_rate(&mut self, rate: f64) {
        if rate != self.clock.rate() {
            self.clock.set_rate(rate);
            self.chorus.cancel_all();
        }
    }

    pub fn rate(&self) -> f64 {
        self.clock.rate()
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn sky(&self) -> &Sky {
        &self.sky
    }

    pub fn star(&self, hr: u32) -> Option<&Star> {
        self.sky.star(hr)
    }

    pub fn is_queued(&self, hr: u32) -> bool {
        self.chorus.is_queued(hr)
    }

    pub fn is_playing(&self, hr: u32) -> bool {
        self.chorus.is_playing(hr)
    }

    pub fn audio(&self) -> &A {
        self.chorus.out()
    }

    pub fn audio_mut(&mut self) -> &mut A {
        self.chorus.out_mut()
    }
}
