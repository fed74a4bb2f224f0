//! Rate-scaled simulated clock.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;

/// A simulated clock decoupled from wall time by a rate multiplier.
///
/// `rate` is simulated seconds per real second; each tick the driver feeds in
/// the real elapsed time and reads back the advanced simulated date. The date
/// may also be set directly, forwards or backwards — consumers must not
/// assume monotonicity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    date: DateTime<Utc>,
    rate: f64,
}

impl SimClock {
    pub fn new(start: DateTime<Utc>, rate: f64) -> Self {
        Self { date: start, rate }
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    /// Jump the simulated date, in either direction.
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
    }

    /// Advance by a real elapsed duration scaled by the clock rate, and
    /// return the new simulated date. Tolerates variable per-tick elapsed
    /// time.
    pub fn advance(&mut self, real_elapsed: Duration) -> DateTime<Utc> {
        let sim_nanos = real_elapsed.as_nanos() as f64 * self.rate;
        self.date += ChronoDuration::nanoseconds(sim_nanos as i64);
        self.date
    }
}
