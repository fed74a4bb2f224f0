//! Julian-date-relative time calculations.
//!
//! Implements the approximate local sidereal time formula from
//! <http://www.stargazing.net/kepler/altaz.html>, which is accurate to a few
//! tenths of a degree over the decades around J2000 — more than enough for
//! plotting and transit scheduling.

use chrono::{DateTime, Utc};

/// The J2000.0 reference instant (2000-01-01T11:58:55.816 UTC) in Unix
/// milliseconds.
pub const J2000_UNIX_MS: i64 = 946_727_935_816;

const MS_PER_DAY: i64 = 86_400_000;

/// Signed milliseconds elapsed since the J2000 epoch.
pub fn millis_since_j2000(date: DateTime<Utc>) -> i64 {
    date.timestamp_millis() - J2000_UNIX_MS
}

/// Signed fractional days elapsed since the J2000 epoch.
pub fn days_since_j2000(date: DateTime<Utc>) -> f64 {
    millis_since_j2000(date) as f64 / MS_PER_DAY as f64
}

/// Milliseconds since the most recent UTC midnight.
pub fn universal_time_ms(date: DateTime<Utc>) -> i64 {
    date.timestamp_millis().rem_euclid(MS_PER_DAY)
}

/// Local sidereal time in radians, normalized to `[0, 2π)`.
///
/// Reference formula, in degrees:
///
/// ```text
/// lst = 100.46 + 0.985647 * d + longitude + 15 * ut_hours
/// ```
///
/// where `d` is fractional days since J2000 and `longitude` is east-positive.
/// Every star position downstream depends on this value.
pub fn local_sidereal_time(date: DateTime<Utc>, longitude: f64) -> f64 {
    let d = days_since_j2000(date);
    // 15 deg/hour over 3_600_000 ms/hour = 1 deg per 240_000 ms
    let ut = universal_time_ms(date) as f64 / 240_000.0;
    let lst = 100.46 + 0.985647 * d + longitude.to_degrees() + ut;
    lst.to_radians().rem_euclid(std::f64::consts::TAU)
}
