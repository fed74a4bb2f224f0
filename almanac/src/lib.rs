//! Time and observer-frame foundations for the planetarium.
//!
//! This crate holds the pure pieces everything else is built on: the J2000
//! sidereal-time formulas, sexagesimal catalog-string parsing, the observer
//! frame (time + location with memoized derived angles), and the rate-scaled
//! simulated clock.

mod clock;
mod observer;
mod parse;
pub mod time;

pub use clock::SimClock;
pub use observer::{Observer, ObserverDelta, ObserverUpdate};
pub use parse::{parse_declination, parse_right_ascension, ParseError};
pub use time::{
    days_since_j2000, local_sidereal_time, millis_since_j2000, universal_time_ms, J2000_UNIX_MS,
};
