//! The observer frame: one instant and location, with memoized derived
//! angles.
//!
//! A single `Observer` represents "now" for the whole system. The scheduling
//! driver owns it and applies updates; stars only ever read from it. Derived
//! fields recompute lazily, and only when a raw field they depend on actually
//! changed: `lst` depends on date + longitude, `sin_lat`/`cos_lat` on
//! latitude alone.

use crate::time::local_sidereal_time;
use chrono::{DateTime, Utc};
use std::cell::Cell;

/// Observer time and location with lazily derived sidereal time and
/// latitude trigonometry.
///
/// The model is single-threaded and frame-driven; memo slots use `Cell` so
/// reads stay `&self`.
#[derive(Debug)]
pub struct Observer {
    date: DateTime<Utc>,
    longitude: f64,
    latitude: f64,
    lst: Cell<Option<f64>>,
    sin_lat: Cell<Option<f64>>,
    cos_lat: Cell<Option<f64>>,
}

/// A partial observer update: any subset of date, longitude and latitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObserverUpdate {
    pub date: Option<DateTime<Utc>>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

impl ObserverUpdate {
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn longitude(mut self, longitude: f64) -> Self {
        self.longitude = Some(longitude);
        self
    }

    pub fn latitude(mut self, latitude: f64) -> Self {
        self.latitude = Some(latitude);
        self
    }
}

/// Which raw fields an update actually changed.
///
/// No-op assignments (same value) are filtered out, so the driver can key
/// rebuild and audio-cancellation decisions off this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserverDelta {
    pub date: bool,
    pub longitude: bool,
    pub latitude: bool,
}

impl ObserverDelta {
    /// True if any raw field changed.
    pub fn any(&self) -> bool {
        self.date || self.longitude || self.latitude
    }

    /// True if the horizon geometry changed (location, not just time).
    pub fn moved(&self) -> bool {
        self.longitude || self.latitude
    }
}

impl Observer {
    /// Create an observer frame. Longitude east-positive, latitude
    /// north-positive, both in radians.
    pub fn new(date: DateTime<Utc>, longitude: f64, latitude: f64) -> Self {
        Self {
            date,
            longitude,
            latitude,
            lst: Cell::new(None),
            sin_lat: Cell::new(None),
            cos_lat: Cell::new(None),
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Local sidereal time in radians, `[0, 2π)`. Memoized against
    /// date/longitude changes.
    pub fn lst(&self) -> f64 {
        match self.lst.get() {
            Some(v) => v,
            None => {
                let v = local_sidereal_time(self.date, self.longitude);
                self.lst.set(Some(v));
                v
            }
        }
    }

    /// Sine of the latitude, memoized.
    pub fn sin_lat(&self) -> f64 {
        match self.sin_lat.get() {
            Some(v) => v,
            None => {
                let v = self.latitude.sin();
                self.sin_lat.set(Some(v));
                v
            }
        }
    }

    /// Cosine of the latitude, memoized.
    pub fn cos_lat(&self) -> f64 {
        match self.cos_lat.get() {
            Some(v) => v,
            None => {
                let v = self.latitude.cos();
                self.cos_lat.set(Some(v));
                v
            }
        }
    }

    /// Apply a partial update atomically, invalidating only the derived
    /// fields whose dependencies actually changed.
    pub fn update(&mut self, update: ObserverUpdate) -> ObserverDelta {
        let mut delta = ObserverDelta::default();

        if let Some(date) = update.date {
            if date != self.date {
                self.date = date;
                delta.date = true;
            }
        }
        if let Some(longitude) = update.longitude {
            if longitude != self.longitude {
                self.longitude = longitude;
                delta.longitude = true;
            }
        }
        if let Some(latitude) = update.latitude {
            if latitude != self.latitude {
                self.latitude = latitude;
                delta.latitude = true;
            }
        }

        // All raw fields are in place before any derived slot is dropped.
        if delta.date || delta.longitude {
            self.lst.set(None);
        }
        if delta.latitude {
            self.sin_lat.set(None);
            self.cos_lat.set(None);
        }

        delta
    }
}
