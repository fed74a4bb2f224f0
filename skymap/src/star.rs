//! One catalog entry plus its dependency-tracked position cache.

use crate::catalog::{CatalogEntry, CatalogError};
use crate::geometry;
use almanac::Observer;
use std::cell::Cell;
use std::f64::consts::{FRAC_PI_2, PI};

/// Simulated milliseconds per radian of hour angle (half a day over π).
const MS_PER_RADIAN: f64 = 43_200_000.0 / PI;

/// A single catalog star: immutable coordinates plus a memoized cache of
/// derived horizon angles.
///
/// Each derived field recomputes at most once per actual change of its
/// dependencies: [`Star::update`] compares the observer's sidereal time and
/// latitude against the values last seen by this star and drops exactly the
/// dependent subset. With a thousand-star catalog refreshed every frame, that
/// selective invalidation is the point of the design — the transit fields
/// survive pure time advance untouched.
///
/// Reads are `&self`; memo slots live in `Cell`s, matching the
/// single-threaded frame model.
#[derive(Debug, Clone)]
pub struct Star {
    /// Harvard Revised (Bright Star Catalog) reference number.
    pub hr: u32,
    /// Right ascension, radians.
    pub ra: f64,
    /// Declination, radians.
    pub dec: f64,
    /// Apparent visual magnitude; lower is brighter.
    pub mag: f64,

    sin_dec: f64,
    cos_dec: f64,

    cache: PositionCache,
    seen_lst: Cell<Option<f64>>,
    seen_lat: Cell<Option<f64>>,
}

#[derive(Debug, Clone, Default)]
struct PositionCache {
    hour_angle: Cell<Option<f64>>,
    altitude: Cell<Option<f64>>,
    azimuth: Cell<Option<f64>>,
    theta: Cell<Option<f64>>,
    rho: Cell<Option<f64>>,
    high_transit: Cell<Option<f64>>,
    low_transit: Cell<Option<f64>>,
    horizon_transit: Cell<Option<f64>>,
    angle_to_rise: Cell<Option<f64>>,
}

fn memo(slot: &Cell<Option<f64>>, compute: impl FnOnce() -> f64) -> f64 {
    match slot.get() {
        Some(v) => v,
        None => {
            let v = compute();
            slot.set(Some(v));
            v
        }
    }
}

impl Star {
    pub fn new(hr: u32, ra: f64, dec: f64, mag: f64) -> Self {
        Self {
            hr,
            ra,
            dec,
            mag,
            sin_dec: dec.sin(),
            cos_dec: dec.cos(),
            cache: PositionCache::default(),
            seen_lst: Cell::new(None),
            seen_lat: Cell::new(None),
        }
    }

    /// Build a star from a raw Bright Star Catalog record.
    pub fn from_entry(entry: &CatalogEntry) -> Result<Self, CatalogError> {
        Ok(Self::new(
            entry.harvard_ref,
            almanac::parse_right_ascension(&entry.ra, ':')?,
            almanac::parse_declination(&entry.dec, ':')?,
            entry
                .mag
                .trim()
                .parse()
                .map_err(|_| CatalogError::BadMagnitude {
                    hr: entry.harvard_ref,
                    value: entry.mag.clone(),
                })?,
        ))
    }

    /// Reconcile the cache with the observer frame, dropping exactly the
    /// derived fields whose dependencies changed since this star last looked.
    pub fn update(&self, observer: &Observer) {
        let lst = observer.lst();
        if self.seen_lst.get() != Some(lst) {
            self.seen_lst.set(Some(lst));
            self.cache.hour_angle.set(None);
            self.cache.altitude.set(None);
            self.cache.azimuth.set(None);
            self.cache.theta.set(None);
            self.cache.rho.set(None);
            self.cache.angle_to_rise.set(None);
        }

        let lat = observer.latitude();
        if self.seen_lat.get() != Some(lat) {
            self.seen_lat.set(Some(lat));
            self.cache.altitude.set(None);
            self.cache.azimuth.set(None);
            self.cache.theta.set(None);
            self.cache.rho.set(None);
            self.cache.high_transit.set(None);
            self.cache.low_transit.set(None);
            self.cache.horizon_transit.set(None);
            self.cache.angle_to_rise.set(None);
        }
    }

    /// Hour angle in `(−π, π]`; negative while approaching upper transit.
    pub fn hour_angle(&self, observer: &Observer) -> f64 {
        memo(&self.cache.hour_angle, || {
            geometry::hour_angle(observer.lst(), self.ra)
        })
    }

    /// Altitude above the horizon, radians.
    pub fn altitude(&self, observer: &Observer) -> f64 {
        memo(&self.cache.altitude, || {
            geometry::altitude(
                self.sin_dec,
                self.cos_dec,
                observer.sin_lat(),
                observer.cos_lat(),
                self.hour_angle(observer),
            )
        })
    }

    /// Azimuth clockwise from north, radians.
    pub fn azimuth(&self, observer: &Observer) -> f64 {
        memo(&self.cache.azimuth, || {
            geometry::azimuth(
                self.sin_dec,
                observer.sin_lat(),
                observer.cos_lat(),
                self.hour_angle(observer),
                self.altitude(observer),
            )
        })
    }

    /// Planar projection angle for plotting on a unit disk.
    pub fn theta(&self, observer: &Observer) -> f64 {
        memo(&self.cache.theta, || FRAC_PI_2 - self.azimuth(observer))
    }

    /// Planar projection radius for plotting on a unit disk.
    pub fn rho(&self, observer: &Observer) -> f64 {
        memo(&self.cache.rho, || self.altitude(observer).cos())
    }

    /// Altitude at upper meridian transit; negative means the star never
    /// rises at this latitude.
    pub fn high_transit(&self, observer: &Observer) -> f64 {
        memo(&self.cache.high_transit, || {
            geometry::high_transit(
                self.sin_dec,
                self.cos_dec,
                observer.sin_lat(),
                observer.cos_lat(),
            )
        })
    }

    /// Altitude at lower meridian transit.
    pub fn low_transit(&self, observer: &Observer) -> f64 {
        memo(&self.cache.low_transit, || {
            geometry::low_transit(
                self.sin_dec,
                self.cos_dec,
                observer.sin_lat(),
                observer.cos_lat(),
            )
        })
    }

    /// Hour-angle magnitude at the horizon crossing; NaN for circumpolar and
    /// never-rising stars.
    pub fn horizon_transit(&self, observer: &Observer) -> f64 {
        memo(&self.cache.horizon_transit, || {
            geometry::horizon_transit(self.dec, observer.latitude())
        })
    }

    /// Angular distance until the star crosses the horizon going upward;
    /// smaller rises sooner. NaN whenever [`Star::horizon_transit`] is.
    pub fn angle_to_rise(&self, observer: &Observer) -> f64 {
        memo(&self.cache.angle_to_rise, || {
            geometry::angle_to_rise(self.hour_angle(observer), self.horizon_transit(observer))
        })
    }

    /// Simulated milliseconds until the hour angle reaches `target`.
    pub fn time_to_angle(&self, target: f64, observer: &Observer) -> f64 {
        (target - self.hour_angle(observer)) * MS_PER_RADIAN
    }

    /// Real-world milliseconds until upper meridian transit at the given
    /// clock rate; positive while the transit is still ahead.
    pub fn next_transit(&self, observer: &Observer, rate: f64) -> f64 {
        self.hour_angle(observer) * -MS_PER_RADIAN / rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac::ObserverUpdate;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn observer() -> Observer {
        let date = Utc.with_ymd_and_hms(2022, 9, 8, 20, 0, 0).unwrap();
        Observer::new(date, 0.0, 0.7)
    }

    #[test]
    fn test_position_matches_geometry() {
        let obs = observer();
        let star = Star::new(1, 0.8, 0.5, 3.0);
        star.update(&obs);
        let ha = geometry::hour_angle(obs.lst(), 0.8);
        assert_relative_eq!(star.hour_angle(&obs), ha);
        assert_relative_eq!(
            star.altitude(&obs),
            geometry::altitude(0.5_f64.sin(), 0.5_f64.cos(), obs.sin_lat(), obs.cos_lat(), ha)
        );
        assert_relative_eq!(star.theta(&obs), FRAC_PI_2 - star.azimuth(&obs));
        assert_relative_eq!(star.rho(&obs), star.altitude(&obs).cos());
    }

    #[test]
    fn test_lst_change_preserves_transit_cache() {
        let mut obs = observer();
        let star = Star::new(1, 0.8, 0.5, 3.0);
        star.update(&obs);

        let ha_before = star.hour_angle(&obs);
        let high_before = star.high_transit(&obs);
        let horizon_before = star.horizon_transit(&obs);
        assert!(star.cache.high_transit.get().is_some());

        obs.update(ObserverUpdate::default().date(obs.date() + Duration::minutes(10)));
        star.update(&obs);

        // hour angle and dependents invalidated...
        assert!(star.cache.hour_angle.get().is_none());
        assert!(star.cache.angle_to_rise.get().is_none());
        assert!(star.hour_angle(&obs) != ha_before);

        // ...while the latitude-only fields kept their cached values
        assert_eq!(star.cache.high_transit.get(), Some(high_before));
        assert_eq!(star.cache.horizon_transit.get(), Some(horizon_before));
        assert_eq!(star.high_transit(&obs).to_bits(), high_before.to_bits());
    }

    #[test]
    fn test_lat_change_invalidates_transits() {
        let mut obs = observer();
        let star = Star::new(1, 0.8, 0.5, 3.0);
        star.update(&obs);
        let high_before = star.high_transit(&obs);
        let ha_before = star.hour_angle(&obs);

        obs.update(ObserverUpdate::default().latitude(0.2));
        star.update(&obs);

        assert!(star.cache.high_transit.get().is_none());
        assert!(star.high_transit(&obs) != high_before);
        // hour angle does not depend on latitude: still the cached value
        assert_eq!(star.cache.hour_angle.get(), Some(ha_before));
    }

    #[test]
    fn test_update_is_idempotent() {
        let obs = observer();
        let star = Star::new(1, 0.8, 0.5, 3.0);
        star.update(&obs);
        let alt = star.altitude(&obs);
        star.update(&obs);
        assert_eq!(star.cache.altitude.get(), Some(alt));
    }

    #[test]
    fn test_next_transit_sign_and_rate() {
        let obs = observer();
        // place the star just east of the meridian
        let star = Star::new(1, obs.lst() + 0.1, 0.5, 3.0);
        star.update(&obs);
        assert!(star.hour_angle(&obs) < 0.0);

        let at_unit_rate = star.next_transit(&obs, 1.0);
        assert!(at_unit_rate > 0.0, "transit lies ahead");
        assert_relative_eq!(star.next_transit(&obs, 10.0), at_unit_rate / 10.0);
        // time to reach the meridian matches the simulated countdown
        assert_relative_eq!(star.time_to_angle(0.0, &obs), at_unit_rate, epsilon = 1e-6);
    }

    #[test]
    fn test_from_entry() {
        let entry = CatalogEntry {
            harvard_ref: 5340,
            ra: "14:15:39.70".into(),
            dec: "+19:10:57.00".into(),
            mag: "-0.04".into(),
        };
        let star = Star::from_entry(&entry).unwrap();
        assert_eq!(star.hr, 5340);
        assert_relative_eq!(star.mag, -0.04);
        assert!(star.ra > 0.0 && star.dec > 0.0);

        let bad = CatalogEntry {
            mag: "n/a".into(),
            ..entry
        };
        assert!(matches!(
            Star::from_entry(&bad),
            Err(CatalogError::BadMagnitude { hr: 5340, .. })
        ));
    }
}
