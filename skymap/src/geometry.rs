//! Horizon-coordinate formulas.
//!
//! Pure functions over scalars; the [`Star`](crate::Star) cache decides when
//! they run. All angles are radians. Formulas follow
//! <http://www.stargazing.net/kepler/altaz.html> and
//! <https://kalobs.org/more/altitudes-at-transit/>.

use std::f64::consts::{PI, TAU};

/// Hour angle of a star: angular distance from the observer's meridian,
/// wrapped into `(−π, π]`.
///
/// Negative values mean the star is approaching upper transit, positive that
/// it is receding; that sign test is why the wrap point is ±π rather than
/// `[0, 2π)`.
pub fn hour_angle(lst: f64, ra: f64) -> f64 {
    let mut ha = (lst - ra).rem_euclid(TAU);
    if ha > PI {
        ha -= TAU;
    }
    ha
}

/// Altitude above the horizon (negative below).
pub fn altitude(sin_dec: f64, cos_dec: f64, sin_lat: f64, cos_lat: f64, hour_angle: f64) -> f64 {
    (sin_dec * sin_lat + cos_dec * cos_lat * hour_angle.cos()).asin()
}

/// Azimuth measured clockwise from north.
///
/// The reflection for stars west of the meridian is applied after the acos;
/// folding it into the argument would lose the east/west distinction.
pub fn azimuth(sin_dec: f64, sin_lat: f64, cos_lat: f64, hour_angle: f64, altitude: f64) -> f64 {
    let az = ((sin_dec - altitude.sin() * sin_lat) / (altitude.cos() * cos_lat)).acos();
    if hour_angle > 0.0 {
        TAU - az
    } else {
        az
    }
}

/// Altitude at upper meridian transit. Negative means the star never gets
/// above the horizon at this latitude.
pub fn high_transit(sin_dec: f64, cos_dec: f64, sin_lat: f64, cos_lat: f64) -> f64 {
    (cos_dec * cos_lat + sin_dec * sin_lat).asin()
}

/// Altitude at lower meridian transit.
pub fn low_transit(sin_dec: f64, cos_dec: f64, sin_lat: f64, cos_lat: f64) -> f64 {
    (-(cos_dec * cos_lat + sin_dec * sin_lat)).asin()
}

/// Magnitude of the hour angle at which the star crosses the horizon.
///
/// NaN when `|tan(dec) * tan(lat)| > 1`: the star is either circumpolar or
/// never rises. Callers must gate on [`high_transit`] before using this.
pub fn horizon_transit(dec: f64, lat: f64) -> f64 {
    PI - (dec.tan() * lat.tan()).acos()
}

/// Angular distance to travel before the star crosses the horizon going
/// upward: the hour angle wrapped forward into `[0, 2π)`, less the horizon
/// crossing magnitude. Smaller values rise sooner. NaN whenever
/// [`horizon_transit`] is NaN.
pub fn angle_to_rise(hour_angle: f64, horizon_transit: f64) -> f64 {
    let forward = if hour_angle > 0.0 {
        TAU - hour_angle
    } else {
        hour_angle
    };
    forward.abs() - horizon_transit.abs()
}
