use chrono::{DateTime, TimeZone, Timelike, Utc};
use tracing::warn;

use crate::error::PositionError;
use crate::types::SolarPosition;

pub const DEGREES_PER_HOUR: f64 = 15.0;
pub const OBLIQUITY_OF_ECLIPTIC: f64 = 23.439;
/// Julian date of the Unix epoch.
pub const JD_UNIX_EPOCH: f64 = 2_440_587.5;
/// Julian date of J2000.0.
pub const JD_J2000: f64 = 2_451_545.0;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (std::f64::consts::PI / 180.0)
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / std::f64::consts::PI)
}

pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Wraps an angle into `[-180, 180)`.
pub fn wrap_signed(angle: f64) -> f64 {
    let a = normalize_angle(angle);
    if a >= 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Fractional Julian date of an instant.
pub fn julian_day(utc: &DateTime<Utc>) -> f64 {
    let seconds = utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) * 1e-9;
    JD_UNIX_EPOCH + seconds / 86_400.0
}

pub fn utc_decimal_hours(utc: &DateTime<Utc>) -> f64 {
    utc.hour() as f64
        + utc.minute() as f64 / 60.0
        + (utc.second() as f64 + f64::from(utc.nanosecond() % 1_000_000_000) * 1e-9) / 3600.0
}

/// Low-precision equatorial coordinates of the sun for a Julian date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunCoordinates {
    /// Degrees.
    pub declination: f64,
    /// Degrees, `[0, 360)`.
    pub right_ascension: f64,
    /// Apparent minus mean solar time, in degrees of hour angle.
    pub equation_of_time: f64,
}

impl SunCoordinates {
    pub fn at(julian_day: f64) -> Self {
        let n = julian_day - JD_J2000;
        let mean_longitude = normalize_angle(280.460 + 0.985_647_4 * n);
        let mean_anomaly = deg_to_rad(normalize_angle(357.528 + 0.985_600_3 * n));
        let ecliptic_longitude = deg_to_rad(
            mean_longitude + 1.915 * mean_anomaly.sin() + 0.020 * (2.0 * mean_anomaly).sin(),
        );
        let obliquity = deg_to_rad(OBLIQUITY_OF_ECLIPTIC);

        let declination = rad_to_deg((obliquity.sin() * ecliptic_longitude.sin()).asin());
        let right_ascension = normalize_angle(rad_to_deg(
            (obliquity.cos() * ecliptic_longitude.sin()).atan2(ecliptic_longitude.cos()),
        ));

        Self {
            declination,
            right_ascension,
            equation_of_time: wrap_signed(mean_longitude - right_ascension),
        }
    }

    /// Equation of time in minutes.
    pub fn equation_of_time_minutes(&self) -> f64 {
        self.equation_of_time * 60.0 / DEGREES_PER_HOUR
    }
}

/// Local hour angle in `[-180, 180)`: negative before solar noon.
pub fn hour_angle(utc_hours: f64, longitude: f64, equation_of_time: f64) -> f64 {
    wrap_signed(DEGREES_PER_HOUR * (utc_hours - 12.0) + longitude + equation_of_time)
}

pub fn solar_elevation(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let lat_rad = deg_to_rad(latitude);
    let dec_rad = deg_to_rad(declination);
    let ha_rad = deg_to_rad(hour_angle);
    let sin_elevation =
        lat_rad.sin() * dec_rad.sin() + lat_rad.cos() * dec_rad.cos() * ha_rad.cos();
    rad_to_deg(sin_elevation.clamp(-1.0, 1.0).asin())
}

pub fn solar_azimuth(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let lat_rad = deg_to_rad(latitude);
    let dec_rad = deg_to_rad(declination);
    let ha_rad = deg_to_rad(hour_angle);
    let sin_az = -dec_rad.cos() * ha_rad.sin();
    let cos_az = dec_rad.sin() * lat_rad.cos() - dec_rad.cos() * lat_rad.sin() * ha_rad.cos();
    let az_rad = sin_az.atan2(cos_az);
    normalize_angle(rad_to_deg(az_rad))
}

/// Hour angle (degrees, positive) at which the sun crosses `altitude` on a
/// day with the given declination, or `None` if it never does.
pub fn hour_angle_at_altitude(latitude: f64, declination: f64, altitude: f64) -> Option<f64> {
    let lat_rad = deg_to_rad(latitude);
    let dec_rad = deg_to_rad(declination);
    let cos_h = (deg_to_rad(altitude).sin() - lat_rad.sin() * dec_rad.sin())
        / (lat_rad.cos() * dec_rad.cos());
    if !cos_h.is_finite() || !(-1.0..=1.0).contains(&cos_h) {
        return None;
    }
    Some(rad_to_deg(cos_h.acos()))
}

/// Sun position for an absolute instant.
///
/// The instant may carry any timezone; it is converted to UTC here and
/// nowhere else. Below-horizon positions are returned as-is with negative
/// elevation.
pub fn solar_position<Tz: TimeZone>(
    latitude: f64,
    longitude: f64,
    dt: &DateTime<Tz>,
) -> Result<SolarPosition, PositionError> {
    let result = compute_position(latitude, longitude, &dt.with_timezone(&Utc));
    if let Err(err) = &result {
        warn!(latitude, longitude, error = %err, "solar position calculation failed");
    }
    result
}

fn compute_position(
    latitude: f64,
    longitude: f64,
    utc: &DateTime<Utc>,
) -> Result<SolarPosition, PositionError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(PositionError::InvalidLatitude(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(PositionError::InvalidLongitude(longitude));
    }

    let coords = SunCoordinates::at(julian_day(utc));
    let ha = hour_angle(utc_decimal_hours(utc), longitude, coords.equation_of_time);
    let elevation = solar_elevation(latitude, coords.declination, ha);
    let azimuth = solar_azimuth(latitude, coords.declination, ha);

    if !elevation.is_finite() || !azimuth.is_finite() {
        return Err(PositionError::NonFinite { elevation, azimuth });
    }
    Ok(SolarPosition { elevation, azimuth })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn julian_day_of_j2000_noon() {
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((julian_day(&t) - JD_J2000).abs() < 1e-9);
    }

    #[test]
    fn wrap_signed_range() {
        assert_eq!(wrap_signed(190.0), -170.0);
        assert_eq!(wrap_signed(-190.0), 170.0);
        assert_eq!(wrap_signed(180.0), -180.0);
        assert_eq!(wrap_signed(0.0), 0.0);
    }

    #[test]
    fn nan_latitude_is_rejected() {
        let t = Utc.with_ymd_and_hms(2026, 6, 21, 12, 0, 0).unwrap();
        assert!(matches!(
            solar_position(f64::NAN, 0.0, &t),
            Err(PositionError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn polar_circle_has_no_winter_sunrise() {
        assert!(hour_angle_at_altitude(80.0, -23.0, -0.833).is_none());
        assert!(hour_angle_at_altitude(80.0, 23.0, -0.833).is_none());
        assert!(hour_angle_at_altitude(45.0, 23.0, -0.833).is_some());
    }
}
