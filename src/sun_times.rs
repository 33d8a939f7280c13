//! Sunrise/sunset resolution.
//!
//! The forecast engine only sees the [`SunTimesProvider`] trait. [`NoaaSunTimes`]
//! is the built-in implementation, using the same ephemeris as
//! [`crate::angles::solar_position`].

use std::fmt;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::angles::{self, SunCoordinates, DEGREES_PER_HOUR};
use crate::types::{Location, SunTimes};

/// Geometric horizon plus standard refraction and solar semi-diameter.
pub const SUNRISE_ALTITUDE: f64 = -0.833;
pub const CIVIL_TWILIGHT_ALTITUDE: f64 = -6.0;

const REFINEMENT_PASSES: usize = 3;

/// Source of sun events for a calendar date.
///
/// Implementations return `None` when the sun does not rise or set on that
/// date (polar day or polar night) instead of failing.
pub trait SunTimesProvider {
    fn sun_times(&self, location: &Location, date: NaiveDate) -> Option<SunTimes>;
}

impl<P: SunTimesProvider + ?Sized> SunTimesProvider for &P {
    fn sun_times(&self, location: &Location, date: NaiveDate) -> Option<SunTimes> {
        (**self).sun_times(location, date)
    }
}

/// Iterative low-precision sunrise/sunset calculator.
///
/// Transit is found by driving the hour angle to zero; each event is then
/// refined by recomputing declination and equation of time at the event
/// estimate. Accuracy is on the order of a minute at mid-latitudes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoaaSunTimes;

impl NoaaSunTimes {
    /// Solar transit (local apparent noon) for a calendar date.
    pub fn transit(&self, location: &Location, date: NaiveDate) -> Option<DateTime<Utc>> {
        let mut t = local_noon(&location.timezone, date)?;
        for _ in 0..REFINEMENT_PASSES {
            let ha = hour_angle_at(location.longitude, &t);
            t = shift_hours(t, -ha / DEGREES_PER_HOUR)?;
        }
        Some(t)
    }

    /// Time the sun crosses `altitude`, rising if `rising`, else setting.
    pub fn crossing(
        &self,
        location: &Location,
        transit: DateTime<Utc>,
        altitude: f64,
        rising: bool,
    ) -> Option<DateTime<Utc>> {
        let sign = if rising { -1.0 } else { 1.0 };
        let mut t = transit;
        for _ in 0..=REFINEMENT_PASSES {
            let coords = SunCoordinates::at(angles::julian_day(&t));
            let target =
                sign * angles::hour_angle_at_altitude(location.latitude, coords.declination, altitude)?;
            let current = hour_angle_at(location.longitude, &t);
            let delta = angles::wrap_signed(target - current);
            t = shift_hours(t, delta / DEGREES_PER_HOUR)?;
        }
        Some(t)
    }
}

impl SunTimesProvider for NoaaSunTimes {
    fn sun_times(&self, location: &Location, date: NaiveDate) -> Option<SunTimes> {
        let tz = location.timezone;
        let transit = self.transit(location, date)?;
        let Some(sunrise) = self.crossing(location, transit, SUNRISE_ALTITUDE, true) else {
            debug!(%date, latitude = location.latitude, "no sunrise: polar day or night");
            return None;
        };
        let sunset = self.crossing(location, transit, SUNRISE_ALTITUDE, false)?;

        let dawn = self.crossing(location, transit, CIVIL_TWILIGHT_ALTITUDE, true);
        let dusk = self.crossing(location, transit, CIVIL_TWILIGHT_ALTITUDE, false);

        Some(SunTimes {
            sunrise: sunrise.with_timezone(&tz),
            sunset: sunset.with_timezone(&tz),
            dawn: dawn.map(|t| t.with_timezone(&tz)),
            dusk: dusk.map(|t| t.with_timezone(&tz)),
        })
    }
}

fn hour_angle_at(longitude: f64, t: &DateTime<Utc>) -> f64 {
    let coords = SunCoordinates::at(angles::julian_day(t));
    angles::hour_angle(angles::utc_decimal_hours(t), longitude, coords.equation_of_time)
}

fn shift_hours(t: DateTime<Utc>, hours: f64) -> Option<DateTime<Utc>> {
    if !hours.is_finite() {
        return None;
    }
    t.checked_add_signed(Duration::milliseconds((hours * 3_600_000.0).round() as i64))
}

/// 12:00 local time on `date`, the most stable anchor for the day's events.
/// Where a transition skips noon, 13:00 local is used instead.
fn local_noon(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let noon = date.and_hms_opt(12, 0, 0)?;
    let local = match tz.from_local_datetime(&noon) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t,
        LocalResult::None => tz.from_local_datetime(&date.and_hms_opt(13, 0, 0)?).earliest()?,
    };
    Some(local.with_timezone(&Utc))
}

/// Time left until the next sunset, for countdown displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunsetCountdown {
    pub sunset: DateTime<Tz>,
    pub remaining: Duration,
    /// Today's sunset has passed and `sunset` is tomorrow's.
    pub is_tomorrow: bool,
}

impl SunsetCountdown {
    pub fn hours_remaining(&self) -> i64 {
        self.remaining.num_hours()
    }

    pub fn minutes_remaining(&self) -> i64 {
        self.remaining.num_minutes() % 60
    }
}

impl fmt::Display for SunsetCountdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours_remaining(), self.minutes_remaining())?;
        if self.is_tomorrow {
            write!(f, " (tomorrow)")?;
        }
        Ok(())
    }
}

/// Today's sunset if it is still ahead of `now`, otherwise tomorrow's.
pub fn next_sunset<P, T>(provider: &P, location: &Location, now: &DateTime<T>) -> Option<SunsetCountdown>
where
    P: SunTimesProvider + ?Sized,
    T: TimeZone,
{
    let now = now.with_timezone(&location.timezone);
    let today = now.date_naive();

    if let Some(times) = provider.sun_times(location, today) {
        if times.sunset > now {
            return Some(SunsetCountdown {
                sunset: times.sunset,
                remaining: times.sunset.signed_duration_since(now),
                is_tomorrow: false,
            });
        }
    }

    let tomorrow = provider.sun_times(location, today.succ_opt()?)?;
    Some(SunsetCountdown {
        sunset: tomorrow.sunset,
        remaining: tomorrow.sunset.signed_duration_since(now),
        is_tomorrow: true,
    })
}
