#![allow(dead_code, unused_macros)]

use chrono::{NaiveDate, TimeZone};

use solar_forecast::{Location, PanelConfig, SunTimes, SunTimesProvider};

macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r) = ($left as f64, $right as f64);
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l, r, (l - r).abs(), $tol
        );
    };
}

pub fn timisoara() -> Location {
    Location::new(45.76, 21.42, "Europe/Bucharest").unwrap()
}

pub fn tromso() -> Location {
    Location::new(69.65, 18.96, "Europe/Oslo").unwrap()
}

pub fn south_panel() -> PanelConfig {
    PanelConfig::new(30.0, 180.0, 10.0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Same local clock times every day.
pub struct FixedSunTimes {
    pub sunrise: (u32, u32),
    pub sunset: (u32, u32),
}

impl SunTimesProvider for FixedSunTimes {
    fn sun_times(&self, location: &Location, date: NaiveDate) -> Option<SunTimes> {
        let at = |(h, m): (u32, u32)| {
            location
                .timezone
                .from_local_datetime(&date.and_hms_opt(h, m, 0)?)
                .single()
        };
        Some(SunTimes {
            sunrise: at(self.sunrise)?,
            sunset: at(self.sunset)?,
            dawn: None,
            dusk: None,
        })
    }
}

/// Polar night everywhere, always.
pub struct NoSunTimes;

impl SunTimesProvider for NoSunTimes {
    fn sun_times(&self, _location: &Location, _date: NaiveDate) -> Option<SunTimes> {
        None
    }
}

/// Delegates for one date only; every other date is unresolvable.
pub struct OnlyOn<P> {
    pub date: NaiveDate,
    pub inner: P,
}

impl<P: SunTimesProvider> SunTimesProvider for OnlyOn<P> {
    fn sun_times(&self, location: &Location, date: NaiveDate) -> Option<SunTimes> {
        if date == self.date {
            self.inner.sun_times(location, date)
        } else {
            None
        }
    }
}
