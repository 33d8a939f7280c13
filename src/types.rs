use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Observer location. The timezone is parsed once, at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Tz,
}

impl Location {
    /// Builds a location from coordinates in degrees and an IANA timezone name.
    pub fn new(latitude: f64, longitude: f64, timezone: &str) -> Result<Self, ConfigError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ConfigError::new("location.latitude", "must be in [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ConfigError::new("location.longitude", "must be in [-180, 180]"));
        }
        let timezone = timezone.parse::<Tz>().map_err(|_| {
            ConfigError::new(
                "location.timezone",
                format!("unknown IANA timezone \"{timezone}\""),
            )
        })?;
        Ok(Self {
            latitude,
            longitude,
            timezone,
        })
    }
}

/// Fixed panel geometry and nameplate power.
///
/// `orientation` is a compass bearing: 0° = North, 90° = East, 180° = South.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelConfig {
    pub tilt: f64,
    pub orientation: f64,
    pub rated_power_kw: f64,
}

impl PanelConfig {
    pub fn new(tilt: f64, orientation: f64, rated_power_kw: f64) -> Result<Self, ConfigError> {
        if !(0.0..=90.0).contains(&tilt) {
            return Err(ConfigError::new("panel.tilt", "must be in [0, 90]"));
        }
        if !(0.0..360.0).contains(&orientation) {
            return Err(ConfigError::new("panel.orientation", "must be in [0, 360)"));
        }
        if !(rated_power_kw > 0.0 && rated_power_kw.is_finite()) {
            return Err(ConfigError::new("panel.rated_power_kw", "must be > 0"));
        }
        Ok(Self {
            tilt,
            orientation,
            rated_power_kw,
        })
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            tilt: 30.0,
            orientation: 180.0,
            rated_power_kw: 10.0,
        }
    }
}

/// Sun position in horizontal coordinates, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolarPosition {
    pub elevation: f64,
    /// Compass bearing, 0° = North, clockwise, in `[0, 360)`.
    pub azimuth: f64,
}

impl SolarPosition {
    pub fn zenith(&self) -> f64 {
        90.0 - self.elevation
    }

    pub fn is_above_horizon(&self) -> bool {
        self.elevation > 0.0
    }
}

/// Sun events for one calendar date at one location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunTimes {
    pub sunrise: DateTime<Tz>,
    pub sunset: DateTime<Tz>,
    pub dawn: Option<DateTime<Tz>>,
    pub dusk: Option<DateTime<Tz>>,
}

impl SunTimes {
    pub fn daylight(&self) -> Duration {
        self.sunset.signed_duration_since(self.sunrise)
    }
}

/// Forecast step length. Only the two resolutions the engine is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepLength {
    FiveMinutes,
    #[default]
    FifteenMinutes,
}

impl StepLength {
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            5 => Some(Self::FiveMinutes),
            15 => Some(Self::FifteenMinutes),
            _ => None,
        }
    }

    pub fn minutes(self) -> u32 {
        match self {
            Self::FiveMinutes => 5,
            Self::FifteenMinutes => 15,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::minutes(i64::from(self.minutes()))
    }

    pub fn hours(self) -> f64 {
        f64::from(self.minutes()) / 60.0
    }

    pub fn steps_per_day(self) -> usize {
        (1440 / self.minutes()) as usize
    }
}

/// What the series do with steps where the sun is below the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NightPolicy {
    /// Record a zero-power interval, keeping the series continuous.
    #[default]
    ZeroFill,
    /// Leave night steps out of the series.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Daylight,
    Night,
    /// The position could not be computed; the step contributes nothing.
    PositionFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastInterval {
    pub timestamp: DateTime<Tz>,
    pub solar_elevation: f64,
    pub solar_azimuth: f64,
    pub irradiance_w_m2: f64,
    pub power_kw: f64,
    pub energy_kwh: f64,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Energy from the start instant until sunset (kWh).
    pub remaining_energy_kwh: f64,
    /// Energy for the whole forecast date (kWh).
    pub full_day_energy_kwh: f64,
    /// Steps of the full-day grid from the one containing `start` until
    /// sunset. The first step's energy covers only the part after `start`.
    /// Never extends past the end of the forecast day, even where sunset
    /// falls after local midnight.
    pub remaining: Vec<ForecastInterval>,
    pub full_day: Vec<ForecastInterval>,
    pub sunrise: Option<DateTime<Tz>>,
    pub sunset: Option<DateTime<Tz>>,
    pub forecast_date: NaiveDate,
    pub start: DateTime<Tz>,
    pub step_minutes: u32,
}

impl ForecastResult {
    /// The degraded shape: no series, zero totals.
    pub fn empty(start: DateTime<Tz>, forecast_date: NaiveDate, step: StepLength) -> Self {
        Self {
            remaining_energy_kwh: 0.0,
            full_day_energy_kwh: 0.0,
            remaining: Vec::new(),
            full_day: Vec::new(),
            sunrise: None,
            sunset: None,
            forecast_date,
            start,
            step_minutes: step.minutes(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full_day.is_empty() && self.remaining.is_empty()
    }
}

/// Scalars a presentation layer usually shows next to a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub total_energy_kwh: f64,
    pub peak_power_kw: f64,
    pub peak_time: Option<DateTime<Tz>>,
    pub peak_elevation: f64,
    pub average_power_kw: f64,
    pub productive_intervals: usize,
}
