//! Clear-sky solar production forecasting for fixed-tilt panels.

pub mod angles;
pub mod config;
pub mod error;
pub mod forecast;
pub mod irradiance;
pub mod sun_times;
pub mod types;

pub use angles::{
    deg_to_rad, hour_angle, julian_day, normalize_angle, rad_to_deg, solar_azimuth,
    solar_elevation, solar_position, SunCoordinates, DEGREES_PER_HOUR, OBLIQUITY_OF_ECLIPTIC,
};

pub use config::{ForecastConfig, ForecastSetup};
pub use error::{ConfigError, ForecastError, PositionError};

pub use forecast::{
    energy_kwh, power_output_kw, total_energy, ForecastEngine, ForecastSettings,
    STC_IRRADIANCE_W_M2,
};

pub use irradiance::{incidence_cosine, ClearSkyModel, Extinction};

pub use sun_times::{next_sunset, NoaaSunTimes, SunTimesProvider, SunsetCountdown};

pub use types::{
    ForecastInterval, ForecastResult, ForecastSummary, Location, NightPolicy, PanelConfig,
    SolarPosition, StepLength, StepStatus, SunTimes,
};
