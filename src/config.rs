//! TOML forecast configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::forecast::{ForecastSettings, STC_IRRADIANCE_W_M2};
use crate::irradiance::{ClearSkyModel, Extinction};
use crate::types::{Location, NightPolicy, PanelConfig, StepLength};

/// Top-level forecast configuration parsed from TOML.
///
/// Every section has defaults, so an empty document is a valid
/// configuration for the reference site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub panel: PanelSection,
    #[serde(default)]
    pub forecast: ForecastSection,
    /// Full model override; takes precedence over `forecast.model`.
    #[serde(default)]
    pub model: Option<ClearSkyModel>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name.
    pub timezone: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: 45.76,
            longitude: 21.42,
            timezone: "Europe/Bucharest".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelSection {
    /// Degrees from horizontal.
    pub tilt: f64,
    /// Compass bearing the panel faces (180 = South).
    pub orientation: f64,
    pub rated_power_kw: f64,
}

impl Default for PanelSection {
    fn default() -> Self {
        let panel = PanelConfig::default();
        Self {
            tilt: panel.tilt,
            orientation: panel.orientation,
            rated_power_kw: panel.rated_power_kw,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastSection {
    /// 5 or 15.
    pub interval_minutes: u32,
    pub night_policy: NightPolicy,
    /// Model preset name, see [`ClearSkyModel::PRESETS`].
    pub model: String,
    pub stc_irradiance_w_m2: f64,
}

impl Default for ForecastSection {
    fn default() -> Self {
        Self {
            interval_minutes: StepLength::default().minutes(),
            night_policy: NightPolicy::default(),
            model: "beam_only".to_string(),
            stc_irradiance_w_m2: STC_IRRADIANCE_W_M2,
        }
    }
}

/// Validated, ready-to-use engine inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSetup {
    pub location: Location,
    pub panel: PanelConfig,
    pub settings: ForecastSettings,
}

impl ForecastConfig {
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns every violated constraint.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let loc = &self.location;
        if let Err(e) = Location::new(loc.latitude, loc.longitude, &loc.timezone) {
            errors.push(e);
        }

        let p = &self.panel;
        if let Err(e) = PanelConfig::new(p.tilt, p.orientation, p.rated_power_kw) {
            errors.push(e);
        }

        let f = &self.forecast;
        if StepLength::from_minutes(f.interval_minutes).is_none() {
            errors.push(ConfigError::new(
                "forecast.interval_minutes",
                format!("must be 5 or 15, got {}", f.interval_minutes),
            ));
        }
        if !(f.stc_irradiance_w_m2 > 0.0) {
            errors.push(ConfigError::new("forecast.stc_irradiance_w_m2", "must be > 0"));
        }

        match &self.model {
            Some(model) => errors.extend(validate_model(model)),
            None => {
                if ClearSkyModel::from_preset(&f.model).is_none() {
                    errors.push(ConfigError::new(
                        "forecast.model",
                        format!(
                            "unknown model \"{}\", available: {}",
                            f.model,
                            ClearSkyModel::PRESETS.join(", ")
                        ),
                    ));
                }
            }
        }

        errors
    }

    /// Validates and converts into engine inputs.
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    pub fn build(&self) -> Result<ForecastSetup, ConfigError> {
        if let Some(err) = self.validate().into_iter().next() {
            return Err(err);
        }

        let loc = &self.location;
        let p = &self.panel;
        let f = &self.forecast;
        let model = match self.model {
            Some(model) => model,
            None => ClearSkyModel::from_preset(&f.model).unwrap_or_default(),
        };

        Ok(ForecastSetup {
            location: Location::new(loc.latitude, loc.longitude, &loc.timezone)?,
            panel: PanelConfig::new(p.tilt, p.orientation, p.rated_power_kw)?,
            settings: ForecastSettings {
                step: StepLength::from_minutes(f.interval_minutes).unwrap_or_default(),
                night_policy: f.night_policy,
                model,
                stc_irradiance_w_m2: f.stc_irradiance_w_m2,
            },
        })
    }
}

fn validate_model(model: &ClearSkyModel) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    if !(model.dni_scale_w_m2 > 0.0) {
        errors.push(ConfigError::new("model.dni_scale_w_m2", "must be > 0"));
    }
    match model.extinction {
        Extinction::Exponential { coefficient } => {
            if !(coefficient > 0.0 && coefficient.is_finite()) {
                errors.push(ConfigError::new(
                    "model.extinction.coefficient",
                    format!("must be > 0, got {coefficient}"),
                ));
            }
        }
        Extinction::PowerLaw { base, exponent } => {
            if !(base > 0.0 && base < 1.0) {
                errors.push(ConfigError::new(
                    "model.extinction.base",
                    format!("must be in (0, 1), got {base}"),
                ));
            }
            if !(exponent > 0.0 && exponent.is_finite()) {
                errors.push(ConfigError::new(
                    "model.extinction.exponent",
                    format!("must be > 0, got {exponent}"),
                ));
            }
        }
    }
    if !(model.air_mass_cap >= 1.0) {
        errors.push(ConfigError::new("model.air_mass_cap", "must be >= 1"));
    }
    if !(model.diffuse_base_w_m2 >= 0.0) {
        errors.push(ConfigError::new("model.diffuse_base_w_m2", "must be >= 0"));
    }
    if !(0.0..=1.0).contains(&model.diffuse_fraction) {
        errors.push(ConfigError::new("model.diffuse_fraction", "must be in [0.0, 1.0]"));
    }
    if !(0.0..=1.0).contains(&model.albedo) {
        errors.push(ConfigError::new("model.albedo", "must be in [0.0, 1.0]"));
    }
    errors
}
