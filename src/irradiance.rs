//! Clear-sky irradiance on a tilted plane.
//!
//! Output is an idealised upper bound: no clouds, aerosols or measured
//! weather are modelled.

use serde::Deserialize;

use crate::angles::deg_to_rad;
use crate::types::SolarPosition;

/// How direct-normal irradiance decays with air mass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extinction {
    /// `exp(-coefficient · AM)`
    Exponential { coefficient: f64 },
    /// `base ^ (AM ^ exponent)`
    PowerLaw { base: f64, exponent: f64 },
}

impl Extinction {
    pub fn transmission(&self, air_mass: f64) -> f64 {
        match *self {
            Self::Exponential { coefficient } => (-coefficient * air_mass).exp(),
            Self::PowerLaw { base, exponent } => base.powf(air_mass.powf(exponent)),
        }
    }
}

/// Tunable clear-sky model.
///
/// The diffuse terms use an isotropic sky: sky diffuse scales with
/// `(1 + cos tilt) / 2` and ground reflection with `(1 - cos tilt) / 2`.
/// With `diffuse_base_w_m2`, `diffuse_fraction` and `albedo` all zero the
/// model is beam-only, which is the default.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClearSkyModel {
    /// DNI at zero air mass before extinction (W/m²).
    pub dni_scale_w_m2: f64,
    pub extinction: Extinction,
    /// Upper bound on `1 / sin(elevation)` near the horizon.
    pub air_mass_cap: f64,
    /// Constant added to global horizontal irradiance (W/m²).
    pub diffuse_base_w_m2: f64,
    /// Share of global horizontal irradiance arriving as sky diffuse.
    pub diffuse_fraction: f64,
    /// Ground reflectance.
    pub albedo: f64,
}

impl ClearSkyModel {
    pub const PRESETS: &'static [&'static str] = &["beam_only", "enhanced"];

    /// Direct beam only: `DNI = 900 · exp(-0.14 · AM)`.
    pub fn beam_only() -> Self {
        Self {
            dni_scale_w_m2: 900.0,
            extinction: Extinction::Exponential { coefficient: 0.14 },
            air_mass_cap: 10.0,
            diffuse_base_w_m2: 0.0,
            diffuse_fraction: 0.0,
            albedo: 0.0,
        }
    }

    /// Power-law extinction plus sky diffuse and ground reflection.
    /// Produces materially higher daily totals than [`Self::beam_only`].
    pub fn enhanced() -> Self {
        Self {
            dni_scale_w_m2: 1150.0,
            extinction: Extinction::PowerLaw {
                base: 0.78,
                exponent: 0.62,
            },
            air_mass_cap: 10.0,
            diffuse_base_w_m2: 160.0,
            diffuse_fraction: 0.25,
            albedo: 0.25,
        }
    }

    pub fn from_preset(name: &str) -> Option<Self> {
        match name {
            "beam_only" => Some(Self::beam_only()),
            "enhanced" => Some(Self::enhanced()),
            _ => None,
        }
    }

    pub fn air_mass(&self, elevation: f64) -> f64 {
        (1.0 / deg_to_rad(elevation).sin()).min(self.air_mass_cap)
    }

    pub fn direct_normal(&self, air_mass: f64) -> f64 {
        self.dni_scale_w_m2 * self.extinction.transmission(air_mass)
    }

    /// Plane-of-array irradiance in W/m². Zero when the sun is at or below
    /// the horizon, never negative.
    pub fn irradiance(&self, position: &SolarPosition, tilt: f64, orientation: f64) -> f64 {
        // Negated comparison so a NaN elevation also yields zero.
        if !(position.elevation > 0.0) {
            return 0.0;
        }

        let sin_elevation = deg_to_rad(position.elevation).sin();
        let cos_tilt = deg_to_rad(tilt).cos();

        let dni = self.direct_normal(self.air_mass(position.elevation));
        let beam = dni * incidence_cosine(position, tilt, orientation);

        let ghi = dni * sin_elevation + self.diffuse_base_w_m2;
        let sky = self.diffuse_fraction * ghi * (1.0 + cos_tilt) / 2.0;
        let ground = self.albedo * ghi * (1.0 - cos_tilt) / 2.0;

        let total = beam + sky + ground;
        if total.is_finite() {
            total.max(0.0)
        } else {
            0.0
        }
    }
}

impl Default for ClearSkyModel {
    fn default() -> Self {
        Self::beam_only()
    }
}

/// Cosine of the angle between the sun vector and the panel normal,
/// clamped at zero when the sun is behind the panel plane.
pub fn incidence_cosine(position: &SolarPosition, tilt: f64, orientation: f64) -> f64 {
    let elev = deg_to_rad(position.elevation);
    let tilt = deg_to_rad(tilt);
    let az_diff = deg_to_rad(position.azimuth - orientation);
    (elev.sin() * tilt.cos() + elev.cos() * tilt.sin() * az_diff.cos()).max(0.0)
}
