//! Interval energy forecasts built on the position, irradiance and sun-times
//! components.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, error, warn};

use crate::angles;
use crate::error::ForecastError;
use crate::irradiance::ClearSkyModel;
use crate::sun_times::SunTimesProvider;
use crate::types::{
    ForecastInterval, ForecastResult, ForecastSummary, Location, NightPolicy, PanelConfig,
    StepLength, StepStatus,
};

/// Irradiance at Standard Test Conditions (W/m²).
pub const STC_IRRADIANCE_W_M2: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSettings {
    pub step: StepLength,
    pub night_policy: NightPolicy,
    pub model: ClearSkyModel,
    /// Irradiance at which the panel delivers its rated power.
    pub stc_irradiance_w_m2: f64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            step: StepLength::default(),
            night_policy: NightPolicy::default(),
            model: ClearSkyModel::default(),
            stc_irradiance_w_m2: STC_IRRADIANCE_W_M2,
        }
    }
}

/// Linear panel model: rated power scaled by irradiance relative to STC,
/// capped at rated power. Ignores temperature and inverter losses.
///
/// Any non-finite or non-positive ratio, including a zero STC reference,
/// yields zero.
pub fn power_output_kw(rated_power_kw: f64, irradiance_w_m2: f64, stc_irradiance_w_m2: f64) -> f64 {
    let ratio = irradiance_w_m2 / stc_irradiance_w_m2;
    // `f64::min` would turn NaN into 1.0.
    if !(ratio.is_finite() && ratio > 0.0) {
        return 0.0;
    }
    let power = rated_power_kw * ratio.min(1.0);
    if power.is_finite() {
        power.clamp(0.0, rated_power_kw)
    } else {
        0.0
    }
}

pub fn energy_kwh(power_kw: f64, step: StepLength) -> f64 {
    power_kw * step.hours()
}

/// Stateless forecaster. Holds only its sun-times source and tuning.
#[derive(Debug, Clone)]
pub struct ForecastEngine<P> {
    provider: P,
    settings: ForecastSettings,
}

impl<P: SunTimesProvider> ForecastEngine<P> {
    pub fn new(provider: P, settings: ForecastSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Forecast from the current instant.
    pub fn forecast_now(&self, location: &Location, panel: &PanelConfig) -> ForecastResult {
        self.forecast(location, panel, &Utc::now())
    }

    /// Forecast from `start`. Never fails: any engine-level error is logged
    /// and reported as the empty result.
    pub fn forecast<T: TimeZone>(
        &self,
        location: &Location,
        panel: &PanelConfig,
        start: &DateTime<T>,
    ) -> ForecastResult {
        let start = start.with_timezone(&location.timezone);
        match self.try_forecast(location, panel, &start) {
            Ok(result) => result,
            Err(err) => {
                error!(%start, error = %err, "forecast failed, reporting no data");
                ForecastResult::empty(start, start.date_naive(), self.settings.step)
            }
        }
    }

    pub fn try_forecast<T: TimeZone>(
        &self,
        location: &Location,
        panel: &PanelConfig,
        start: &DateTime<T>,
    ) -> Result<ForecastResult, ForecastError> {
        let step = self.settings.step;
        let start = start.with_timezone(&location.timezone);
        let today = start.date_naive();

        let Some(today_times) = self.provider.sun_times(location, today) else {
            debug!(%today, "no sunrise/sunset, forecast is empty");
            return Ok(ForecastResult::empty(start, today, step));
        };

        let past_sunset = start >= today_times.sunset;
        let mut forecast_date = today;
        let mut times = today_times;
        if past_sunset {
            let tomorrow = today
                .succ_opt()
                .ok_or(ForecastError::DateOutOfRange(today))?;
            match self.provider.sun_times(location, tomorrow) {
                Some(next) => {
                    debug!(%start, %tomorrow, "past sunset, forecasting next day");
                    forecast_date = tomorrow;
                    times = next;
                }
                None => {
                    warn!(%start, %tomorrow, "past sunset and next day has no sun times, keeping today's");
                }
            }
        }

        let full_day = self.full_day_series(location, panel, forecast_date)?;
        let remaining = if past_sunset {
            Vec::new()
        } else {
            let mut remaining =
                remaining_suffix(&full_day, &start, step, &today_times.sunset).to_vec();
            if let Some(first) = remaining.first_mut() {
                prorate_from(first, &start, step);
            }
            remaining
        };

        let remaining_energy_kwh = total_energy(&remaining);
        let full_day_energy_kwh = total_energy(&full_day);
        debug!(
            %forecast_date,
            remaining_kwh = remaining_energy_kwh,
            full_day_kwh = full_day_energy_kwh,
            remaining_intervals = remaining.len(),
            full_day_intervals = full_day.len(),
            "forecast complete"
        );

        Ok(ForecastResult {
            remaining_energy_kwh,
            full_day_energy_kwh,
            remaining,
            full_day,
            sunrise: Some(times.sunrise),
            sunset: Some(times.sunset),
            forecast_date,
            start,
            step_minutes: step.minutes(),
        })
    }

    /// 24 hours of fixed steps from local midnight of `date`.
    pub fn full_day_series(
        &self,
        location: &Location,
        panel: &PanelConfig,
        date: NaiveDate,
    ) -> Result<Vec<ForecastInterval>, ForecastError> {
        let step = self.settings.step;
        let mut at = local_midnight(&location.timezone, date)?;
        let mut series = Vec::with_capacity(step.steps_per_day());

        for _ in 0..step.steps_per_day() {
            let interval = self.interval_at(location, panel, at);
            if !(self.settings.night_policy == NightPolicy::Skip
                && interval.status == StepStatus::Night)
            {
                series.push(interval);
            }
            at = at
                .checked_add_signed(step.duration())
                .ok_or_else(|| ForecastError::TimestampOverflow(at.to_rfc3339()))?;
        }
        Ok(series)
    }

    /// Position → irradiance → power → energy for one step.
    pub fn interval_at(
        &self,
        location: &Location,
        panel: &PanelConfig,
        at: DateTime<Tz>,
    ) -> ForecastInterval {
        let settings = &self.settings;
        let position = match angles::solar_position(location.latitude, location.longitude, &at) {
            Ok(position) => position,
            Err(err) => {
                debug!(%at, error = %err, "step contributes zero");
                return ForecastInterval {
                    timestamp: at,
                    solar_elevation: 0.0,
                    solar_azimuth: 0.0,
                    irradiance_w_m2: 0.0,
                    power_kw: 0.0,
                    energy_kwh: 0.0,
                    status: StepStatus::PositionFailed,
                };
            }
        };

        let irradiance = settings
            .model
            .irradiance(&position, panel.tilt, panel.orientation);
        let power = power_output_kw(panel.rated_power_kw, irradiance, settings.stc_irradiance_w_m2);
        let status = if position.is_above_horizon() {
            StepStatus::Daylight
        } else {
            StepStatus::Night
        };

        debug!(
            %at,
            elevation = position.elevation,
            azimuth = position.azimuth,
            irradiance,
            power_kw = power,
            "forecast step"
        );

        ForecastInterval {
            timestamp: at,
            solar_elevation: position.elevation,
            solar_azimuth: position.azimuth,
            irradiance_w_m2: irradiance,
            power_kw: power,
            energy_kwh: energy_kwh(power, settings.step),
            status,
        }
    }
}

impl ForecastResult {
    /// Summary of the full-day series.
    pub fn summary(&self) -> ForecastSummary {
        ForecastSummary::from_series(&self.full_day)
    }

    pub fn remaining_summary(&self) -> ForecastSummary {
        ForecastSummary::from_series(&self.remaining)
    }
}

impl ForecastSummary {
    pub fn from_series(series: &[ForecastInterval]) -> Self {
        let mut peak: Option<&ForecastInterval> = None;
        for interval in series {
            if peak.map_or(true, |p| interval.power_kw > p.power_kw) {
                peak = Some(interval);
            }
        }
        let peak_elevation = series
            .iter()
            .map(|i| i.solar_elevation)
            .fold(f64::NEG_INFINITY, f64::max);

        let average_power_kw = if series.is_empty() {
            0.0
        } else {
            series.iter().map(|i| i.power_kw).sum::<f64>() / series.len() as f64
        };

        Self {
            total_energy_kwh: total_energy(series),
            peak_power_kw: peak.map_or(0.0, |p| p.power_kw),
            peak_time: peak.map(|p| p.timestamp),
            peak_elevation: if series.is_empty() { 0.0 } else { peak_elevation },
            average_power_kw,
            productive_intervals: series.iter().filter(|i| i.power_kw > 0.0).count(),
        }
    }
}

/// Left-Riemann sum of interval energies.
pub fn total_energy(series: &[ForecastInterval]) -> f64 {
    series.iter().map(|i| i.energy_kwh).sum()
}

/// The slice of `full_day` from the step containing `start` up to, not
/// including, the first step at or after `sunset`.
///
/// Bounded by the forecast day: where sunset falls after local midnight the
/// suffix ends at the last step of the day, short of sunset.
fn remaining_suffix<'a>(
    full_day: &'a [ForecastInterval],
    start: &DateTime<Tz>,
    step: StepLength,
    sunset: &DateTime<Tz>,
) -> &'a [ForecastInterval] {
    let first = full_day.partition_point(|i| i.timestamp + step.duration() <= *start);
    let end = full_day.partition_point(|i| i.timestamp < *sunset);
    if first >= end {
        &[]
    } else {
        &full_day[first..end]
    }
}

/// Scales the energy of the step containing `start` down to the part of the
/// step still ahead of it. Steps beginning at or after `start` are untouched.
fn prorate_from(interval: &mut ForecastInterval, start: &DateTime<Tz>, step: StepLength) {
    let elapsed = start.signed_duration_since(interval.timestamp);
    if elapsed <= Duration::zero() {
        return;
    }
    let step_ms = step.duration().num_milliseconds() as f64;
    let ahead = (step_ms - elapsed.num_milliseconds() as f64) / step_ms;
    interval.energy_kwh *= ahead.clamp(0.0, 1.0);
}

/// Midnight at the start of `date`. Where a DST transition skips midnight,
/// the first valid instant of the day is used.
fn local_midnight(tz: &Tz, date: NaiveDate) -> Result<DateTime<Tz>, ForecastError> {
    let unresolvable = || ForecastError::UnresolvableMidnight {
        date,
        timezone: tz.name().to_string(),
    };
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(unresolvable)?;
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => Ok(t),
        LocalResult::None => {
            let later = date.and_hms_opt(1, 0, 0).ok_or_else(unresolvable)?;
            tz.from_local_datetime(&later).earliest().ok_or_else(unresolvable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_is_capped_at_rated() {
        assert_eq!(power_output_kw(10.0, 1400.0, STC_IRRADIANCE_W_M2), 10.0);
        assert_eq!(power_output_kw(10.0, 500.0, STC_IRRADIANCE_W_M2), 5.0);
        assert_eq!(power_output_kw(10.0, 0.0, STC_IRRADIANCE_W_M2), 0.0);
    }

    #[test]
    fn power_ignores_nonsense_irradiance() {
        assert_eq!(power_output_kw(10.0, -50.0, STC_IRRADIANCE_W_M2), 0.0);
        assert_eq!(power_output_kw(10.0, f64::NAN, STC_IRRADIANCE_W_M2), 0.0);
        assert_eq!(power_output_kw(10.0, f64::INFINITY, STC_IRRADIANCE_W_M2), 0.0);
    }

    #[test]
    fn zero_stc_reference_gives_no_power() {
        assert_eq!(power_output_kw(10.0, 0.0, 0.0), 0.0);
        assert_eq!(power_output_kw(10.0, 800.0, 0.0), 0.0);
        assert_eq!(power_output_kw(10.0, 800.0, -1000.0), 0.0);
    }

    #[test]
    fn energy_uses_step_fraction_of_hour() {
        assert!((energy_kwh(6.0, StepLength::FifteenMinutes) - 1.5).abs() < 1e-12);
        assert!((energy_kwh(6.0, StepLength::FiveMinutes) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn midnight_skipped_by_dst_falls_forward() {
        // Asia/Beirut springs forward at 00:00 (2026-03-29).
        let tz: Tz = "Asia/Beirut".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
        let t = local_midnight(&tz, date).unwrap();
        assert_eq!(t.date_naive(), date);
    }

    #[test]
    fn empty_summary_is_zero() {
        let s = ForecastSummary::from_series(&[]);
        assert_eq!(s.total_energy_kwh, 0.0);
        assert_eq!(s.peak_power_kw, 0.0);
        assert!(s.peak_time.is_none());
        assert_eq!(s.average_power_kw, 0.0);
    }
}
