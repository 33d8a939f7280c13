use std::path::Path;
use std::process;

use solar_forecast::{next_sunset, ForecastConfig, ForecastEngine, NoaaSunTimes, StepStatus};

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match ForecastConfig::from_toml_file(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => ForecastConfig::default(),
    };

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    let setup = match config.build() {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let engine = ForecastEngine::new(NoaaSunTimes, setup.settings);
    let result = engine.forecast_now(&setup.location, &setup.panel);
    let loc = &setup.location;

    println!("=== Clear-Sky Production Forecast ===");
    println!(
        "Location: {:.2}°, {:.2}° ({})",
        loc.latitude,
        loc.longitude,
        loc.timezone.name()
    );
    println!(
        "Panel: tilt {:.0}°, orientation {:.0}°, {:.1} kW rated",
        setup.panel.tilt, setup.panel.orientation, setup.panel.rated_power_kw
    );
    println!("Now: {}", result.start);
    println!("Forecast date: {}", result.forecast_date);

    if result.is_empty() {
        println!();
        println!("No sunrise or sunset on this date, nothing to forecast.");
        return;
    }
    if let (Some(sunrise), Some(sunset)) = (result.sunrise, result.sunset) {
        println!(
            "Sunrise: {}  Sunset: {}",
            sunrise.format("%H:%M"),
            sunset.format("%H:%M")
        );
    }

    println!();
    println!("--- Daylight intervals ---");
    println!("{:>6} {:>8} {:>8} {:>9} {:>8}", "Time", "Elev°", "Azim°", "W/m²", "kW");
    for i in result
        .full_day
        .iter()
        .filter(|i| i.status == StepStatus::Daylight)
    {
        println!(
            "{:>6} {:>8.2} {:>8.2} {:>9.1} {:>8.3}",
            i.timestamp.format("%H:%M"),
            i.solar_elevation,
            i.solar_azimuth,
            i.irradiance_w_m2,
            i.power_kw
        );
    }

    let summary = result.summary();
    println!();
    println!("--- Summary ---");
    println!("Remaining today: {:.2} kWh", result.remaining_energy_kwh);
    println!("Full day:        {:.2} kWh", result.full_day_energy_kwh);
    println!("Peak power:      {:.2} kW", summary.peak_power_kw);
    if let Some(peak) = summary.peak_time {
        println!("Peak at:         {}", peak.format("%H:%M"));
    }
    println!("Average power:   {:.2} kW", summary.average_power_kw);

    if let Some(countdown) = next_sunset(&NoaaSunTimes, loc, &result.start) {
        println!("Next sunset in:  {countdown}");
    }
}
