#[macro_use]
mod common;

use solar_forecast::irradiance::*;
use solar_forecast::SolarPosition;

fn pos(elevation: f64, azimuth: f64) -> SolarPosition {
    SolarPosition { elevation, azimuth }
}

fn models() -> [ClearSkyModel; 2] {
    [ClearSkyModel::beam_only(), ClearSkyModel::enhanced()]
}

// ── Horizon ──

#[test]
fn test_zero_at_or_below_horizon_for_all_panels() {
    for model in models() {
        for elevation in [-30.0, -0.5, 0.0] {
            for tilt in [0.0, 30.0, 60.0, 90.0] {
                for orientation in [0.0, 90.0, 180.0, 270.0] {
                    assert_eq!(
                        model.irradiance(&pos(elevation, 180.0), tilt, orientation),
                        0.0
                    );
                }
            }
        }
    }
}

#[test]
fn test_never_negative() {
    for model in models() {
        for elevation in (1..=90).step_by(7) {
            for azimuth in (0..360).step_by(30) {
                for tilt in [0.0, 45.0, 90.0] {
                    for orientation in [0.0, 135.0, 180.0, 315.0] {
                        let irr = model.irradiance(
                            &pos(elevation as f64, azimuth as f64),
                            tilt,
                            orientation,
                        );
                        assert!(irr >= 0.0 && irr.is_finite(), "irr={}", irr);
                    }
                }
            }
        }
    }
}

// ── Beam-only model ──

#[test]
fn test_beam_only_zenith_on_flat_panel() {
    let expected = 900.0 * (-0.14_f64).exp();
    assert_approx!(
        ClearSkyModel::beam_only().irradiance(&pos(90.0, 180.0), 0.0, 180.0),
        expected,
        1e-6
    );
}

#[test]
fn test_panel_facing_sun_receives_full_dni() {
    let model = ClearSkyModel::beam_only();
    let sun = pos(40.0, 135.0);
    let dni = model.direct_normal(model.air_mass(40.0));
    assert_approx!(model.irradiance(&sun, 50.0, 135.0), dni, 1e-6);
}

#[test]
fn test_south_beats_north_at_northern_noon() {
    let model = ClearSkyModel::beam_only();
    let noon = pos(60.0, 180.0);
    assert!(model.irradiance(&noon, 30.0, 180.0) > model.irradiance(&noon, 30.0, 0.0));
}

#[test]
fn test_higher_sun_gives_more_dni() {
    let model = ClearSkyModel::beam_only();
    let mut last = 0.0;
    for elevation in [2.0, 10.0, 30.0, 60.0, 90.0] {
        let dni = model.direct_normal(model.air_mass(elevation));
        assert!(dni > last, "elevation={} dni={}", elevation, dni);
        last = dni;
    }
}

#[test]
fn test_air_mass_cap_applies_below_threshold() {
    let model = ClearSkyModel::beam_only();
    // 1 / sin(5.74°) is about 10.
    assert_eq!(model.air_mass(2.0), model.air_mass_cap);
    assert!(model.air_mass(10.0) < model.air_mass_cap);
}

// ── Diffuse terms ──

#[test]
fn test_enhanced_exceeds_beam_only() {
    let sun = pos(45.0, 200.0);
    assert!(
        ClearSkyModel::enhanced().irradiance(&sun, 30.0, 180.0)
            > ClearSkyModel::beam_only().irradiance(&sun, 30.0, 180.0)
    );
}

#[test]
fn test_diffuse_reaches_panel_facing_away_from_sun() {
    let sun = pos(30.0, 90.0);
    assert_eq!(ClearSkyModel::beam_only().irradiance(&sun, 90.0, 270.0), 0.0);
    assert!(ClearSkyModel::enhanced().irradiance(&sun, 90.0, 270.0) > 0.0);
}

#[test]
fn test_custom_exponential_extinction() {
    let model = ClearSkyModel {
        dni_scale_w_m2: 1000.0,
        extinction: Extinction::Exponential { coefficient: 0.0 },
        ..ClearSkyModel::beam_only()
    };
    assert_approx!(model.irradiance(&pos(90.0, 0.0), 0.0, 180.0), 1000.0, 1e-9);
}

#[test]
fn test_presets_by_name() {
    for name in ClearSkyModel::PRESETS {
        assert!(ClearSkyModel::from_preset(name).is_some(), "{}", name);
    }
    assert!(ClearSkyModel::from_preset("cloudy").is_none());
    assert_eq!(ClearSkyModel::default(), ClearSkyModel::beam_only());
}
