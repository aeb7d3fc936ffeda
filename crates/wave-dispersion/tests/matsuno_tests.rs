//! Tests for the full dispersion curve computation.

use test_utils::assert_approx_eq;
use wave_dispersion::{DispersionConfig, EquatorialWaveDispersion, WaveType};

fn curves(config: DispersionConfig) -> wave_dispersion::DispersionCurves {
    EquatorialWaveDispersion::new(config).unwrap().compute()
}

// ============================================================================
// Shapes and axes
// ============================================================================

#[test]
fn test_default_shapes() {
    let curves = curves(DispersionConfig::default());
    assert_eq!(curves.frequencies.dim(), (6, 3, 50));
    assert_eq!(curves.wavenumbers.dim(), (6, 3, 50));
    assert_eq!(curves.wave_types, WaveType::ALL.to_vec());

    assert_approx_eq!(curves.wavenumbers[[0, 0, 0]], -20.0, 1e-12);
    assert_approx_eq!(curves.wavenumbers[[5, 2, 49]], 20.0, 1e-12);
}

#[test]
fn test_subset_of_wave_types() {
    let curves = curves(DispersionConfig {
        n_wave_types: 2,
        ..Default::default()
    });
    assert_eq!(curves.wave_types, vec![WaveType::Mrg, WaveType::IgN0]);
    assert_eq!(curves.frequencies.dim(), (2, 3, 50));
    assert!(curves.curve(WaveType::Kelvin, 0).is_none());
}

#[test]
fn test_too_many_wave_types_rejected() {
    let config = DispersionConfig {
        n_wave_types: 7,
        ..Default::default()
    };
    assert!(EquatorialWaveDispersion::new(config).is_err());
}

// ============================================================================
// Physics
// ============================================================================

#[test]
fn test_kelvin_is_linear_in_wavenumber() {
    let curves = curves(DispersionConfig::default());
    let (s, freq) = curves.curve(WaveType::Kelvin, 0).unwrap();

    // 50 m equivalent depth: one planetary wave per ~21 days
    let slope = 0.047_792_154_852;
    for (s, f) in s.iter().zip(freq.iter()) {
        assert_approx_eq!(*f, slope * s, 1e-9);
    }
}

#[test]
fn test_undefined_branches_are_nan() {
    let curves = curves(DispersionConfig::default());

    for wave in [WaveType::Mrg, WaveType::ErN1] {
        let (s, freq) = curves.curve(wave, 1).unwrap();
        for (s, f) in s.iter().zip(freq.iter()) {
            if *s > 0.0 {
                assert!(f.is_nan(), "{} at s={} should be undefined", wave, s);
            } else {
                assert!(*f > 0.0);
            }
        }
    }

    let (s, freq) = curves.curve(WaveType::IgN0, 1).unwrap();
    for (s, f) in s.iter().zip(freq.iter()) {
        assert_eq!(f.is_nan(), *s < 0.0);
    }
}

#[test]
fn test_zero_wavenumber_with_odd_sampling() {
    let curves = curves(DispersionConfig {
        n_planetary_waves: 41,
        ..Default::default()
    });
    let (s, mrg) = curves.curve(WaveType::Mrg, 0).unwrap();
    let (_, ig0) = curves.curve(WaveType::IgN0, 0).unwrap();
    assert_eq!(s[20], 0.0);

    // Both branches meet at sqrt(c·beta)
    assert_approx_eq!(mrg[20], 0.309_587_609_736, 1e-9);
    assert_approx_eq!(ig0[20], mrg[20], 1e-15);
}

#[test]
fn test_shallower_depth_is_slower() {
    let curves = curves(DispersionConfig::default());
    let (_, deep) = curves.curve(WaveType::Kelvin, 0).unwrap();
    let (_, shallow) = curves.curve(WaveType::Kelvin, 2).unwrap();
    assert!(shallow[49] < deep[49]);
}

#[test]
fn test_curves_serialize() {
    let json = curves(DispersionConfig::default()).to_json().unwrap();
    assert!(json.contains("\"kelvin\""));
    assert!(json.contains("equivalent_depths"));
}
