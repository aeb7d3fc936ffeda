//! End-to-end tests of the subcommands on temporary files.

use renderer::png::PNG_SIGNATURE;
use renderer::PlotStyle;
use spectral::SpectrumConfig;
use test_utils::{equatorial_wave, latitudes, longitudes, white_noise, WaveSpec};
use wave_dispersion::DispersionConfig;
use wk_spectrum::{
    dispersion_overrides, run_dispersion, run_spectrum, run_style, FieldInput, PngOptions,
    SpectrumComponent, SpectrumJob,
};

fn small_config() -> SpectrumConfig {
    SpectrumConfig {
        chunk_length: 60,
        chunk_stride: 30,
        ..SpectrumConfig::default()
    }
}

fn write_field(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let lats = latitudes(9, 20.0);
    let lons = longitudes(16);
    let wave = WaveSpec {
        wavenumber: 2,
        period_steps: 12.0,
        ..WaveSpec::default()
    };
    let field = equatorial_wave(120, &lats, lons.len(), wave)
        + white_noise((120, lats.len(), lons.len()), 0.1, 11);
    let input = FieldInput::from_field(lats, lons, &field);

    let path = dir.path().join("field.json");
    std::fs::write(&path, serde_json::to_string(&input).unwrap()).unwrap();
    path
}

// ============================================================================
// spectrum
// ============================================================================

#[test]
fn test_spectrum_command_writes_json_and_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_field(&dir);
    let output = dir.path().join("spectrum.json");
    let png_path = dir.path().join("spectrum.png");

    let job = SpectrumJob {
        input,
        output: output.clone(),
        lat_range: (-15.0, 15.0),
        png: Some(PngOptions {
            path: png_path.clone(),
            width: 64,
            height: 48,
            colormap: Default::default(),
            component: SpectrumComponent::Symmetric,
        }),
    };

    let spectrum = run_spectrum(&job, small_config()).unwrap();

    // 4 samples per day, period 12 steps -> 1/3 cycles per day at wavenumber 2
    let (freq, wn, _) = spectrum.peak(&spectrum.symmetric).unwrap();
    assert_eq!(wn, 2);
    assert!((freq - 1.0 / 3.0).abs() < 1e-9);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["wavenumbers"].as_array().unwrap().len(), spectrum.wavenumbers.len());
    assert_eq!(written["frequencies"].as_array().unwrap().len(), 29);
    assert!(written.get("background").is_some());

    let png = std::fs::read(&png_path).unwrap();
    assert_eq!(&png[..8], &PNG_SIGNATURE);
}

#[test]
fn test_spectrum_command_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("field.json");
    std::fs::write(
        &input,
        r#"{"lat": [0.0], "lon": [0.0, 180.0], "time_steps": 3, "data": [1.0, 2.0]}"#,
    )
    .unwrap();

    let job = SpectrumJob {
        input,
        output: dir.path().join("spectrum.json"),
        lat_range: (-15.0, 15.0),
        png: None,
    };

    assert!(run_spectrum(&job, small_config()).is_err());
    assert!(!dir.path().join("spectrum.json").exists());
}

// ============================================================================
// dispersion
// ============================================================================

#[test]
fn test_dispersion_command_writes_curves() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("curves.json");
    let config = DispersionConfig {
        n_planetary_waves: 21,
        equivalent_depths: vec![25.0],
        ..DispersionConfig::default()
    };

    let curves = run_dispersion(&output, config).unwrap();
    assert_eq!(curves.frequencies.dim(), (6, 1, 21));

    // undefined branches are NaN, which JSON writes as null
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["equivalent_depths"], serde_json::json!([25.0]));
    assert_eq!(written["wave_types"][4], "kelvin");
    assert_eq!(curves.wave_types.len(), 6);
}

#[test]
fn test_dispersion_overrides_keep_configured_values() {
    let configured = DispersionConfig {
        n_planetary_waves: 31,
        equivalent_depths: vec![90.0, 8.0],
        ..DispersionConfig::default()
    };

    let untouched = dispersion_overrides(configured.clone(), None, None).unwrap();
    assert_eq!(untouched, configured);

    let overridden = dispersion_overrides(configured, Some("40, 20"), Some(11)).unwrap();
    assert_eq!(overridden.equivalent_depths, vec![40.0, 20.0]);
    assert_eq!(overridden.n_planetary_waves, 11);

    assert!(dispersion_overrides(DispersionConfig::default(), Some("50,deep"), None).is_err());
}

#[test]
fn test_dispersion_command_rejects_negative_depth() {
    let dir = tempfile::tempdir().unwrap();
    let config = DispersionConfig {
        equivalent_depths: vec![-10.0],
        ..DispersionConfig::default()
    };
    assert!(run_dispersion(&dir.path().join("curves.json"), config).is_err());
}

// ============================================================================
// style
// ============================================================================

#[test]
fn test_style_command_writes_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("figures.mplstyle");

    run_style(&output, &PlotStyle::new(18, true)).unwrap();

    let sheet = std::fs::read_to_string(&output).unwrap();
    assert!(sheet.contains("font.size: 18\n"));
    assert!(sheet.contains("axes.titlesize: 26\n"));
    assert!(sheet.contains("text.usetex: True\n"));
}
