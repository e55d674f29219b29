use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_noise_cli"))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("noise-cli-{}-{}", std::process::id(), name))
}

/// Write a 16-bit WAV holding `seconds` of a 440 Hz tone per channel
fn write_tone_wav(path: &PathBuf, channels: u16, seconds: u32, amplitude: f32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for i in 0..(8000 * seconds) {
        let t = i as f32 / 8000.0;
        let value = amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
        let sample = (value * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(sample).expect("write sample");
        }
    }
    writer.finalize().expect("finalize wav");
}

#[test]
fn analyze_outputs_json_lines_and_summary() {
    let wav = temp_path("tone.wav");
    write_tone_wav(&wav, 2, 3, 0.2);

    let output = cli()
        .args(["analyze", "--wav", wav.to_str().unwrap()])
        .output()
        .expect("analyze command");
    let _ = std::fs::remove_file(&wav);

    assert!(
        output.status.success(),
        "analyze exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    let lines: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();

    assert_eq!(lines.len(), 4, "three chunks plus summary: {stdout}");
    assert_eq!(lines[1]["timestamp_ms"], 1000);

    // 0.2 amplitude sine: RMS 0.1414, about 77 dB
    let db = lines[0]["instantaneous_db"].as_f64().unwrap();
    assert!((db - 77.0).abs() < 0.2, "{db}");
    let description = lines[0]["classification"]["description"].as_str().unwrap();
    assert!(!description.is_empty());

    let summary = &lines[3]["summary"];
    assert_eq!(summary["chunk_count"], 3);
    assert_eq!(summary["sample_rate"], 8000);
    assert_eq!(summary["overall"]["category"], "Noisy");
    assert!(summary["stats"]["std_dev"].as_f64().unwrap() < 0.1);
}

#[test]
fn analyze_honours_chunk_ms() {
    let wav = temp_path("chunks.wav");
    write_tone_wav(&wav, 1, 2, 0.01);

    let output = cli()
        .args(["analyze", "--wav", wav.to_str().unwrap(), "--chunk-ms", "500"])
        .output()
        .expect("analyze command");
    let _ = std::fs::remove_file(&wav);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    assert_eq!(stdout.lines().count(), 5);
}

#[test]
fn analyze_missing_file_fails() {
    let output = cli()
        .args(["analyze", "--wav", "/nonexistent/recording.wav"])
        .output()
        .expect("analyze command");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn classify_prints_level_result() {
    let output = cli()
        .args(["classify", "--db", "65"])
        .output()
        .expect("classify command");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["category"], "Normal");
    assert_eq!(value["decibels"], 65.0);
    assert!(value["noise_type"].is_null());
    assert!(value["description"].is_null());
}

#[test]
fn classify_rejects_negative_level() {
    let output = cli()
        .args(["classify", "--db", "-3"])
        .output()
        .expect("classify command");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn classify_uses_config_thresholds() {
    let config = temp_path("thresholds.json");
    std::fs::write(
        &config,
        r#"{"classifier": {"quiet_upper_db": 70.0, "normal_upper_db": 90.0}}"#,
    )
    .unwrap();

    let output = cli()
        .args(["classify", "--db", "65", "--config", config.to_str().unwrap()])
        .output()
        .expect("classify command");
    let _ = std::fs::remove_file(&config);

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["category"], "Quiet");
}

#[test]
fn config_prints_defaults() {
    let output = cli().arg("config").output().expect("config command");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["level"]["calibration_offset_db"], 94.0);
    assert_eq!(value["spectral"]["fft_size"], 2048);
    assert_eq!(value["smoothing"]["window_size"], 10);
}
