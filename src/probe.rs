use std::path::Path;
use std::process::Command;

use serde::Deserialize;

pub const PROBE: &str = "ffprobe";

#[derive(Deserialize, Debug)]
struct FFProbeJsonOutput {
    format: Option<FFProbeJsonFormat>,
}

#[derive(Deserialize, Debug)]
struct FFProbeJsonFormat {
    duration: Option<String>,
}

/// Probes the total duration of a media file in seconds. Every failure mode
/// (probe missing, nonzero exit, unparsable output) collapses to 0.0; the
/// conversion is still attempted and percentages are simply not reported.
pub fn probe_duration(path: &Path) -> f64 {
    let output = Command::new(PROBE)
        .args([
            "-v", "quiet",
            "-of", "json",
            "-show_format",
        ])
        .arg(path)
        .output();
    match output {
        Ok(output) if output.status.success() => {
            match String::from_utf8(output.stdout) {
                Ok(utf8) => parse_duration(&utf8),
                Err(_) => 0.0,
            }
        },
        _ => 0.0,
    }
}

fn parse_duration(json: &str) -> f64 {
    match serde_json::from_str::<FFProbeJsonOutput>(json) {
        Ok(deserialized) => deserialized
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0),
        Err(_) => 0.0,
    }
}
