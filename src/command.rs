use std::path::Path;
use std::process::Command;

use crate::settings::Settings;

pub const ENCODER: &str = "ffmpeg";

/// Builds the ordered ffmpeg argument list for one conversion. Ordering is
/// deterministic: input, overwrite, progress redirection, filters, frame
/// rate, video codec group, threads, audio codec group, destination last.
pub fn build_args(source: &Path, destination: &Path, settings: &Settings) -> Vec<String> {
    let mut args = vec![
        String::from("-hide_banner"),
        String::from("-nostats"),
        String::from("-loglevel"), String::from("warning"),
        String::from("-progress"), String::from("pipe:1"),
        String::from("-y"),
        String::from("-i"), source.to_string_lossy().into_owned(),
    ];

    // fit within the target box, preserve aspect, never upscale
    if let Some((width, height)) = settings.target_resolution.dimensions() {
        args.push(String::from("-vf"));
        args.push(format!(
            "scale=min(iw\\,{}):min(ih\\,{}):force_original_aspect_ratio=decrease",
            width, height
        ));
    }

    if let Some(fps) = settings.target_fps.value() {
        args.push(String::from("-r"));
        args.push(fps.to_string());
    }

    args.append(&mut settings.video_codec.parameters());

    // each encoder process uses every core it can get
    args.push(String::from("-threads"));
    args.push(String::from("0"));

    args.append(&mut settings.audio_codec.parameters(&settings.audio_bitrate));

    args.push(destination.to_string_lossy().into_owned());
    args
}

pub fn encoder_available() -> bool {
    let cmd = Command::new(ENCODER)
        .arg("-version")
        .output();
    match cmd {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}
