use std::fmt::Display;

use crate::error::SettingsError;

/// Output audio codecs. `Copy` passes the source stream through unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AudioCodec {
    Pcm,
    Aac,
    Mp3,
    Flac,
    Opus,
    Vorbis,
    Copy,
}

impl AudioCodec {
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        match s.to_lowercase().as_str() {
            "pcm" => Ok(AudioCodec::Pcm),
            "aac" => Ok(AudioCodec::Aac),
            "mp3" => Ok(AudioCodec::Mp3),
            "flac" => Ok(AudioCodec::Flac),
            "opus" => Ok(AudioCodec::Opus),
            "vorbis" => Ok(AudioCodec::Vorbis),
            "copy" => Ok(AudioCodec::Copy),
            _ => Err(SettingsError::UnknownAudioCodec(String::from(s))),
        }
    }

    /// The bitrate flag applies only to lossy encoders; pcm and flac take no
    /// bitrate, and copy re-encodes nothing.
    pub fn parameters(&self, bitrate: &str) -> Vec<String> {
        match self {
            AudioCodec::Pcm => vec![
                String::from("-c:a"), String::from("pcm_s16le"),
            ],
            AudioCodec::Aac => vec![
                String::from("-c:a"), String::from("aac"),
                String::from("-b:a"), String::from(bitrate),
            ],
            AudioCodec::Mp3 => vec![
                String::from("-c:a"), String::from("libmp3lame"),
                String::from("-b:a"), String::from(bitrate),
            ],
            AudioCodec::Flac => vec![
                String::from("-c:a"), String::from("flac"),
            ],
            AudioCodec::Opus => vec![
                String::from("-c:a"), String::from("libopus"),
                String::from("-b:a"), String::from(bitrate),
            ],
            AudioCodec::Vorbis => vec![
                String::from("-c:a"), String::from("libvorbis"),
                String::from("-b:a"), String::from(bitrate),
            ],
            AudioCodec::Copy => vec![
                String::from("-c:a"), String::from("copy"),
            ],
        }
    }
}

impl Display for AudioCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AudioCodec::Pcm => "pcm",
            AudioCodec::Aac => "aac",
            AudioCodec::Mp3 => "mp3",
            AudioCodec::Flac => "flac",
            AudioCodec::Opus => "opus",
            AudioCodec::Vorbis => "vorbis",
            AudioCodec::Copy => "copy",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(AudioCodec::from_str("Opus").unwrap(), AudioCodec::Opus);
        assert!(AudioCodec::from_str("wma").is_err());
    }

    #[test]
    fn test_bitrate_only_for_lossy() {
        assert!(AudioCodec::Aac.parameters("192k").contains(&String::from("192k")));
        assert!(AudioCodec::Vorbis.parameters("128k").contains(&String::from("-b:a")));
        assert!(!AudioCodec::Pcm.parameters("192k").contains(&String::from("-b:a")));
        assert!(!AudioCodec::Flac.parameters("192k").contains(&String::from("-b:a")));
    }

    #[test]
    fn test_copy_is_passthrough() {
        assert_eq!(AudioCodec::Copy.parameters("320k"), vec!["-c:a", "copy"]);
    }
}
