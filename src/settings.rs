use std::fmt::Display;

use crate::audio::AudioCodec;
use crate::codecs::VideoCodec;
use crate::error::SettingsError;

/// Target resolution for the scale filter. `Original` leaves the video
/// dimensions untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetResolution {
    Original,
    Uhd2160,
    Qhd1440,
    Fhd1080,
    Hd720,
    Sd480,
}

impl TargetResolution {
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        match s.to_lowercase().as_str() {
            "original" => Ok(TargetResolution::Original),
            "3840x2160" | "2160p" | "4k" => Ok(TargetResolution::Uhd2160),
            "2560x1440" | "1440p" => Ok(TargetResolution::Qhd1440),
            "1920x1080" | "1080p" => Ok(TargetResolution::Fhd1080),
            "1280x720" | "720p" => Ok(TargetResolution::Hd720),
            "854x480" | "480p" => Ok(TargetResolution::Sd480),
            _ => Err(SettingsError::UnknownResolution(String::from(s))),
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            TargetResolution::Original => None,
            TargetResolution::Uhd2160 => Some((3840, 2160)),
            TargetResolution::Qhd1440 => Some((2560, 1440)),
            TargetResolution::Fhd1080 => Some((1920, 1080)),
            TargetResolution::Hd720 => Some((1280, 720)),
            TargetResolution::Sd480 => Some((854, 480)),
        }
    }
}

impl Display for TargetResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.dimensions() {
            None => write!(f, "original"),
            Some((w, h)) => write!(f, "{}x{}", w, h),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetFps {
    Original,
    Fps24,
    Fps25,
    Fps30,
    Fps50,
    Fps60,
    Fps120,
}

impl TargetFps {
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        match s.to_lowercase().as_str() {
            "original" => Ok(TargetFps::Original),
            "24" => Ok(TargetFps::Fps24),
            "25" => Ok(TargetFps::Fps25),
            "30" => Ok(TargetFps::Fps30),
            "50" => Ok(TargetFps::Fps50),
            "60" => Ok(TargetFps::Fps60),
            "120" => Ok(TargetFps::Fps120),
            _ => Err(SettingsError::UnknownFps(String::from(s))),
        }
    }

    pub fn value(&self) -> Option<u32> {
        match self {
            TargetFps::Original => None,
            TargetFps::Fps24 => Some(24),
            TargetFps::Fps25 => Some(25),
            TargetFps::Fps30 => Some(30),
            TargetFps::Fps50 => Some(50),
            TargetFps::Fps60 => Some(60),
            TargetFps::Fps120 => Some(120),
        }
    }
}

impl Display for TargetFps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value() {
            None => write!(f, "original"),
            Some(v) => write!(f, "{}", v),
        }
    }
}

/// Policy for deriving the output filename from the source filename.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NamingPattern {
    Overwrite,
    Suffix,
    Prefix,
}

impl NamingPattern {
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        match s.to_lowercase().as_str() {
            "overwrite" | "original" => Ok(NamingPattern::Overwrite),
            "suffix" => Ok(NamingPattern::Suffix),
            "prefix" => Ok(NamingPattern::Prefix),
            _ => Err(SettingsError::UnknownNamingPattern(String::from(s))),
        }
    }
}

/// Immutable snapshot of conversion settings for one run. Validated at the
/// parsing boundary; never mutated mid-run.
#[derive(Clone, Debug)]
pub struct Settings {
    pub video_codec: VideoCodec,
    pub target_resolution: TargetResolution,
    pub target_fps: TargetFps,
    pub audio_codec: AudioCodec,
    pub audio_bitrate: String,
    pub relocate_output: bool,
    pub naming_pattern: NamingPattern,
    pub delete_source_on_success: bool,
    pub shutdown_on_completion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            video_codec: VideoCodec::DnxhrSq,
            target_resolution: TargetResolution::Fhd1080,
            target_fps: TargetFps::Original,
            audio_codec: AudioCodec::Pcm,
            audio_bitrate: String::from("192k"),
            relocate_output: false,
            naming_pattern: NamingPattern::Suffix,
            delete_source_on_success: false,
            shutdown_on_completion: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_from_str() {
        assert_eq!(TargetResolution::from_str("1920x1080").unwrap(), TargetResolution::Fhd1080);
        assert_eq!(TargetResolution::from_str("720p").unwrap(), TargetResolution::Hd720);
        assert_eq!(TargetResolution::from_str("Original").unwrap(), TargetResolution::Original);
        assert!(TargetResolution::from_str("640x480").is_err());
    }

    #[test]
    fn test_fps_from_str() {
        assert_eq!(TargetFps::from_str("30").unwrap().value(), Some(30));
        assert_eq!(TargetFps::from_str("original").unwrap().value(), None);
        assert!(TargetFps::from_str("23.976").is_err());
    }

    #[test]
    fn test_naming_pattern_from_str() {
        assert_eq!(NamingPattern::from_str("suffix").unwrap(), NamingPattern::Suffix);
        assert_eq!(NamingPattern::from_str("original").unwrap(), NamingPattern::Overwrite);
        assert!(NamingPattern::from_str("infix").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", TargetResolution::Sd480), "854x480");
        assert_eq!(format!("{}", TargetFps::Fps120), "120");
    }
}
