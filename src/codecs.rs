use std::fmt::Display;

use crate::error::SettingsError;

/// Output video codecs. Each entry maps to a fixed ffmpeg encoder plus the
/// profile and pixel-format flags that encoder requires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VideoCodec {
    DnxhrSq,
    DnxhrHq,
    DnxhrHqx,
    Prores,
    H264,
    H265,
    Vp9,
    Av1,
}

impl VideoCodec {
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        match s.to_lowercase().as_str() {
            "dnxhr_sq" => Ok(VideoCodec::DnxhrSq),
            "dnxhr_hq" => Ok(VideoCodec::DnxhrHq),
            "dnxhr_hqx" => Ok(VideoCodec::DnxhrHqx),
            "prores" => Ok(VideoCodec::Prores),
            "h264" => Ok(VideoCodec::H264),
            "h265" | "hevc" => Ok(VideoCodec::H265),
            "vp9" => Ok(VideoCodec::Vp9),
            "av1" => Ok(VideoCodec::Av1),
            _ => Err(SettingsError::UnknownVideoCodec(String::from(s))),
        }
    }

    pub fn parameters(&self) -> Vec<String> {
        match self {
            VideoCodec::DnxhrSq => vec![
                String::from("-c:v"), String::from("dnxhd"),
                String::from("-profile:v"), String::from("dnxhr_sq"),
                String::from("-pix_fmt"), String::from("yuv422p"),
            ],
            VideoCodec::DnxhrHq => vec![
                String::from("-c:v"), String::from("dnxhd"),
                String::from("-profile:v"), String::from("dnxhr_hq"),
                String::from("-pix_fmt"), String::from("yuv422p"),
            ],
            VideoCodec::DnxhrHqx => vec![
                String::from("-c:v"), String::from("dnxhd"),
                String::from("-profile:v"), String::from("dnxhr_hqx"),
                String::from("-pix_fmt"), String::from("yuv422p10le"),
            ],
            VideoCodec::Prores => vec![
                String::from("-c:v"), String::from("prores_ks"),
                String::from("-profile:v"), String::from("2"),
                String::from("-pix_fmt"), String::from("yuv422p10le"),
            ],
            VideoCodec::H264 => vec![
                String::from("-c:v"), String::from("libx264"),
                String::from("-preset"), String::from("medium"),
                String::from("-crf"), String::from("18"),
                String::from("-pix_fmt"), String::from("yuv420p"),
            ],
            VideoCodec::H265 => vec![
                String::from("-c:v"), String::from("libx265"),
                String::from("-preset"), String::from("medium"),
                String::from("-crf"), String::from("20"),
                String::from("-pix_fmt"), String::from("yuv420p"),
            ],
            VideoCodec::Vp9 => vec![
                String::from("-c:v"), String::from("libvpx-vp9"),
                String::from("-crf"), String::from("30"),
                String::from("-b:v"), String::from("0"),
                String::from("-pix_fmt"), String::from("yuv420p"),
            ],
            VideoCodec::Av1 => vec![
                String::from("-c:v"), String::from("libsvtav1"),
                String::from("-preset"), String::from("6"),
                String::from("-crf"), String::from("30"),
                String::from("-pix_fmt"), String::from("yuv420p10le"),
            ],
        }
    }
}

impl Display for VideoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VideoCodec::DnxhrSq => "dnxhr_sq",
            VideoCodec::DnxhrHq => "dnxhr_hq",
            VideoCodec::DnxhrHqx => "dnxhr_hqx",
            VideoCodec::Prores => "prores",
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
            VideoCodec::Vp9 => "vp9",
            VideoCodec::Av1 => "av1",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(VideoCodec::from_str("dnxhr_hqx").unwrap(), VideoCodec::DnxhrHqx);
        assert_eq!(VideoCodec::from_str("HEVC").unwrap(), VideoCodec::H265);
        assert!(VideoCodec::from_str("mpeg2").is_err());
    }

    #[test]
    fn test_parameters_start_with_encoder() {
        for codec in [
            VideoCodec::DnxhrSq, VideoCodec::DnxhrHq, VideoCodec::DnxhrHqx,
            VideoCodec::Prores, VideoCodec::H264, VideoCodec::H265,
            VideoCodec::Vp9, VideoCodec::Av1,
        ] {
            let params = codec.parameters();
            assert_eq!(params[0], "-c:v");
            assert!(params.contains(&String::from("-pix_fmt")));
        }
    }

    #[test]
    fn test_dnxhr_profiles() {
        assert!(VideoCodec::DnxhrSq.parameters().contains(&String::from("dnxhr_sq")));
        assert!(VideoCodec::DnxhrHqx.parameters().contains(&String::from("yuv422p10le")));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", VideoCodec::Prores), "prores");
        assert_eq!(format!("{}", VideoCodec::DnxhrSq), "dnxhr_sq");
    }
}
