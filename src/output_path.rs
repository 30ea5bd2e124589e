use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::settings::NamingPattern;

/// All outputs use the same editing-suite friendly container, regardless of
/// the input container.
pub const OUTPUT_EXTENSION: &str = "mov";

/// Subdirectory used when outputs are relocated instead of written next to
/// their sources.
pub const RELOCATE_SUBDIR: &str = "transcoded";

/// Derives the destination path for a source file. Creates the relocation
/// subdirectory when needed. No collision detection; the encoder's overwrite
/// flag clobbers an existing destination.
pub fn resolve(
    source_path: &Path,
    output_dir: &Path,
    relocate: bool,
    pattern: NamingPattern,
) -> io::Result<PathBuf> {
    let dir = if relocate {
        let dir = output_dir.join(RELOCATE_SUBDIR);
        if !dir.is_dir() {
            fs::create_dir_all(&dir)?;
        }
        dir
    } else {
        output_dir.to_path_buf()
    };

    let stem = match source_path.file_stem() {
        Some(stem) => stem.to_string_lossy().into_owned(),
        None => String::from("output"),
    };

    let file_name = match pattern {
        NamingPattern::Overwrite => format!("{}.{}", stem, OUTPUT_EXTENSION),
        NamingPattern::Suffix => format!("{}_fixed.{}", stem, OUTPUT_EXTENSION),
        NamingPattern::Prefix => format!("fixed_{}.{}", stem, OUTPUT_EXTENSION),
    };

    Ok(dir.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_pattern() {
        let dest = resolve(
            &PathBuf::from("/videos/clip.mp4"),
            &PathBuf::from("/out"),
            false,
            NamingPattern::Suffix,
        ).unwrap();
        assert_eq!(dest, PathBuf::from("/out/clip_fixed.mov"));
    }

    #[test]
    fn test_prefix_pattern() {
        let dest = resolve(
            &PathBuf::from("/videos/clip.mkv"),
            &PathBuf::from("/out"),
            false,
            NamingPattern::Prefix,
        ).unwrap();
        assert_eq!(dest, PathBuf::from("/out/fixed_clip.mov"));
    }

    #[test]
    fn test_overwrite_keeps_stem() {
        let dest = resolve(
            &PathBuf::from("/videos/clip.mov"),
            &PathBuf::from("/videos"),
            false,
            NamingPattern::Overwrite,
        ).unwrap();
        assert_eq!(dest, PathBuf::from("/videos/clip.mov"));
    }

    #[test]
    fn test_extension_is_fixed() {
        let dest = resolve(
            &PathBuf::from("clip.mkv"),
            &PathBuf::from("/out"),
            false,
            NamingPattern::Suffix,
        ).unwrap();
        assert_eq!(dest.extension().unwrap(), OUTPUT_EXTENSION);
    }

    #[test]
    fn test_relocate_creates_subdir() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = resolve(
            &PathBuf::from("clip.mp4"),
            tmp.path(),
            true,
            NamingPattern::Suffix,
        ).unwrap();
        assert!(tmp.path().join(RELOCATE_SUBDIR).is_dir());
        assert_eq!(dest, tmp.path().join(RELOCATE_SUBDIR).join("clip_fixed.mov"));
    }
}
