use std::fs;
use std::path::{Path, PathBuf};

pub enum DirEntryCategory {
    DoesNotExist,
    RegularFile,
    SymbolicLink,
    Directory,
    Unknown,
}

pub fn classify_file(path: &Path) -> DirEntryCategory {
    match fs::symlink_metadata(path) {
        Ok(metadata) => {
            if metadata.is_symlink() {
                DirEntryCategory::SymbolicLink
            } else if metadata.is_file() {
                DirEntryCategory::RegularFile
            } else if metadata.is_dir() {
                DirEntryCategory::Directory
            } else {
                DirEntryCategory::Unknown
            }
        },
        Err(_) => DirEntryCategory::DoesNotExist,
    }
}

pub fn is_video_file(path: &Path) -> bool {
    match path.extension() {
        None => false,
        Some(ext) => matches!(
            ext.to_string_lossy().to_lowercase().as_str(),
            "mp4" | "mkv" | "mov"
        ),
    }
}

/// Collects video files from a directory, sorted by name so the queue order is
/// stable across runs. Not recursive.
pub fn collect_video_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in fs::read_dir(dir)?.filter_map(|e| e.ok()) {
        if let Ok(ft) = entry.file_type() {
            if ft.is_file() && is_video_file(&entry.path()) {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("clip.mp4")));
        assert!(is_video_file(Path::new("clip.MKV")));
        assert!(is_video_file(Path::new("/a/b/clip.mov")));
        assert!(!is_video_file(Path::new("notes.txt")));
        assert!(!is_video_file(Path::new("noext")));
    }

    #[test]
    fn test_collect_video_files_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.mp4", "a.mkv", "notes.txt", "c.mov"] {
            File::create(tmp.path().join(name)).unwrap();
        }
        let files = collect_video_files(tmp.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mkv", "b.mp4", "c.mov"]);
    }

    #[test]
    fn test_classify_missing_path() {
        assert!(matches!(
            classify_file(Path::new("/nonexistent/path")),
            DirEntryCategory::DoesNotExist
        ));
    }
}
