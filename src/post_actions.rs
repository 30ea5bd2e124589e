use std::fs;
use std::path::Path;
use std::process::Command;

use log::{info, warn};

use crate::settings::{NamingPattern, Settings};

/// Deletes a successfully converted source file when the settings ask for it.
/// With the overwrite pattern the source path is also the destination, so the
/// file is never deleted. Failure is logged and does not change the job's
/// terminal status.
pub fn delete_source(source: &Path, settings: &Settings) {
    if !settings.delete_source_on_success {
        return;
    }
    if settings.naming_pattern == NamingPattern::Overwrite {
        return;
    }
    match fs::remove_file(source) {
        Ok(()) => info!("deleted source {:?}", source),
        Err(err) => warn!("could not delete source {:?}: {}", source, err),
    }
}

/// Issues one shutdown request to the host. Requires a polkit rule allowing
/// the user to poweroff without root.
pub fn request_shutdown() {
    info!("requesting system shutdown");
    let result = Command::new("systemctl")
        .args(["poweroff", "-i"])
        .status();
    if let Err(err) = result {
        warn!("shutdown request failed: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn settings(delete: bool, pattern: NamingPattern) -> Settings {
        let mut settings = Settings::default();
        settings.delete_source_on_success = delete;
        settings.naming_pattern = pattern;
        settings
    }

    #[test]
    fn test_deletes_when_requested() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("clip.mp4");
        File::create(&source).unwrap();

        delete_source(&source, &settings(true, NamingPattern::Suffix));
        assert!(!source.exists());
    }

    #[test]
    fn test_keeps_source_by_default() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("clip.mp4");
        File::create(&source).unwrap();

        delete_source(&source, &settings(false, NamingPattern::Suffix));
        assert!(source.exists());
    }

    #[test]
    fn test_never_deletes_with_overwrite_pattern() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("clip.mov");
        File::create(&source).unwrap();

        delete_source(&source, &settings(true, NamingPattern::Overwrite));
        assert!(source.exists());
    }

    #[test]
    fn test_missing_source_does_not_panic() {
        let settings = settings(true, NamingPattern::Prefix);
        delete_source(Path::new("/nonexistent/clip.mp4"), &settings);
    }
}
