//! Candidate file discovery for directory mode.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::image_pipeline::raw::types::PixelFormat;

/// Regular files directly inside `dir` whose suffix marks them as `format`.
///
/// Not recursive. Sorted by path so runs are reproducible. Unreadable
/// entries are logged and skipped.
pub fn discover_files(dir: &Path, format: PixelFormat) -> Vec<PathBuf> {
    let marker = format.file_marker();
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if has_marker(entry.path(), marker) {
            files.push(entry.into_path());
        } else {
            debug!(path = %entry.path().display(), "Ignoring file without {} suffix", marker);
        }
    }

    files.sort();
    files
}

/// Case-insensitive substring test on the final suffix. A name without a dot
/// is tested whole.
pub fn has_marker(path: &Path, marker: &str) -> bool {
    let suffix = path
        .extension()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().to_lowercase());
    suffix.is_some_and(|s| s.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::raw::types::CfaPattern;

    #[test]
    fn test_has_marker() {
        assert!(has_marker(Path::new("a/frame.nv12"), "nv12"));
        assert!(has_marker(Path::new("frame.NV12"), "nv12"));
        assert!(has_marker(Path::new("frame.yuv_nv12"), "nv12"));
        assert!(has_marker(Path::new("frame.RAW10"), "raw"));
        assert!(has_marker(Path::new("rawframe"), "raw"));
        assert!(!has_marker(Path::new("raw.bin"), "raw"));
        assert!(!has_marker(Path::new("frame.jpg"), "nv12"));
    }

    #[test]
    fn test_discovers_matching_files_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.raw", "a.RAW", "c.nv12", "d.jpg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.raw")).unwrap();
        std::fs::write(dir.path().join("nested.raw").join("e.raw"), b"x").unwrap();

        let bayer = discover_files(dir.path(), PixelFormat::Bayer(CfaPattern::Rggb));
        assert_eq!(bayer, vec![dir.path().join("a.RAW"), dir.path().join("b.raw")]);

        let nv21 = discover_files(dir.path(), PixelFormat::Nv21);
        assert_eq!(nv21, vec![dir.path().join("c.nv12")]);
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_files(&dir.path().join("absent"), PixelFormat::Nv12).is_empty());
    }
}
