//! Input file discovery.

use std::path::{Path, PathBuf};

use musubi_parse::tokenizer;
use walkdir::WalkDir;

const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "sub", "ass", "ssa", "idx", "smi"];

fn is_video(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| tokenizer::strip_extension(n).1)
        .is_some_and(|ext| !SUBTITLE_EXTENSIONS.contains(&ext))
}

/// Video files named by `paths`. Directories are walked recursively in
/// file name order; files are taken as given.
pub fn collect_videos(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            tracing::warn!(path = %path.display(), "Path does not exist, skipping");
            continue;
        }
        tracing::info!(path = %path.display(), "Scanning folder");
        let before = files.len();
        files.extend(
            WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_video(e.path()))
                .map(|e| e.into_path()),
        );
        tracing::debug!(path = %path.display(), found = files.len() - before, "Folder scanned");
    }
    files
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_video_extensions() {
        assert!(is_video(Path::new("Show.S01E01.mkv")));
        assert!(is_video(Path::new("Show.S01E01.MP4")));
        assert!(!is_video(Path::new("Show.S01E01.srt")));
        assert!(!is_video(Path::new("notes.txt")));
    }

    #[test]
    fn test_collect_walks_folders() {
        let dir = tempfile::tempdir().unwrap();
        let season = dir.path().join("Season 1");
        fs::create_dir(&season).unwrap();
        for name in ["b.S01E02.mkv", "a.S01E01.mkv", "a.S01E01.srt", "cover.jpg"] {
            fs::write(season.join(name), b"").unwrap();
        }
        let missing = dir.path().join("missing");

        let files = collect_videos(&[dir.path().to_path_buf(), missing]);
        assert_eq!(
            files,
            vec![season.join("a.S01E01.mkv"), season.join("b.S01E02.mkv")]
        );
    }
}
