//! Path utilities for detecting and stripping media file extensions.
//!
//! Filenames handed to the parser usually carry a container extension, but
//! a bare release name like `Show.Name.S01E02` must not lose its last dotted
//! segment. Only extensions from the known lists are stripped.

use std::path::Path;

/// List of supported video file extensions.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "m4v", "ts", "webm", "mov", "wmv", "flv", "mpg", "mpeg", "m2ts",
];

/// List of supported subtitle file extensions.
const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "ass", "ssa", "sub", "vtt", "idx"];

fn extension_in(path: &Path, list: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| list.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check if a path has a video file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use reelname_common::paths::is_video_file;
///
/// assert!(is_video_file(Path::new("movie.mkv")));
/// assert!(is_video_file(Path::new("/path/to/video.MP4")));
/// assert!(!is_video_file(Path::new("subtitle.srt")));
/// ```
pub fn is_video_file(path: &Path) -> bool {
    extension_in(path, VIDEO_EXTENSIONS)
}

/// Check if a path has a subtitle file extension.
pub fn is_subtitle_file(path: &Path) -> bool {
    extension_in(path, SUBTITLE_EXTENSIONS)
}

/// Check if a path has any extension reelname knows how to rename.
pub fn is_media_file(path: &Path) -> bool {
    is_video_file(path) || is_subtitle_file(path)
}

/// Remove a trailing media extension from a filename, if present.
///
/// Unknown extensions are left alone so that dotted release names keep
/// their final segment.
///
/// # Examples
///
/// ```
/// use reelname_common::paths::strip_media_extension;
///
/// assert_eq!(strip_media_extension("Inception.2010.1080p.mkv"), "Inception.2010.1080p");
/// assert_eq!(strip_media_extension("Show.Name.S01E02"), "Show.Name.S01E02");
/// ```
pub fn strip_media_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() && is_media_file(Path::new(filename)) => stem,
        _ => filename,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("movie.mkv")));
        assert!(is_video_file(Path::new("movie.m2ts")));
        assert!(is_video_file(Path::new("movie.MKV")));
        assert!(is_video_file(Path::new("relative/path/movie.mp4")));

        assert!(!is_video_file(Path::new("subtitle.srt")));
        assert!(!is_video_file(Path::new("document.txt")));
        assert!(!is_video_file(Path::new("no_extension")));
    }

    #[test]
    fn test_is_subtitle_file() {
        assert!(is_subtitle_file(Path::new("movie.srt")));
        assert!(is_subtitle_file(Path::new("movie.Ass")));
        assert!(!is_subtitle_file(Path::new("movie.mkv")));
    }

    #[test]
    fn test_strip_media_extension() {
        assert_eq!(strip_media_extension("Show.S01E01.mkv"), "Show.S01E01");
        assert_eq!(strip_media_extension("Show.S01E01.en.srt"), "Show.S01E01.en");
        assert_eq!(strip_media_extension("Show.S01E01"), "Show.S01E01");
        assert_eq!(strip_media_extension("Movie.2020.nfo"), "Movie.2020.nfo");
        assert_eq!(strip_media_extension(".mkv"), ".mkv");
        assert_eq!(strip_media_extension(""), "");
    }
}
