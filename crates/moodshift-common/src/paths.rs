//! Path utilities for recognizing audio uploads by extension.
//!
//! The backend accepts a fixed set of audio containers. These helpers let
//! the client reject obviously unsupported files before uploading them and
//! label the multipart file part with a sensible MIME type.

use std::path::Path;

/// List of audio file extensions the processing backend accepts.
const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "ogg", "flac"];

/// Lowercased extension of a path, if it has one.
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Check if a path has a supported audio file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use moodshift_common::paths::is_audio_file;
///
/// assert!(is_audio_file(Path::new("song.mp3")));
/// assert!(is_audio_file(Path::new("/path/to/TAKE.WAV")));
/// assert!(!is_audio_file(Path::new("notes.txt")));
/// ```
pub fn is_audio_file(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Check a path against a caller-supplied extension allow-list.
///
/// Comparison is case-insensitive. An empty list allows everything.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use moodshift_common::paths::has_allowed_extension;
///
/// let allowed = vec!["wav".to_string(), "flac".to_string()];
/// assert!(has_allowed_extension(Path::new("a.FLAC"), &allowed));
/// assert!(!has_allowed_extension(Path::new("a.mp3"), &allowed));
/// assert!(has_allowed_extension(Path::new("a.mp3"), &[]));
/// ```
pub fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    extension_of(path)
        .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)))
        .unwrap_or(false)
}

/// MIME type to declare for an uploaded audio file.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use moodshift_common::paths::audio_mime_type;
///
/// assert_eq!(audio_mime_type(Path::new("song.mp3")), "audio/mpeg");
/// assert_eq!(audio_mime_type(Path::new("blob")), "application/octet-stream");
/// ```
pub fn audio_mime_type(path: &Path) -> &'static str {
    match extension_of(path).as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Get the list of audio file extensions.
#[must_use]
pub fn audio_extensions() -> &'static [&'static str] {
    AUDIO_EXTENSIONS
}
