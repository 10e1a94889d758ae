//! Interpreting pasted text as a file selection.
//!
//! Terminals have no native file picker, so the question input treats a pasted path (drag and
//! drop into most terminal emulators produces one) as a file-input selection.

use std::path::Path;
use std::path::PathBuf;

/// Normalize pasted text that may represent a filesystem path.
///
/// Supports:
/// - `file://` URLs (converted to local paths)
/// - Windows drive and UNC paths, taken verbatim
/// - shell-escaped single paths (via `shlex`)
pub fn normalize_pasted_path(pasted: &str) -> Option<PathBuf> {
    let pasted = pasted.trim();
    if pasted.is_empty() {
        return None;
    }

    if let Ok(url) = url::Url::parse(pasted)
        && url.scheme() == "file"
    {
        return url.to_file_path().ok();
    }

    // POSIX shlex treats backslashes as escapes, which mangles C:\Users\... paths.
    let drive = pasted
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && pasted.get(1..2) == Some(":")
        && matches!(pasted.get(2..3), Some("\\") | Some("/"));
    if drive || pasted.starts_with("\\\\") {
        return Some(PathBuf::from(pasted));
    }

    let mut parts = shlex::Shlex::new(pasted);
    let first = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(PathBuf::from(first))
}

/// Whether the file input should offer `path`: its guessed media type starts with `image/`.
pub fn is_image_path(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[cfg(not(windows))]
    #[test]
    fn normalize_file_url() {
        let result = normalize_pasted_path("file:///tmp/example.png").expect("file URL");
        assert_eq!(result, PathBuf::from("/tmp/example.png"));
    }

    #[test]
    fn normalize_windows_drive_path() {
        let input = r"C:\Temp\example.png";
        let result = normalize_pasted_path(input).expect("windows path");
        assert_eq!(result, PathBuf::from(input));
    }

    #[test]
    fn normalize_shell_escaped_single_path() {
        let result = normalize_pasted_path("/home/user/My\\ File.png").expect("escaped path");
        assert_eq!(result, PathBuf::from("/home/user/My File.png"));
    }

    #[test]
    fn normalize_quoted_path() {
        let result = normalize_pasted_path("'/home/user/My File.png'").expect("quoted path");
        assert_eq!(result, PathBuf::from("/home/user/My File.png"));
    }

    #[test]
    fn multiple_tokens_are_not_a_path() {
        assert_eq!(normalize_pasted_path("/a/b.png /c/d.png"), None);
        assert_eq!(normalize_pasted_path("   "), None);
    }

    #[test]
    fn image_filter_uses_media_type() {
        assert!(is_image_path(Path::new("/a/b/c.PNG")));
        assert!(is_image_path(Path::new("/a/b/c.jpeg")));
        assert!(is_image_path(Path::new("/a/b/c.webp")));
        assert!(!is_image_path(Path::new("/a/b/notes.txt")));
        assert!(!is_image_path(Path::new("/a/b/noext")));
    }
}
