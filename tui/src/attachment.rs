//! Image attachment selection and validation.
//!
//! A [`SelectedFile`] is whatever the file input produced: a path plus its size on disk. The
//! validator turns it into an [`Attachment`] or an [`AttachmentRejected`] reason. Only the size is
//! checked here; the `image/*` restriction belongs to the file input (see
//! [`crate::clipboard_paste::is_image_path`]).

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

/// Largest accepted attachment, in bytes (5 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

/// Message surfaced inline when a file exceeds [`MAX_ATTACHMENT_BYTES`].
pub const FILE_TOO_LARGE_MESSAGE: &str = "File size exceeds 5MB limit.";

/// A candidate file picked by the user, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }

    /// Stat `path` to learn its size.
    pub fn from_path(path: &Path) -> Result<Self, SelectFileError> {
        let metadata = std::fs::metadata(path).map_err(|source| SelectFileError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(SelectFileError::NotAFile(path.to_path_buf()));
        }
        Ok(Self::new(path, metadata.len()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectFileError {
    #[error("failed to read metadata for {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),
}

/// A validated file staged for the next send.
///
/// Only [`validate_attachment`] constructs this, so every held attachment is within
/// [`MAX_ATTACHMENT_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    path: PathBuf,
    size_bytes: u64,
}

impl Attachment {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Why a selected file was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRejected {
    message: String,
}

impl AttachmentRejected {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AttachmentRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub fn validate_attachment(file: SelectedFile) -> Result<Attachment, AttachmentRejected> {
    if file.size_bytes > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentRejected {
            message: FILE_TOO_LARGE_MESSAGE.to_string(),
        });
    }
    Ok(Attachment {
        path: file.path,
        size_bytes: file.size_bytes,
    })
}

/// Human readable size, e.g. `1.5 MiB`.
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exactly_five_mib_is_accepted() {
        let attachment =
            validate_attachment(SelectedFile::new("/tmp/a.png", MAX_ATTACHMENT_BYTES))
                .expect("boundary size should be accepted");
        assert_eq!(attachment.size_bytes(), 5 * 1024 * 1024);
        assert_eq!(attachment.path(), Path::new("/tmp/a.png"));
    }

    #[test]
    fn one_byte_over_is_rejected_with_fixed_message() {
        let err = validate_attachment(SelectedFile::new("/tmp/a.png", MAX_ATTACHMENT_BYTES + 1))
            .expect_err("oversize file should be rejected");
        assert_eq!(err.message(), "File size exceeds 5MB limit.");
    }

    #[test]
    fn empty_file_is_accepted() {
        assert!(validate_attachment(SelectedFile::new("/tmp/empty.png", 0)).is_ok());
    }

    #[test]
    fn from_path_reads_size_and_rejects_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pic.png");
        std::fs::write(&path, [0u8; 42]).expect("write");

        let file = SelectedFile::from_path(&path).expect("stat file");
        assert_eq!(file.size_bytes, 42);

        let err = SelectedFile::from_path(dir.path()).expect_err("directory is not a file");
        assert!(matches!(err, SelectFileError::NotAFile(_)));
    }

    #[test]
    fn format_size_picks_unit() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(1024 * 1024), "1.0 MiB");
    }
}
