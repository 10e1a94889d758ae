use std::io::Write as _;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` (newline-terminated) by persisting a sibling temp file.
pub fn write_atomic_text(path: &Path, contents: &str) -> anyhow::Result<()> {
    let Some(parent) = path.parent() else {
        anyhow::bail!("invalid path for atomic write: {}", path.display());
    };
    std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .context("write temp file")?;
    if !contents.ends_with('\n') {
        tmp.write_all(b"\n").context("write temp newline")?;
    }
    tmp.as_file().sync_all().context("sync temp file")?;

    tmp.persist(path).map_err(|err| {
        anyhow::Error::new(err.error).context(format!("persist file to {}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), "wrote file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn creates_parent_dir_and_terminates_with_newline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".questioninput").join("config.toml");

        write_atomic_text(&path, "clear_on_send = true").expect("write atomic");

        let contents = std::fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "clear_on_send = true\n");
    }

    #[test]
    fn replaces_existing_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "placeholder = \"old\"\nclear_on_send = false\n").expect("seed");

        write_atomic_text(&path, "placeholder = \"new\"\n").expect("write atomic");

        let contents = std::fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "placeholder = \"new\"\n");
    }
}
