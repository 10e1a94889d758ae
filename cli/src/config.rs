use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use toml_edit::Value as TomlValue;
use toml_edit::value;

use crate::atomic_write::write_atomic_text;

const PLACEHOLDER_KEY: &str = "placeholder";
const CLEAR_ON_SEND_KEY: &str = "clear_on_send";

/// Values read from `config.toml`. Anything missing takes its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionInputConfig {
    pub placeholder: Option<String>,
    /// Defaults to `true`.
    pub clear_on_send: bool,
}

impl Default for QuestionInputConfig {
    fn default() -> Self {
        Self {
            placeholder: None,
            clear_on_send: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<QuestionInputConfig> {
        let Some(content) = read_document_string(&self.path)? else {
            return Ok(QuestionInputConfig::default());
        };

        let defaults = QuestionInputConfig::default();
        let doc = match content.parse::<DocumentMut>() {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "config.toml is not valid TOML, reading top-level keys line by line: {err}"
                );
                return Ok(QuestionInputConfig {
                    placeholder: parse_top_level_fallback(&content, PLACEHOLDER_KEY)
                        .and_then(|v| v.as_str().map(str::to_string)),
                    clear_on_send: parse_top_level_fallback(&content, CLEAR_ON_SEND_KEY)
                        .and_then(|v| v.as_bool())
                        .unwrap_or(defaults.clear_on_send),
                });
            }
        };

        Ok(QuestionInputConfig {
            placeholder: read_top_level(&doc, PLACEHOLDER_KEY)
                .and_then(TomlValue::as_str)
                .map(str::to_string),
            clear_on_send: read_top_level(&doc, CLEAR_ON_SEND_KEY)
                .and_then(TomlValue::as_bool)
                .unwrap_or(defaults.clear_on_send),
        })
    }

    pub fn set_placeholder(&self, placeholder: &str) -> anyhow::Result<()> {
        self.update(|doc| doc[PLACEHOLDER_KEY] = value(placeholder))
    }

    pub fn set_clear_on_send(&self, clear_on_send: bool) -> anyhow::Result<()> {
        self.update(|doc| doc[CLEAR_ON_SEND_KEY] = value(clear_on_send))
    }

    /// Rewrite the file with `edit` applied, keeping comments and unrelated keys.
    fn update(&self, edit: impl FnOnce(&mut DocumentMut)) -> anyhow::Result<()> {
        let content = read_document_string(&self.path)?.unwrap_or_default();
        let mut doc = match content.parse::<DocumentMut>() {
            Ok(doc) => doc,
            Err(err) => {
                anyhow::bail!(
                    "refusing to overwrite {} because it is not valid TOML: {err}",
                    self.path.display()
                );
            }
        };
        edit(&mut doc);
        write_atomic_text(&self.path, &doc.to_string())
    }
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".questioninput").join("config.toml")
}

fn read_top_level<'a>(doc: &'a DocumentMut, key: &str) -> Option<&'a TomlValue> {
    doc.get(key).and_then(TomlItem::as_value)
}

/// Find `key = <value>` before the first table header of a file that does not parse as a whole.
fn parse_top_level_fallback(contents: &str, key: &str) -> Option<TomlValue> {
    for line in contents.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            if parse_table_header_name(trimmed).is_some() {
                return None;
            }
            continue;
        }

        let Some((line_key, raw_value)) = trimmed.split_once('=') else {
            continue;
        };
        if line_key.trim() != key {
            continue;
        }

        // Strings may legitimately contain `#`, so try the raw value before stripping a comment.
        if let Ok(parsed) = raw_value.trim().parse::<TomlValue>() {
            return Some(parsed);
        }
        let Some(without_comment) = strip_toml_comment(raw_value) else {
            continue;
        };
        if let Ok(parsed) = without_comment.parse::<TomlValue>() {
            return Some(parsed);
        }
    }

    None
}

fn parse_table_header_name(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if !line.starts_with('[') {
        return None;
    }
    let end = line.find(']')?;
    if end <= 1 {
        return None;
    }
    let name = line[1..end].trim_matches(|c| c == '[' || c == ' ');
    if name.is_empty() {
        return None;
    }
    Some(name)
}

fn strip_toml_comment(line: &str) -> Option<&str> {
    let line = line.split_once('#').map_or(line, |(head, _)| head).trim();
    if line.is_empty() { None } else { Some(line) }
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context("read config.toml")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_with(contents: &str) -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("write config");
        (dir, ConfigStore::new(path))
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("config.toml"));
        assert_eq!(
            store.load().expect("load"),
            QuestionInputConfig {
                placeholder: None,
                clear_on_send: true,
            }
        );
    }

    #[test]
    fn reads_top_level_keys() {
        let (_dir, store) = store_with(
            r#"placeholder = "Ask about the build"
clear_on_send = false

[other]
placeholder = "ignored"
"#,
        );
        assert_eq!(
            store.load().expect("load"),
            QuestionInputConfig {
                placeholder: Some("Ask about the build".to_string()),
                clear_on_send: false,
            }
        );
    }

    #[test]
    fn wrong_value_types_fall_back_to_defaults() {
        let (_dir, store) = store_with("placeholder = 3\nclear_on_send = \"no\"\n");
        assert_eq!(store.load().expect("load"), QuestionInputConfig::default());
    }

    #[test]
    fn preserves_comments_when_setting_values() {
        let (_dir, store) = store_with(
            r#"# top comment
clear_on_send = true # keep me

[other]
key = 1
"#,
        );

        store.set_clear_on_send(false).expect("set clear_on_send");
        store
            .set_placeholder("Type # to tag")
            .expect("set placeholder");

        let updated = std::fs::read_to_string(store.path()).expect("read updated");
        assert!(updated.contains("# top comment"));
        assert!(updated.contains("[other]"));
        assert!(updated.contains("clear_on_send = false"));
        assert_eq!(
            store.load().expect("load"),
            QuestionInputConfig {
                placeholder: Some("Type # to tag".to_string()),
                clear_on_send: false,
            }
        );
    }

    #[test]
    fn setting_creates_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("nested").join("config.toml"));
        store.set_placeholder("Ask away").expect("set placeholder");
        assert_eq!(
            store.load().expect("load").placeholder.as_deref(),
            Some("Ask away")
        );
    }

    #[test]
    fn reads_top_level_keys_when_toml_is_invalid() {
        let (_dir, store) = store_with(
            r#"# broken table header makes this TOML invalid
[other
placeholder = "Still readable" # keep me
clear_on_send = false # keep me

[notice]
clear_on_send = true
"#,
        );
        assert_eq!(
            store.load().expect("load"),
            QuestionInputConfig {
                placeholder: Some("Still readable".to_string()),
                clear_on_send: false,
            }
        );
    }

    #[test]
    fn refuses_to_rewrite_invalid_toml() {
        let contents = "[other\nclear_on_send = true\n";
        let (_dir, store) = store_with(contents);
        assert!(store.set_clear_on_send(false).is_err());
        let unchanged = std::fs::read_to_string(store.path()).expect("read");
        assert_eq!(unchanged, contents);
    }

    #[test]
    fn default_config_path_uses_questioninput_home_dir() {
        let home = Path::new("home");
        assert_eq!(
            default_config_path(home),
            home.join(".questioninput").join("config.toml")
        );
    }
}
