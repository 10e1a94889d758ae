use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de;

/// Routing identifier of the conversation a question belongs to.
///
/// The host hands this to the composer as an opaque string and receives it back, unchanged, on
/// every emitted send. An empty identifier is never constructed: callers go through
/// [`ConversationId::new`], which maps `""` to `None` so "no conversation" is always represented
/// as an absent value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(#[serde(deserialize_with = "deserialize_non_empty")] String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() { None } else { Some(Self(id)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = String::deserialize(deserializer)?;
    if id.is_empty() {
        return Err(de::Error::invalid_value(
            de::Unexpected::Str(""),
            &"a non-empty conversation id",
        ));
    }
    Ok(id)
}

/// Deserialize an optional id, reading `""` the same as a missing id.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<ConversationId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(ConversationId::new))
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConversationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
