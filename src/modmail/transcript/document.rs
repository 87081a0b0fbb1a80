//! Stored log documents
//!
//!     The store has carried a few shapes over time. Deserialization accepts all of them and
//!     normalizes into one model:
//!
//!         - metadata nested under `metadata`, or flattened at the top level
//!         - `mod` for `is_moderator`, `closer` for `closed_by`
//!         - closer given as a name or as an author object
//!         - ids as strings or integers
//!         - attachments as URL strings or `{url, filename, is_image}` objects
//!         - timestamps as RFC 3339, or naive `YYYY-MM-DD HH:MM:SS[.f]` read as UTC
//!
//!     Documents are only read. Nothing here reorders or drops messages.

use crate::modmail::error::Error;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLogDocument")]
pub struct LogDocument {
    pub key: String,
    pub messages: Vec<Message>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub open: bool,
    #[serde(alias = "closer", deserialize_with = "closer_name")]
    pub closed_by: Option<String>,
    #[serde(deserialize_with = "optional_id")]
    pub guild_id: Option<String>,
    #[serde(deserialize_with = "optional_id")]
    pub channel_id: Option<String>,
    #[serde(deserialize_with = "optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            open: true,
            closed_by: None,
            guild_id: None,
            channel_id: None,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, alias = "mod")]
    pub is_moderator: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    ThreadMessage,
    /// Moderator-only note, never sent to the user
    Internal,
    /// Generated by the bot itself
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "optional_id")]
    pub message_id: Option<String>,
    pub author: Author,
    /// Raw content, entity-escaped upstream
    #[serde(default)]
    pub content: String,
    #[serde(deserialize_with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAttachment")]
pub struct Attachment {
    pub url: String,
    pub filename: Option<String>,
    pub is_image: Option<bool>,
}

impl Attachment {
    pub fn new(url: impl Into<String>) -> Self {
        Attachment {
            url: url.into(),
            filename: None,
            is_image: None,
        }
    }

    /// Explicit flag first, then the extension of the URL path
    pub fn is_image(&self) -> bool {
        self.is_image.unwrap_or_else(|| {
            let path = url::Url::parse(&self.url)
                .map(|url| url.path().to_string())
                .unwrap_or_else(|_| self.url.split(['?', '#']).next().unwrap_or("").to_string());
            path.rsplit_once('.').is_some_and(|(_, ext)| {
                IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
            })
        })
    }

    /// Filename when known, otherwise the last path segment of the URL
    pub fn display_name(&self) -> &str {
        match &self.filename {
            Some(name) if !name.is_empty() => name.as_str(),
            _ => self
                .url
                .split(['?', '#'])
                .next()
                .and_then(|path| path.rsplit('/').find(|segment| !segment.is_empty()))
                .unwrap_or(&self.url),
        }
    }
}

impl Message {
    pub fn new(author: Author, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Message {
            message_id: None,
            author,
            content: content.into(),
            timestamp,
            attachments: Vec::new(),
            kind: MessageKind::ThreadMessage,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }
}

impl LogDocument {
    pub fn new(key: impl Into<String>, messages: Vec<Message>) -> Self {
        LogDocument {
            key: key.into(),
            messages,
            metadata: Metadata::default(),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Read a stored document from disk. `.yaml`/`.yml` files are YAML, anything else JSON.
    ///
    /// A missing file is [Error::NotFound], the equivalent of a key absent from the store.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(err),
        })?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "yaml" | "yml"));
        if is_yaml {
            Self::from_yaml_str(&source)
        } else {
            Self::from_json_str(&source)
        }
    }

    /// Distinct authors in order of first appearance
    pub fn participants(&self) -> Vec<&Author> {
        let mut seen: Vec<&Author> = Vec::new();
        for message in &self.messages {
            if !seen.iter().any(|author| author.id == message.author.id) {
                seen.push(&message.author);
            }
        }
        seen
    }
}

// ============================================================================
// Raw shapes
// ============================================================================

#[derive(Deserialize)]
struct RawLogDocument {
    #[serde(deserialize_with = "id")]
    key: String,
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    metadata: Option<Metadata>,
    #[serde(flatten)]
    legacy: Metadata,
}

impl From<RawLogDocument> for LogDocument {
    fn from(raw: RawLogDocument) -> Self {
        LogDocument {
            key: raw.key,
            messages: raw.messages,
            metadata: raw.metadata.unwrap_or(raw.legacy),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAttachment {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        filename: Option<String>,
        #[serde(default)]
        is_image: Option<bool>,
    },
}

impl From<RawAttachment> for Attachment {
    fn from(raw: RawAttachment) -> Self {
        match raw {
            RawAttachment::Url(url) => Attachment::new(url),
            RawAttachment::Detailed {
                url,
                filename,
                is_image,
            } => Attachment {
                url,
                filename,
                is_image,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCloser {
    Name(String),
    Author { name: String },
}

fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

fn closer_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(
        Option::<RawCloser>::deserialize(deserializer)?.map(|closer| match closer {
            RawCloser::Name(name) | RawCloser::Author { name } => name,
        }),
    )
}

fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{text}'")))
}

fn optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) => parse_timestamp(&text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{text}'"))),
    }
}

/// RFC 3339, or a naive date-time taken as UTC
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}
