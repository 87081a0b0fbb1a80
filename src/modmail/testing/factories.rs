//! Factories for transcript fixtures

use crate::modmail::transcript::document::parse_timestamp;
use crate::modmail::transcript::{Attachment, Author, LogDocument, Message};

pub fn author(id: &str, name: &str) -> Author {
    Author {
        id: id.to_string(),
        name: name.to_string(),
        avatar_url: None,
        is_moderator: false,
    }
}

pub fn moderator(id: &str, name: &str) -> Author {
    Author {
        is_moderator: true,
        ..author(id, name)
    }
}

/// A thread message. Panics on an unparsable timestamp: fixtures are written by hand.
pub fn message(author: &Author, content: &str, timestamp: &str) -> Message {
    let timestamp = parse_timestamp(timestamp)
        .unwrap_or_else(|| panic!("fixture timestamp '{timestamp}' does not parse"));
    Message::new(author.clone(), content, timestamp)
}

pub fn attachment(url: &str) -> Attachment {
    Attachment::new(url)
}

/// An open document with default metadata
pub fn document(key: &str, messages: Vec<Message>) -> LogDocument {
    LogDocument::new(key, messages)
}

/// `count` messages alternating between a user and a moderator, one second apart, with
/// content `message {i}`
pub fn conversation(key: &str, count: usize) -> LogDocument {
    let user = author("100", "user");
    let staff = moderator("200", "staff");
    let start = parse_timestamp("2021-06-01T12:00:00Z").unwrap_or_default();
    let messages = (0..count)
        .map(|i| {
            let speaker = if i % 2 == 0 { &user } else { &staff };
            Message::new(
                speaker.clone(),
                format!("message {i}"),
                start + chrono::Duration::seconds(i as i64),
            )
            .with_id(i.to_string())
        })
        .collect();
    document(key, messages)
}
