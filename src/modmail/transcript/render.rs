//! Transcript renderer

use super::document::{Attachment, Author, LogDocument, Message, MessageKind, Metadata};
use crate::modmail::config::Settings;
use crate::modmail::dialect::Dialect;
use crate::modmail::error::Error;
use crate::modmail::formats::{RenderMode, Renderer};
use crate::modmail::lexing::{escape_html, is_safe_url};
use crate::modmail::parsing::Parser;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prefix for the second and later lines of a plain-text entry
const CONTINUATION_INDENT: &str = "    ";

/// Presentation options that do not affect parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptOptions {
    timestamp_format: String,
}

impl TranscriptOptions {
    /// Options with a chrono strftime timestamp format. Formats chrono cannot render are
    /// rejected here so rendering itself never fails.
    pub fn new(timestamp_format: impl Into<String>) -> Result<Self, Error> {
        let timestamp_format = timestamp_format.into();
        if StrftimeItems::new(&timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidTimestampFormat(timestamp_format));
        }
        Ok(TranscriptOptions { timestamp_format })
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    fn format_timestamp(&self, timestamp: &DateTime<Utc>) -> String {
        timestamp.format(&self.timestamp_format).to_string()
    }
}

impl Default for TranscriptOptions {
    fn default() -> Self {
        TranscriptOptions {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Parser, renderer and options for whole documents.
///
/// Built once and then only read; one instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct TranscriptRenderer {
    parser: Parser,
    renderer: Renderer,
    options: TranscriptOptions,
}

impl TranscriptRenderer {
    /// Parser and renderer share the dialect, so every parsed kind has a rendering rule
    pub fn new(dialect: Dialect, options: TranscriptOptions) -> Self {
        TranscriptRenderer {
            renderer: Renderer::new(&dialect),
            parser: Parser::new(dialect),
            options,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        let options = TranscriptOptions::new(settings.transcript.timestamp_format.clone())?;
        let mut renderer = Self::new(settings.dialect()?, options);
        renderer.parser = renderer
            .parser
            .with_entity_decoding(settings.markdown.input_escaped);
        Ok(renderer)
    }

    pub fn dialect(&self) -> &Dialect {
        self.parser.dialect()
    }

    pub fn options(&self) -> &TranscriptOptions {
        &self.options
    }

    /// Parse and render one message body
    pub fn render_message_content(&self, content: &str, mode: RenderMode) -> String {
        let tokens = self.parser.parse(content);
        self.renderer.render(&tokens, mode)
    }

    pub fn render(&self, document: &LogDocument, mode: RenderMode) -> String {
        match mode {
            RenderMode::Html => self.render_html(document),
            RenderMode::PlainText => self.render_plain_text(document),
        }
    }

    pub fn render_html(&self, document: &LogDocument) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<div class="transcript" data-key="{}">"#,
            escape_html(&document.key)
        );
        self.write_header(document, &mut out);
        for message in &document.messages {
            self.write_message(message, &mut out);
        }
        out.push_str("</div>\n");

        tracing::debug!(
            key = %document.key,
            messages = document.messages.len(),
            bytes = out.len(),
            "rendered html transcript"
        );
        out
    }

    pub fn render_plain_text(&self, document: &LogDocument) -> String {
        let entries: Vec<String> = document
            .messages
            .iter()
            .map(|message| self.plain_entry(message))
            .collect();
        let out = entries.join("\n");

        tracing::debug!(
            key = %document.key,
            messages = document.messages.len(),
            bytes = out.len(),
            "rendered plain-text transcript"
        );
        out
    }

    /// One `[timestamp] author: content` entry. Continuation lines are indented so every
    /// entry starts exactly one unindented line.
    fn plain_entry(&self, message: &Message) -> String {
        let content = self.render_message_content(&message.content, RenderMode::PlainText);
        let mut entry = format!(
            "[{}] {}: {}",
            self.options.format_timestamp(&message.timestamp),
            message.author.name,
            indent_continuation(&content)
        );
        for attachment in &message.attachments {
            entry.push(' ');
            entry.push_str(&attachment.url);
        }
        entry
    }

    // ========================================================================
    // HTML pieces
    // ========================================================================

    fn write_header(&self, document: &LogDocument, out: &mut String) {
        let key = escape_html(&document.key);
        out.push_str("<header class=\"transcript__header\">\n");
        let _ = writeln!(out, r#"<h1 class="transcript__title">Log {key}</h1>"#);
        write_status(&document.metadata, out);
        self.write_metadata(&document.metadata, out);
        write_participants(&document.participants(), out);
        out.push_str("</header>\n");
    }

    fn write_metadata(&self, metadata: &Metadata, out: &mut String) {
        let mut rows = String::new();
        if let Some(guild) = &metadata.guild_id {
            let _ = writeln!(rows, "<dt>Guild</dt><dd>{}</dd>", escape_html(guild));
        }
        if let Some(channel) = &metadata.channel_id {
            let _ = writeln!(rows, "<dt>Channel</dt><dd>{}</dd>", escape_html(channel));
        }
        if let Some(created) = &metadata.created_at {
            let _ = writeln!(rows, "<dt>Created</dt><dd>{}</dd>", self.time(created, None));
        }
        if !rows.is_empty() {
            let _ = write!(out, "<dl class=\"transcript__meta\">\n{rows}</dl>\n");
        }
    }

    fn write_message(&self, message: &Message, out: &mut String) {
        let mut classes = String::from("message");
        if message.author.is_moderator {
            classes.push_str(" message--moderator");
        }
        match message.kind {
            MessageKind::ThreadMessage => {}
            MessageKind::Internal => classes.push_str(" message--internal"),
            MessageKind::System => classes.push_str(" message--system"),
        }

        let _ = write!(out, r#"<article class="{classes}""#);
        if let Some(id) = &message.message_id {
            let _ = write!(out, r#" data-message-id="{}""#, escape_html(id));
        }
        out.push_str(">\n");

        write_author(&message.author, out);
        let _ = writeln!(out, "{}", self.time(&message.timestamp, Some("message__timestamp")));
        let _ = writeln!(
            out,
            r#"<div class="message__content">{}</div>"#,
            self.render_message_content(&message.content, RenderMode::Html)
        );
        write_attachments(&message.attachments, out);
        out.push_str("</article>\n");
    }

    fn time(&self, timestamp: &DateTime<Utc>, class: Option<&str>) -> String {
        let class = class.map_or(String::new(), |class| format!(r#" class="{class}""#));
        format!(
            r#"<time{class} datetime="{}">{}</time>"#,
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            escape_html(&self.options.format_timestamp(timestamp))
        )
    }
}

impl Default for TranscriptRenderer {
    fn default() -> Self {
        Self::new(Dialect::transcript(), TranscriptOptions::default())
    }
}

/// Indent every non-empty line after the first
fn indent_continuation(content: &str) -> String {
    let mut lines = content.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(CONTINUATION_INDENT);
            out.push_str(line);
        }
    }
    out
}

fn write_status(metadata: &Metadata, out: &mut String) {
    if metadata.open {
        out.push_str("<p class=\"transcript__status transcript__status--open\">Open</p>\n");
        return;
    }
    out.push_str("<p class=\"transcript__status transcript__status--closed\">Closed");
    if let Some(closer) = &metadata.closed_by {
        let _ = write!(out, " by {}", escape_html(closer));
    }
    out.push_str("</p>\n");
}

fn write_participants(participants: &[&Author], out: &mut String) {
    if participants.is_empty() {
        return;
    }
    out.push_str("<ul class=\"transcript__participants\">\n");
    for author in participants {
        let class = if author.is_moderator {
            "participant participant--moderator"
        } else {
            "participant"
        };
        let _ = writeln!(
            out,
            r#"<li class="{class}" data-author-id="{}">{}</li>"#,
            escape_html(&author.id),
            escape_html(&author.name)
        );
    }
    out.push_str("</ul>\n");
}

fn write_author(author: &Author, out: &mut String) {
    if let Some(avatar) = author.avatar_url.as_deref().filter(|url| is_safe_url(url)) {
        let _ = writeln!(
            out,
            r#"<img class="message__avatar" src="{}" alt="" />"#,
            escape_html(avatar)
        );
    }
    let _ = writeln!(
        out,
        r#"<span class="message__author" data-author-id="{}">{}</span>"#,
        escape_html(&author.id),
        escape_html(&author.name)
    );
}

fn write_attachments(attachments: &[Attachment], out: &mut String) {
    if attachments.is_empty() {
        return;
    }
    out.push_str("<div class=\"message__attachments\">\n");
    for attachment in attachments {
        let url = escape_html(&attachment.url);
        let name = escape_html(attachment.display_name());
        if !is_safe_url(&attachment.url) {
            let _ = writeln!(out, r#"<span class="attachment">{url}</span>"#);
        } else if attachment.is_image() {
            let _ = writeln!(
                out,
                r#"<a class="attachment attachment--image" href="{url}"><img src="{url}" alt="{name}" /></a>"#
            );
        } else {
            let _ = writeln!(out, r#"<a class="attachment" href="{url}">{name}</a>"#);
        }
    }
    out.push_str("</div>\n");
}
