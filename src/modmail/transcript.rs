//! Transcript aggregation: one stored log document → the two artifacts served to viewers
//!
//!     html:   a header with the document metadata (key, open/closed state, participants)
//!             followed by one `<article>` per message, content rendered in HTML mode.
//!     text:   one `[timestamp] author: content` entry per message, content rendered in
//!             plain-text mode, attachments appended as their URLs.
//!
//!     Messages are emitted exactly in stored order: none skipped, merged or reordered.
//!     Absent optional fields contribute nothing.

pub mod document;
pub mod render;

pub use document::{Attachment, Author, LogDocument, Message, MessageKind, Metadata};
pub use render::{TranscriptOptions, TranscriptRenderer, DEFAULT_TIMESTAMP_FORMAT};

use once_cell::sync::Lazy;

static DEFAULT_RENDERER: Lazy<TranscriptRenderer> = Lazy::new(TranscriptRenderer::default);

/// Render a document as an HTML transcript with the default transcript dialect
pub fn render_html(document: &LogDocument) -> String {
    DEFAULT_RENDERER.render_html(document)
}

/// Render a document as a plain-text transcript with the default transcript dialect
pub fn render_plain_text(document: &LogDocument) -> String {
    DEFAULT_RENDERER.render_plain_text(document)
}
