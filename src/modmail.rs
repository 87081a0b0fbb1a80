//! Main module for modmail-logs library functionality

pub mod config;
pub mod dialect;
pub mod error;
pub mod formats;
pub mod lexing;
pub mod logging;
pub mod parsing;
pub mod testing;
pub mod token;
pub mod transcript;

pub use dialect::Dialect;
pub use error::Error;
pub use formats::{RenderMode, Renderer};
pub use parsing::Parser;
pub use token::{Token, TokenKind};
pub use transcript::{render_html, render_plain_text, LogDocument, TranscriptRenderer};
