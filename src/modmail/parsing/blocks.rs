//! Block stage: lines → block tokens
//!
//! Each enabled block kind contributes one rule. Rules are tried in the kind's precedence
//! order on the line under the cursor; the first rule that claims the line wins and tells
//! the stage where to resume. Lines nobody claims are paragraph lines.

use super::spans::parse_spans;
use crate::modmail::dialect::Dialect;
use crate::modmail::token::spec::pattern_for;
use crate::modmail::token::{Cell, KindClass, Token, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;

static INDENTED_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?: {4}|\t)(?P<text>.*)$").unwrap());

static CLOSING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(?P<fence>`{3,}|~{3,})[ \t]*$").unwrap());

/// The lines of one message and the position of the rule being tried
struct BlockCursor<'a> {
    lines: &'a [&'a str],
    index: usize,
    in_paragraph: bool,
    dialect: &'a Dialect,
}

impl<'a> BlockCursor<'a> {
    fn line(&self) -> &'a str {
        self.lines[self.index]
    }

    fn spans(&self, text: &str) -> Vec<Token> {
        parse_spans(text.trim(), self.dialect)
    }
}

/// Returns the block token and the index of the first line not consumed
type BlockRule = fn(&BlockCursor<'_>) -> Option<(Token, usize)>;

fn block_rule(kind: TokenKind) -> Option<BlockRule> {
    let rule: BlockRule = match kind {
        TokenKind::BlockCode => code_block,
        TokenKind::Heading => heading,
        TokenKind::ThematicBreak => thematic_break,
        TokenKind::Quote => quote,
        TokenKind::List => list,
        TokenKind::Table => table,
        TokenKind::Footnote => footnote,
        _ => return None,
    };
    Some(rule)
}

pub(super) fn parse_blocks(text: &str, dialect: &Dialect) -> Vec<Token> {
    let lines: Vec<&str> = text.split('\n').collect();
    let rules: Vec<BlockRule> = dialect
        .kinds_by_precedence(KindClass::Block)
        .into_iter()
        .filter_map(block_rule)
        .collect();

    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        if is_blank(line) {
            flush_paragraph(&mut paragraph, &mut blocks, dialect);
            index += 1;
            continue;
        }

        let cursor = BlockCursor {
            lines: &lines,
            index,
            in_paragraph: !paragraph.is_empty(),
            dialect,
        };
        if let Some((token, next)) = rules.iter().find_map(|rule| rule(&cursor)) {
            flush_paragraph(&mut paragraph, &mut blocks, dialect);
            blocks.push(token);
            index = next.max(index + 1);
            continue;
        }

        paragraph.push(line);
        index += 1;
    }

    flush_paragraph(&mut paragraph, &mut blocks, dialect);
    blocks
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Token>, dialect: &Dialect) {
    if paragraph.is_empty() {
        return;
    }
    blocks.push(Token::Paragraph(inline_lines(paragraph, dialect)));
    paragraph.clear();
}

/// Span-parse each line and join them with line breaks
fn inline_lines(lines: &[&str], dialect: &Dialect) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            tokens.push(Token::LineBreak);
        }
        tokens.extend(parse_spans(line.trim(), dialect));
    }
    tokens
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

// ============================================================================
// Code blocks
// ============================================================================

fn code_block(cursor: &BlockCursor<'_>) -> Option<(Token, usize)> {
    fenced_code(cursor).or_else(|| indented_code(cursor))
}

/// An unclosed fence runs to the end of the message.
fn fenced_code(cursor: &BlockCursor<'_>) -> Option<(Token, usize)> {
    let caps = pattern_for(TokenKind::BlockCode)?.captures(cursor.line())?;
    let fence = caps.name("fence")?.as_str();
    let indent = caps.name("indent").map_or(0, |m| m.as_str().len());
    let language = caps
        .name("info")
        .and_then(|m| m.as_str().split_whitespace().next())
        .map(str::to_string);

    let mut body = Vec::new();
    let mut index = cursor.index + 1;
    while index < cursor.lines.len() {
        let line = cursor.lines[index];
        index += 1;
        if closes_fence(line, fence) {
            break;
        }
        body.push(strip_indent(line, indent));
    }

    Some((
        Token::BlockCode {
            language,
            content: body.join("\n"),
        },
        index,
    ))
}

fn closes_fence(line: &str, opening: &str) -> bool {
    CLOSING_FENCE
        .captures(line)
        .and_then(|caps| caps.name("fence"))
        .map(|close| close.as_str().starts_with(&opening[..1]) && close.len() >= opening.len())
        .unwrap_or(false)
}

fn strip_indent(line: &str, indent: usize) -> &str {
    let leading = line.len() - line.trim_start_matches(' ').len();
    &line[leading.min(indent)..]
}

/// Indented code cannot interrupt a paragraph.
fn indented_code(cursor: &BlockCursor<'_>) -> Option<(Token, usize)> {
    if cursor.in_paragraph || !INDENTED_CODE.is_match(cursor.line()) {
        return None;
    }

    let mut body: Vec<&str> = Vec::new();
    let mut index = cursor.index;
    let mut end = index;
    while index < cursor.lines.len() {
        let line = cursor.lines[index];
        if let Some(caps) = INDENTED_CODE.captures(line) {
            body.push(caps.name("text").map_or("", |m| m.as_str()));
            end = index + 1;
        } else if is_blank(line) {
            body.push("");
        } else {
            break;
        }
        index += 1;
    }
    body.truncate(end - cursor.index);

    Some((
        Token::BlockCode {
            language: None,
            content: body.join("\n"),
        },
        end,
    ))
}

// ============================================================================
// Single-line blocks
// ============================================================================

fn heading(cursor: &BlockCursor<'_>) -> Option<(Token, usize)> {
    let caps = pattern_for(TokenKind::Heading)?.captures(cursor.line())?;
    let level = caps.name("level")?.as_str().len() as u8;
    let text = caps.name("text").map_or("", |m| m.as_str());
    Some((
        Token::Heading {
            level,
            children: cursor.spans(text),
        },
        cursor.index + 1,
    ))
}

fn thematic_break(cursor: &BlockCursor<'_>) -> Option<(Token, usize)> {
    pattern_for(TokenKind::ThematicBreak)?
        .is_match(cursor.line())
        .then_some((Token::ThematicBreak, cursor.index + 1))
}

fn footnote(cursor: &BlockCursor<'_>) -> Option<(Token, usize)> {
    let caps = pattern_for(TokenKind::Footnote)?.captures(cursor.line())?;
    Some((
        Token::Footnote {
            label: caps.name("label")?.as_str().to_string(),
            children: cursor.spans(caps.name("text").map_or("", |m| m.as_str())),
        },
        cursor.index + 1,
    ))
}

// ============================================================================
// Multi-line blocks
// ============================================================================

/// Consecutive `>` lines; quotes do not nest.
fn quote(cursor: &BlockCursor<'_>) -> Option<(Token, usize)> {
    let pattern = pattern_for(TokenKind::Quote)?;
    let mut lines = Vec::new();
    let mut index = cursor.index;
    while let Some(caps) = cursor.lines.get(index).and_then(|line| pattern.captures(line)) {
        lines.push(caps.name("text").map_or("", |m| m.as_str()));
        index += 1;
    }
    if lines.is_empty() {
        return None;
    }
    Some((Token::Quote(inline_lines(&lines, cursor.dialect)), index))
}

/// Flat list. Items share one marker family; lines indented by two or more spaces
/// continue the previous item.
fn list(cursor: &BlockCursor<'_>) -> Option<(Token, usize)> {
    let pattern = pattern_for(TokenKind::List)?;
    let first = pattern.captures(cursor.line())?;
    let family = marker_family(first.name("marker")?.as_str());
    let start = ordered_start(first.name("marker")?.as_str());

    // Only lists starting at 1 may interrupt a paragraph
    if cursor.in_paragraph && start.is_some_and(|n| n != 1) {
        return None;
    }

    let breaks_list = |line: &str| {
        cursor.dialect.enables(TokenKind::ThematicBreak)
            && pattern_for(TokenKind::ThematicBreak).is_some_and(|re| re.is_match(line))
    };

    let mut items: Vec<Vec<&str>> = Vec::new();
    let mut index = cursor.index;
    while index < cursor.lines.len() {
        let line = cursor.lines[index];
        if index > cursor.index && breaks_list(line) {
            break;
        }
        match pattern.captures(line) {
            Some(caps) if caps.name("marker").map(|m| marker_family(m.as_str())) == Some(family) => {
                items.push(vec![caps.name("text").map_or("", |m| m.as_str())]);
            }
            None if !is_blank(line) && line.starts_with("  ") => match items.last_mut() {
                Some(item) => item.push(line.trim()),
                None => break,
            },
            _ => break,
        }
        index += 1;
    }

    let items = items
        .iter()
        .map(|lines| inline_lines(lines, cursor.dialect))
        .collect();
    Some((Token::List { start, items }, index))
}

/// Bullets form one family per character; ordered markers one per delimiter
fn marker_family(marker: &str) -> char {
    marker.chars().last().unwrap_or('-')
}

fn ordered_start(marker: &str) -> Option<u64> {
    marker[..marker.len() - 1].parse().ok()
}

/// Pipe table: a header row, a delimiter row with the same number of cells, then body rows
/// until a blank line or a line without a pipe.
fn table(cursor: &BlockCursor<'_>) -> Option<(Token, usize)> {
    let header_line = cursor.line();
    let delimiter_line = *cursor.lines.get(cursor.index + 1)?;
    if !header_line.contains('|') || !delimiter_line.contains('|') {
        return None;
    }
    if !pattern_for(TokenKind::Table)?.is_match(delimiter_line) {
        return None;
    }

    let columns = split_row(delimiter_line).len();
    let header_cells = split_row(header_line);
    if header_cells.len() != columns {
        return None;
    }

    let to_cells = |cells: Vec<String>| -> Vec<Cell> {
        (0..columns)
            .map(|i| cells.get(i).map_or_else(Vec::new, |cell| cursor.spans(cell)))
            .collect()
    };

    let header = to_cells(header_cells);
    let mut rows = Vec::new();
    let mut index = cursor.index + 2;
    while let Some(line) = cursor.lines.get(index) {
        if is_blank(line) || !line.contains('|') {
            break;
        }
        rows.push(to_cells(split_row(line)));
        index += 1;
    }

    Some((Token::Table { header, rows }, index))
}

/// Split a table row on unescaped pipes, dropping the optional outer pipes
fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = match trimmed.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => trimmed,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(ch),
        }
    }
    cells.push(current.trim().to_string());
    cells
}
