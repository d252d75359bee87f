//! Incremental resumption
//!
//!     Given the tokens of an earlier version of the document, find the point from which the
//!     new text has to be scanned again. Everything before that point is reused as is.
//!
//!     1. Trust previous tokens from the front while their text is still found at their range
//!        and the gap since the previous trusted token is lexically inert: only blanks and line
//!        breaks, or whatever trails a closed section header on its line. Line and column
//!        arithmetic over the gap must land exactly on the token start.
//!     2. Among trusted tokens, pick the last one that starts a line (column 0) and is not the
//!        resumption of a backslash continuation. At a line start the machine state is fully
//!        determined by the previous committed token, so scanning can restart there.
//!
//!     A systemd key or value ending in a backslash makes the following line break significant:
//!     trust stops there unless the gap begins with a bare `\n`, since a blank or a `\r` in that
//!     spot decides whether the continuation was live.

use super::dialect::Dialect;
use crate::unit::range::Location;
use crate::unit::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResumePoint {
    /// Number of previous tokens reused verbatim
    pub reused: usize,
    /// Where scanning restarts
    pub at: Location,
}

impl ResumePoint {
    pub(crate) fn origin() -> Self {
        Self {
            reused: 0,
            at: Location::default(),
        }
    }
}

pub(crate) fn find_resume_point(text: &str, prev: &[Token], dialect: Dialect) -> ResumePoint {
    let trusted = count_trusted(text, prev, dialect);

    (0..trusted)
        .rev()
        .find(|&index| {
            prev[index].range.start.column == 0 && !continues_previous(prev, index, dialect)
        })
        .map(|index| ResumePoint {
            reused: index,
            at: prev[index].range.start,
        })
        .unwrap_or_else(ResumePoint::origin)
}

fn count_trusted(text: &str, prev: &[Token], dialect: Dialect) -> usize {
    let mut before: Option<&Token> = None;
    for (index, token) in prev.iter().enumerate() {
        let start = token.range.start;
        let end = token.range.end;
        let intact = token.kind.is_visible()
            && end.line == start.line
            && end.column == start.column + token.text.len()
            && text.get(token.range.span()) == Some(token.text.as_str());
        if !intact || !gap_is_inert(text, before, start, dialect) {
            return index;
        }
        before = Some(token);
    }
    prev.len()
}

/// Whether the text between `before` (or the document start) and `to` produces no token and
/// leaves the line structure unchanged.
fn gap_is_inert(text: &str, before: Option<&Token>, to: Location, dialect: Dialect) -> bool {
    let from = before.map(|token| token.range.end).unwrap_or_default();
    if to.offset < from.offset {
        return false;
    }
    let Some(gap) = text.get(from.offset..to.offset) else {
        return false;
    };

    if let Some(token) = before {
        let escapable = matches!(
            token.kind,
            TokenKind::DirectiveKey | TokenKind::DirectiveValue
        );
        if dialect.supports_escapes()
            && escapable
            && token.text.ends_with('\\')
            && !gap.is_empty()
            && !gap.starts_with('\n')
        {
            return false;
        }
    }

    let mut discarding = before
        .is_some_and(|token| token.kind == TokenKind::Section && token.text.ends_with(']'));
    let mut line = from.line;
    let mut column = from.column;
    let bytes = gap.as_bytes();
    for (index, &byte) in bytes.iter().enumerate() {
        match byte {
            b'\n' => {
                line += 1;
                column = 0;
                discarding = false;
            }
            b'\r' if bytes.get(index + 1) == Some(&b'\n') => column += 1,
            b' ' | b'\t' => column += 1,
            _ if discarding => column += 1,
            _ => return false,
        }
    }
    line == to.line && column == to.column
}

/// Whether `prev[index]` resumes a systemd backslash continuation.
fn continues_previous(prev: &[Token], index: usize, dialect: Dialect) -> bool {
    if !dialect.supports_escapes() {
        return false;
    }
    prev[..index]
        .iter()
        .rev()
        .find(|token| token.kind != TokenKind::Comment)
        .is_some_and(|token| {
            matches!(
                token.kind,
                TokenKind::DirectiveKey | TokenKind::DirectiveValue
            ) && token.text.ends_with('\\')
        })
}
