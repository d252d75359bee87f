//! Token kinds and the token record
//!
//!     A token is a typed, position-accurate slice of the source. The kind set is closed:
//!     consumers match on it exhaustively. `None` and `Unknown` are tokenizer-internal states
//!     and never appear in a token sequence; they only show up as a forecast kind.

use crate::unit::range::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// Nothing pending
    #[default]
    None,
    /// `# ...` (both dialects) or `; ...` (systemd only), sign to end of line
    Comment,
    /// `[Name]`, brackets included
    Section,
    DirectiveKey,
    DirectiveValue,
    /// The single `=` between a key and its value
    Assignment,
    /// Section-trailing text on the same line, discarded
    Unknown,
}

impl TokenKind {
    /// Whether tokens of this kind can appear in a token sequence.
    pub fn is_visible(self) -> bool {
        !matches!(self, TokenKind::None | TokenKind::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::None => "none",
            TokenKind::Comment => "comment",
            TokenKind::Section => "section",
            TokenKind::DirectiveKey => "directiveKey",
            TokenKind::DirectiveValue => "directiveValue",
            TokenKind::Assignment => "assignment",
            TokenKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub range: Range,
    /// Exactly `&source[range.span()]`
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, range: Range, text: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            text: text.into(),
        }
    }

    pub fn start_line(&self) -> usize {
        self.range.start.line
    }

    pub fn end_line(&self) -> usize {
        self.range.end.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})@{}", self.kind, self.text, self.range)
    }
}
