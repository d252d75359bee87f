//! Resumable tokenizer state
//!
//!     The state is everything the machine needs to continue scanning from a given location.
//!     At the start of a line it is small enough to be rebuilt from the last committed token,
//!     which is what incremental resumption relies on (see `resume.rs`).

use crate::unit::range::Location;
use crate::unit::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerState {
    /// Kind of the token being accumulated, `None` when nothing is pending
    pub kind: TokenKind,
    /// Start of the pending token
    pub from: Location,
    /// End of the last non-blank character of the pending token
    pub content_end: Location,
    /// Kind of the last committed token
    pub last: TokenKind,
    /// End of the last committed token
    pub last_end: Location,
    /// Set while the last accumulated character was an escaping backslash
    pub escaped_for: Option<TokenKind>,
    /// Kind resumed on the next non-blank character after an escaped line break
    pub continue_as: Option<TokenKind>,
    /// mkosi only: 0 = no continuation, 1 = previous line can be continued,
    /// 2+ = current line is indented and continues the previous value
    pub value_continuation: u32,
    /// Whether the current line already had meaningful content
    pub past_leading_blank: bool,
    /// mkosi only: the pending comment sits inside an indented continuation
    pub comment_in_continuation: bool,
}

impl TokenizerState {
    /// State at the very beginning of a document.
    pub fn new() -> Self {
        Self {
            kind: TokenKind::None,
            from: Location::default(),
            content_end: Location::default(),
            last: TokenKind::None,
            last_end: Location::default(),
            escaped_for: None,
            continue_as: None,
            value_continuation: 0,
            past_leading_blank: false,
            comment_in_continuation: false,
        }
    }

    /// State at the start of a line whose previous committed token is `last`.
    ///
    /// Only valid when no backslash continuation is pending into that line.
    pub fn at_line_start(last: Option<&Token>) -> Self {
        let mut state = Self::new();
        if let Some(token) = last {
            state.last = token.kind;
            state.last_end = token.range.end;
        }
        state
    }

    pub fn begin(&mut self, kind: TokenKind, at: Location) {
        self.kind = kind;
        self.from = at;
        self.content_end = at;
        self.escaped_for = None;
    }

    pub fn commit(&mut self, kind: TokenKind, end: Location) {
        self.last = kind;
        self.last_end = end;
    }

    /// Whether the last committed token is an assignment on `line`.
    pub fn assignment_on_line(&self, line: usize) -> bool {
        self.last == TokenKind::Assignment && self.last_end.line == line
    }
}

impl Default for TokenizerState {
    fn default() -> Self {
        Self::new()
    }
}
