//! Character-driven tokenizer state machine
//!
//!     The machine walks the text once, one character at a time. The pending token kind is the
//!     state: `None` decides what the next token is, `Section` waits for `]`, `DirectiveKey`
//!     waits for `=`, `DirectiveValue` and `Comment` run to the end of the line, and `Unknown`
//!     swallows whatever trails a section header on its line.
//!
//!     Line breaks close the pending token. Two rules carry a value across lines:
//!
//!         - systemd: a backslash as the last character of a key or value resumes a value on
//!           the next non-blank character of the following line. Comment lines in between keep
//!           the continuation pending, a blank line cancels it.
//!         - mkosi: after a line ending in a value (or in a bare `Key=`), leading blanks on the
//!           next line raise `value_continuation`; reaching 2 makes the line a value.

use super::dialect::Dialect;
use super::state::TokenizerState;
use crate::unit::range::{Location, Range};
use crate::unit::token::{Token, TokenKind};

pub(crate) fn is_blank(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

fn after(at: Location, ch: char) -> Location {
    let len = ch.len_utf8();
    Location::new(at.offset + len, at.line, at.column + len)
}

pub(crate) struct Tokenizer<'a> {
    text: &'a str,
    dialect: Dialect,
    state: TokenizerState,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(text: &'a str, dialect: Dialect) -> Self {
        Self::resume(text, dialect, Vec::new(), TokenizerState::new())
    }

    /// Continue from `state` with `tokens` already committed.
    pub(crate) fn resume(
        text: &'a str,
        dialect: Dialect,
        tokens: Vec<Token>,
        state: TokenizerState,
    ) -> Self {
        Self {
            text,
            dialect,
            state,
            tokens,
        }
    }

    /// Scan from `start` (which must sit at a line start or at offset 0) to the end of the text.
    ///
    /// Returns the committed tokens and the forecast kind.
    pub(crate) fn run(mut self, start: Location) -> (Vec<Token>, TokenKind) {
        let base = start.offset;
        let mut line = start.line;
        let mut column = start.column;
        let mut chars = self.text[base..].char_indices().peekable();

        while let Some((index, ch)) = chars.next() {
            let at = Location::new(base + index, line, column);
            let crlf = ch == '\r' && matches!(chars.peek(), Some((_, '\n')));
            if ch == '\n' || crlf {
                if crlf {
                    chars.next();
                }
                self.line_break(at);
                line += 1;
                column = 0;
                continue;
            }
            self.step(ch, at);
            column += ch.len_utf8();
        }

        let end = Location::new(self.text.len(), line, column);
        let forecast = self.forecast(end);
        self.close_pending();
        (self.tokens, forecast)
    }

    fn step(&mut self, ch: char, at: Location) {
        match self.state.kind {
            TokenKind::None | TokenKind::Assignment => self.decide(ch, at),
            TokenKind::Comment => self.state.content_end = after(at, ch),
            TokenKind::Section => {
                if !is_blank(ch) {
                    self.state.content_end = after(at, ch);
                }
                if ch == ']' {
                    self.close_pending();
                    self.state.kind = TokenKind::Unknown;
                }
            }
            TokenKind::Unknown => {}
            TokenKind::DirectiveKey => {
                if ch == '=' {
                    self.close_pending();
                    self.emit_assignment(at);
                } else {
                    self.accumulate(ch, at);
                }
            }
            TokenKind::DirectiveValue => self.accumulate(ch, at),
        }
    }

    /// Nothing is pending: skip blanks, detect comments, otherwise classify the next token.
    fn decide(&mut self, ch: char, at: Location) {
        let mkosi = self.dialect.supports_indented_continuation();
        if is_blank(ch) {
            if mkosi && self.state.value_continuation > 0 {
                self.state.value_continuation += 1;
            }
            return;
        }

        let leading = !self.state.past_leading_blank;
        self.state.past_leading_blank = true;
        if leading && self.dialect.is_comment_sign(ch) {
            self.state.comment_in_continuation = mkosi && self.state.value_continuation >= 2;
            self.state.begin(TokenKind::Comment, at);
            self.state.content_end = after(at, ch);
            return;
        }

        let continuation = self.state.continue_as.take();
        let is_value = continuation.is_some()
            || self.state.value_continuation >= 2
            || self.state.assignment_on_line(at.line);
        self.state.value_continuation = 0;

        if is_value {
            let kind = continuation.unwrap_or(TokenKind::DirectiveValue);
            self.state.begin(kind, at);
            self.accumulate(ch, at);
        } else if ch == '=' && self.state.last != TokenKind::Assignment {
            self.emit_assignment(at);
        } else if ch == '[' {
            self.state.begin(TokenKind::Section, at);
            self.state.content_end = after(at, ch);
        } else {
            self.state.begin(TokenKind::DirectiveKey, at);
            self.accumulate(ch, at);
        }
    }

    /// Extend a key or value token by one character.
    fn accumulate(&mut self, ch: char, at: Location) {
        if !is_blank(ch) {
            self.state.content_end = after(at, ch);
        }
        if self.dialect.supports_escapes() {
            // A backslash in a key also continues as a value on the next line.
            self.state.escaped_for = (ch == '\\').then_some(TokenKind::DirectiveValue);
        }
    }

    fn line_break(&mut self, at: Location) {
        let kind = self.state.kind;
        let escaped = self.state.escaped_for.take();
        let bare_assignment = kind == TokenKind::None && self.state.assignment_on_line(at.line);
        let comment_in_continuation = self.state.comment_in_continuation;

        self.close_pending();

        match kind {
            TokenKind::DirectiveKey | TokenKind::DirectiveValue => self.state.continue_as = escaped,
            TokenKind::Comment => {}
            _ => self.state.continue_as = None,
        }

        if self.dialect.supports_indented_continuation() {
            let continues = kind == TokenKind::DirectiveValue
                || bare_assignment
                || (kind == TokenKind::Comment && comment_in_continuation);
            self.state.value_continuation = u32::from(continues);
        }

        self.state.kind = TokenKind::None;
        self.state.past_leading_blank = false;
        self.state.comment_in_continuation = false;
    }

    /// What would begin if one more character were appended.
    fn forecast(&self, end: Location) -> TokenKind {
        match self.state.kind {
            TokenKind::None | TokenKind::Assignment => {
                if let Some(kind) = self.state.continue_as {
                    kind
                } else if self.state.value_continuation >= 2 || self.state.assignment_on_line(end.line)
                {
                    TokenKind::DirectiveValue
                } else {
                    TokenKind::None
                }
            }
            kind => kind,
        }
    }

    /// Commit the pending token, if any, and return to `None`.
    fn close_pending(&mut self) {
        let kind = self.state.kind;
        if !kind.is_visible() {
            self.state.kind = TokenKind::None;
            return;
        }
        let text = self.text;
        let from = self.state.from;
        let end = self.state.content_end;
        if end.offset > from.offset {
            self.push(Token::new(
                kind,
                Range::new(from, end),
                &text[from.offset..end.offset],
            ));
        }
        self.state.kind = TokenKind::None;
    }

    fn emit_assignment(&mut self, at: Location) {
        let end = after(at, '=');
        self.push(Token::new(TokenKind::Assignment, Range::new(at, end), "="));
        self.state.kind = TokenKind::None;
    }

    fn push(&mut self, token: Token) {
        debug_assert!(
            self.tokens
                .last()
                .map_or(true, |prev| prev.range.end.offset <= token.range.start.offset),
            "token boundaries must be strictly increasing: {:?} then {:?}",
            self.tokens.last(),
            token
        );
        self.state.commit(token.kind, token.range.end);
        self.tokens.push(token);
    }
}
