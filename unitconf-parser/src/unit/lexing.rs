//! Tokenizer
//!
//!     Turns unit-configuration text into an ordered sequence of typed tokens. The tokenizer is
//!     total: any text, however malformed, produces a best-effort token sequence. Its output is
//!     the only thing the directive extractor, the folding builder and the cursor context read.
//!
//! Structure:
//!
//!     - dialect.rs    systemd vs mkosi rules (comment signs, continuation style, detection)
//!     - state.rs      the resumable machine state
//!     - tokenizer.rs  the character-driven state machine
//!     - resume.rs     finding where previous tokens stop being valid after an edit
//!
//! Incremental re-lexing
//!
//!     Passing the tokens of an earlier version of the text through
//!     [`TokenizerOptions::with_prev_tokens`] reuses every token before the edit (up to the
//!     last safe line start) and scans only the rest. The result is always identical to a
//!     full re-lex of the new text.

pub mod dialect;
mod resume;
pub mod state;
mod tokenizer;

pub use dialect::{Dialect, UnknownDialect};
pub use state::TokenizerState;

use crate::unit::token::{Token, TokenKind};
use resume::find_resume_point;
use serde::Serialize;
use tokenizer::Tokenizer;

/// Options for a single [`tokenize`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenizerOptions<'a> {
    pub dialect: Dialect,
    /// Tokens of an earlier version of the text, used to skip unchanged lines
    pub prev_tokens: Option<&'a [Token]>,
    /// Keep only the final token (cheap cursor-context queries)
    pub only_last_token: bool,
}

impl<'a> TokenizerOptions<'a> {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn mkosi() -> Self {
        Self::new(Dialect::Mkosi)
    }

    pub fn with_prev_tokens(mut self, prev_tokens: &'a [Token]) -> Self {
        self.prev_tokens = Some(prev_tokens);
        self
    }

    pub fn only_last_token(mut self) -> Self {
        self.only_last_token = true;
        self
    }
}

/// Output from the tokenizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenizerOutput {
    pub tokens: Vec<Token>,
    /// Kind of the token that would begin if one more character were appended
    pub forecast: TokenKind,
}

/// Tokenize `text`, reusing `options.prev_tokens` where they are still valid.
pub fn tokenize(text: &str, options: TokenizerOptions<'_>) -> TokenizerOutput {
    let dialect = options.dialect;
    let (mut tokens, forecast) = match options.prev_tokens {
        Some(prev) if !prev.is_empty() => {
            let point = find_resume_point(text, prev, dialect);
            tracing::trace!(
                reused = point.reused,
                resume_offset = point.at.offset,
                resume_line = point.at.line,
                "resuming tokenizer from previous tokens"
            );
            let kept = prev[..point.reused].to_vec();
            let state = TokenizerState::at_line_start(kept.last());
            Tokenizer::resume(text, dialect, kept, state).run(point.at)
        }
        _ => Tokenizer::new(text, dialect).run(Default::default()),
    };

    if options.only_last_token && tokens.len() > 1 {
        tokens.drain(..tokens.len() - 1);
    }

    tracing::debug!(
        %dialect,
        tokens = tokens.len(),
        %forecast,
        "tokenized {} bytes",
        text.len()
    );
    TokenizerOutput { tokens, forecast }
}
