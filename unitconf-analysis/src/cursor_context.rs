//! Cursor context
//!
//!     Answers "what is being typed at this offset" for completion and hover. The answer is
//!     derived from the tokens of the text before the cursor plus the tokenizer's forecast, so
//!     highlighting and completion can never disagree about where a key or value starts.

use serde::Serialize;
use unitconf_parser::{tokenize, Dialect, Token, TokenKind, TokenizerOptions};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorContext {
    /// Kind of token the next typed character would belong to
    pub kind: TokenKind,
    /// Raw text of the section header the cursor sits under
    pub section: Option<String>,
    /// Key being valued, when `kind` is a directive value
    pub key: Option<String>,
    /// Token under construction, ending at the cursor
    pub typed: Option<Token>,
}

/// Context at byte `offset` of `text`.
///
/// Panics when `offset` is past the end of `text` or not on a char boundary.
pub fn cursor_context(text: &str, offset: usize, dialect: Dialect) -> CursorContext {
    assert!(
        text.is_char_boundary(offset),
        "cursor offset {offset} is outside the document ({} bytes) or inside a character",
        text.len()
    );
    let output = tokenize(&text[..offset], TokenizerOptions::new(dialect));
    cursor_context_from_tokens(&output.tokens, output.forecast, offset)
}

/// Context from the tokens of the text before the cursor and their forecast kind.
pub fn cursor_context_from_tokens(
    tokens: &[Token],
    forecast: TokenKind,
    offset: usize,
) -> CursorContext {
    let typed_len = match tokens.last() {
        Some(last) if last.kind == forecast && last.range.end.offset == offset => 1,
        _ => 0,
    };
    let (settled, typed) = tokens.split_at(tokens.len() - typed_len);

    let section = settled
        .iter()
        .rev()
        .find(|token| token.kind == TokenKind::Section)
        .map(|token| token.text.clone());

    let key = if forecast == TokenKind::DirectiveValue {
        valued_key(tokens)
    } else {
        None
    };

    CursorContext {
        kind: forecast,
        section,
        key,
        typed: typed.first().cloned(),
    }
}

/// Walk back over values and comments to the assignment and return the key before it.
fn valued_key(tokens: &[Token]) -> Option<String> {
    let mut rest = tokens
        .iter()
        .rev()
        .skip_while(|token| matches!(token.kind, TokenKind::DirectiveValue | TokenKind::Comment));
    match (rest.next(), rest.next()) {
        (Some(assignment), Some(key))
            if assignment.kind == TokenKind::Assignment && key.kind == TokenKind::DirectiveKey =>
        {
            Some(key.text.clone())
        }
        _ => None,
    }
}
