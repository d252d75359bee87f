//! Testing utilities
//!
//!     Unit-configuration files look deceptively simple, and small hand-written strings tend to
//!     miss the details that matter (continuations, CRLF, indentation in mkosi files). Tests that
//!     exercise whole documents should use the curated samples in `tests/fixtures` through
//!     [`Fixture`], and compare token streams with [`assert_tokens`] rather than poking at
//!     individual fields.
//!
//!     The incremental tokenizer has one contract that every test suite can check on any input:
//!     re-lexing an edited text with the previous tokens must give exactly the full re-lex. That
//!     check lives in [`assert_prefix_incremental`].

use crate::unit::lexing::{tokenize, Dialect, TokenizerOptions};
use crate::unit::range::SourceLocation;
use crate::unit::token::{Token, TokenKind};
use std::fs;
use std::path::{Path, PathBuf};

/// A sample document under `tests/fixtures`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixture {
    pub name: &'static str,
}

/// Every curated sample.
pub const FIXTURES: &[Fixture] = &[
    Fixture::new("basic.service"),
    Fixture::new("continuation.service"),
    Fixture::new("regions.service"),
    Fixture::new("malformed.service"),
    Fixture::new("crlf.service"),
    Fixture::new("mkosi.conf"),
    Fixture::new("mkosi.conf.d/10-debug.conf"),
];

impl Fixture {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn path(&self) -> PathBuf {
        fixtures_dir().join(self.name)
    }

    pub fn source(&self) -> String {
        let path = self.path();
        fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("failed to read fixture {}: {err}", path.display()))
    }

    pub fn dialect(&self) -> Dialect {
        Dialect::detect(Path::new(self.name))
    }

    pub fn tokenize(&self) -> Vec<Token> {
        tokenize(&self.source(), TokenizerOptions::new(self.dialect())).tokens
    }
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn fixture(name: &str) -> Fixture {
    FIXTURES
        .iter()
        .copied()
        .find(|fixture| fixture.name == name)
        .unwrap_or_else(|| panic!("unknown fixture {name}"))
}

pub fn kinds_and_texts(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
    tokens
        .iter()
        .map(|token| (token.kind, token.text.as_str()))
        .collect()
}

/// Tokenize `text` and compare kinds and texts against `expected`, then check the ranges.
pub fn assert_tokens(text: &str, dialect: Dialect, expected: &[(TokenKind, &str)]) {
    let tokens = tokenize(text, TokenizerOptions::new(dialect)).tokens;
    assert_eq!(
        kinds_and_texts(&tokens),
        expected,
        "token stream mismatch for {text:?} ({dialect})"
    );
    assert_ranges_consistent(text, &tokens);
}

/// Every token is visible, non-empty, sits on one line, matches the text at its range and
/// starts after the previous one ends.
pub fn assert_ranges_consistent(text: &str, tokens: &[Token]) {
    let source = SourceLocation::new(text);
    let mut previous_end = 0;
    for token in tokens {
        let range = token.range;
        assert!(token.kind.is_visible(), "invisible token {token}");
        assert!(!token.text.is_empty(), "empty token {token}");
        assert_eq!(
            &text[range.span()],
            token.text,
            "token text does not match source at {range}"
        );
        assert_eq!(range.start.line, range.end.line, "token spans lines: {token}");
        assert_eq!(source.location_at(range.start.offset), range.start, "{token}");
        assert_eq!(source.location_at(range.end.offset), range.end, "{token}");
        assert!(
            previous_end <= range.start.offset,
            "token {token} starts before the previous token ends"
        );
        previous_end = range.end.offset;
    }
}

/// For every prefix of `text`, tokenizing with the tokens of the full text as previous tokens
/// (and the other way round) must equal a fresh tokenization.
pub fn assert_prefix_incremental(text: &str, dialect: Dialect) {
    let full = tokenize(text, TokenizerOptions::new(dialect)).tokens;
    let cuts = text
        .char_indices()
        .map(|(index, _)| index)
        .chain(std::iter::once(text.len()));
    for cut in cuts {
        let prefix = &text[..cut];
        let fresh = tokenize(prefix, TokenizerOptions::new(dialect));

        let shrunk = tokenize(prefix, TokenizerOptions::new(dialect).with_prev_tokens(&full));
        assert_eq!(shrunk, fresh, "shrinking to {cut} bytes diverged for {text:?}");

        let grown = tokenize(
            text,
            TokenizerOptions::new(dialect).with_prev_tokens(&fresh.tokens),
        );
        assert_eq!(
            grown.tokens, full,
            "growing from {cut} bytes diverged for {text:?}"
        );
    }
}
