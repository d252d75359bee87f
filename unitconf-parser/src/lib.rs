//! # unitconf-parser
//!
//! Lexical core for unit-configuration files: the systemd unit dialect and the
//! mkosi dialect.
//!
//! File Layout
//!
//!     src/unit
//!       ├── range.rs     Location and range model shared by every consumer
//!       ├── token        Token kinds and the token record
//!       ├── lexing       Dialects, tokenizer state machine, incremental resumption
//!       └── testing.rs   Sample documents and assertion helpers for tests
//!
//!     Everything downstream (directive extraction, folding, cursor context) lives in
//!     `unitconf-analysis` and consumes nothing but the token sequence produced here.

pub mod unit;

pub use unit::lexing::{tokenize, Dialect, TokenizerOptions, TokenizerOutput};
pub use unit::range::{Location, LocationError, Range, SourceLocation};
pub use unit::token::{Token, TokenKind};
