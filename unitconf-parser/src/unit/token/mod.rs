//! Core token types shared by the tokenizer and every token consumer.

pub mod core;

pub use core::{Token, TokenKind};
