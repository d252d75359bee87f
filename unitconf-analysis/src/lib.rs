//! Editor-facing analysis over the token sequence produced by `unitconf-parser`.
//!
//!     Every function here is a pure view over tokens: nothing re-reads the source text except
//!     [`cursor_context::cursor_context`], which tokenizes the prefix before the cursor.
//!
//!     - [`directives`]       (section, key, value) records
//!     - [`folding_ranges`]   comment, region, multi-line value and section folds
//!     - [`cursor_context`]   what is being typed at an offset

pub mod cursor_context;
pub mod directives;
pub mod folding_ranges;

pub use cursor_context::{cursor_context, cursor_context_from_tokens, CursorContext};
pub use directives::{
    directive_at, directives_in_section, extract_directives, Directive, ExtractOptions,
};
pub use folding_ranges::{
    compute_folding_ranges, compute_folding_ranges_with, to_lsp_folding_range, FoldingOptions,
    FoldingRange,
};
