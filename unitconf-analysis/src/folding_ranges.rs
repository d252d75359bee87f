//! Folding ranges
//!
//!     Folds are computed from the token sequence alone, line-based and zero-based:
//!
//!         - Comments: a run of consecutive comment tokens folds into one `Comment` range.
//!         - Regions: `#region` / `#endregion` (also `;region` and `;#region` in systemd files)
//!           open and close `Region` ranges on a stack. Unclosed regions are dropped.
//!         - Values: a value continued onto later lines folds from the assignment line to its
//!           last value or indented comment. Comments at column 0 after the value are not part
//!           of it.
//!         - Sections: from the header line to the last non-comment token before the next
//!           header.
//!
//!     Single-line ranges are dropped. The result is sorted by start line (longer first on
//!     ties) and filtered so that any two ranges are either nested or disjoint: a range that
//!     would partially overlap one kept before it is discarded.

use lsp_types::FoldingRangeKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unitconf_parser::{Token, TokenKind};

static REGION_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:#|;#?)\s*region\b").unwrap());
static REGION_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:#|;#?)\s*endregion\b").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoldingRange {
    pub start_line: usize,
    pub end_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FoldingRangeKind>,
}

impl FoldingRange {
    fn new(start_line: usize, end_line: usize, kind: Option<FoldingRangeKind>) -> Self {
        Self {
            start_line,
            end_line,
            kind,
        }
    }
}

/// Which fold families to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldingOptions {
    pub comments: bool,
    pub regions: bool,
    pub values: bool,
    pub sections: bool,
}

impl Default for FoldingOptions {
    fn default() -> Self {
        Self {
            comments: true,
            regions: true,
            values: true,
            sections: true,
        }
    }
}

pub fn compute_folding_ranges(tokens: &[Token]) -> Vec<FoldingRange> {
    compute_folding_ranges_with(tokens, &FoldingOptions::default())
}

pub fn compute_folding_ranges_with(tokens: &[Token], options: &FoldingOptions) -> Vec<FoldingRange> {
    let mut ranges = Vec::new();
    if options.comments || options.regions {
        comment_ranges(tokens, options, &mut ranges);
    }
    if options.values {
        value_ranges(tokens, &mut ranges);
    }
    if options.sections {
        section_ranges(tokens, &mut ranges);
    }
    ranges.retain(|range| range.end_line > range.start_line);

    let ranges = nest(ranges);
    tracing::debug!(ranges = ranges.len(), "computed folding ranges");
    ranges
}

fn comment_ranges(tokens: &[Token], options: &FoldingOptions, ranges: &mut Vec<FoldingRange>) {
    let mut run: Option<(usize, usize)> = None;
    let mut open_regions: Vec<usize> = Vec::new();

    for token in tokens {
        if token.kind != TokenKind::Comment {
            flush(&mut run, ranges);
            continue;
        }
        let line = token.start_line();
        if options.regions && REGION_START.is_match(&token.text) {
            flush(&mut run, ranges);
            open_regions.push(line);
        } else if options.regions && REGION_END.is_match(&token.text) {
            flush(&mut run, ranges);
            if let Some(start) = open_regions.pop() {
                ranges.push(FoldingRange::new(start, line, Some(FoldingRangeKind::Region)));
            }
        } else if options.comments {
            run = Some(run.map_or((line, line), |(start, _)| (start, line)));
        }
    }
    flush(&mut run, ranges);

    if !open_regions.is_empty() {
        tracing::trace!(unclosed = open_regions.len(), "dropping unclosed regions");
    }
}

fn flush(run: &mut Option<(usize, usize)>, ranges: &mut Vec<FoldingRange>) {
    if let Some((start, end)) = run.take() {
        ranges.push(FoldingRange::new(start, end, Some(FoldingRangeKind::Comment)));
    }
}

fn value_ranges(tokens: &[Token], ranges: &mut Vec<FoldingRange>) {
    for (index, assignment) in tokens.iter().enumerate() {
        if assignment.kind != TokenKind::Assignment {
            continue;
        }
        let line = assignment.start_line();
        let body = &tokens[index + 1..];
        let mut len = body
            .iter()
            .take_while(|token| {
                matches!(
                    token.kind,
                    TokenKind::DirectiveValue | TokenKind::Comment
                )
            })
            .count();
        // Comments at column 0 after the value are detached from it
        while len > 0 && body[len - 1].kind == TokenKind::Comment && body[len - 1].range.start.column == 0
        {
            len -= 1;
        }
        let body = &body[..len];

        let continued = body
            .iter()
            .any(|token| token.kind == TokenKind::DirectiveValue && token.start_line() > line);
        if let (true, Some(last)) = (continued, body.last()) {
            ranges.push(FoldingRange::new(line, last.end_line(), None));
        }
    }
}

fn section_ranges(tokens: &[Token], ranges: &mut Vec<FoldingRange>) {
    for (index, section) in tokens.iter().enumerate() {
        if section.kind != TokenKind::Section {
            continue;
        }
        let end_line = tokens[index + 1..]
            .iter()
            .take_while(|token| token.kind != TokenKind::Section)
            .filter(|token| token.kind != TokenKind::Comment)
            .last()
            .map_or(section.end_line(), Token::end_line);
        ranges.push(FoldingRange::new(section.start_line(), end_line, None));
    }
}

/// Sort, dedupe and keep only ranges that nest within or sit beside the ranges kept so far.
fn nest(mut ranges: Vec<FoldingRange>) -> Vec<FoldingRange> {
    ranges.sort_by(|a, b| {
        a.start_line
            .cmp(&b.start_line)
            .then(b.end_line.cmp(&a.end_line))
    });
    ranges.dedup_by(|later, earlier| {
        later.start_line == earlier.start_line && later.end_line == earlier.end_line
    });

    let mut kept = Vec::with_capacity(ranges.len());
    let mut open: Vec<usize> = Vec::new();
    for range in ranges {
        while open.last().is_some_and(|&end| end <= range.start_line) {
            open.pop();
        }
        if open.last().is_some_and(|&end| range.end_line > end) {
            tracing::trace!(
                start = range.start_line,
                end = range.end_line,
                "dropping partially overlapping folding range"
            );
            continue;
        }
        open.push(range.end_line);
        kept.push(range);
    }
    kept
}

/// Convert to the protocol type. Lines stay zero-based.
pub fn to_lsp_folding_range(range: &FoldingRange) -> lsp_types::FoldingRange {
    lsp_types::FoldingRange {
        start_line: u32::try_from(range.start_line).unwrap_or(u32::MAX),
        start_character: None,
        end_line: u32::try_from(range.end_line).unwrap_or(u32::MAX),
        end_character: None,
        kind: range.kind.clone(),
        collapsed_text: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitconf_parser::{tokenize, Dialect, TokenizerOptions};

    type Line = (usize, usize, Option<FoldingRangeKind>);

    fn folds(text: &str, dialect: Dialect) -> Vec<Line> {
        let tokens = tokenize(text, TokenizerOptions::new(dialect)).tokens;
        compute_folding_ranges(&tokens)
            .into_iter()
            .map(|range| (range.start_line, range.end_line, range.kind))
            .collect()
    }

    #[test]
    fn test_comment_run() {
        assert_eq!(
            folds("# one\n# two\n; three\nA=1", Dialect::Systemd),
            vec![(0, 2, Some(FoldingRangeKind::Comment))]
        );
    }

    #[test]
    fn test_single_comment_is_not_folded() {
        assert!(folds("# one\nA=1\n# two", Dialect::Systemd).is_empty());
    }

    #[test]
    fn test_regions() {
        let text = "#region outer\n# a\n# b\n;#region inner\nA=1\nB=2\n;#endregion\n#endregion";
        assert_eq!(
            folds(text, Dialect::Systemd),
            vec![
                (0, 7, Some(FoldingRangeKind::Region)),
                (1, 2, Some(FoldingRangeKind::Comment)),
                (3, 6, Some(FoldingRangeKind::Region)),
            ]
        );
    }

    #[test]
    fn test_unclosed_region_is_dropped() {
        assert!(folds("# region never closed\nA=1\nB=2", Dialect::Systemd).is_empty());
    }

    #[test]
    fn test_region_marker_needs_a_word_boundary() {
        // `#regional` is a plain comment, so the two lines form a comment run
        assert_eq!(
            folds("#regional\n# note", Dialect::Systemd),
            vec![(0, 1, Some(FoldingRangeKind::Comment))]
        );
    }

    #[test]
    fn test_systemd_continued_value() {
        let text = "ExecStart=/bin/a \\\n  --one \\\n  # note\n  --two\nRestart=no";
        assert_eq!(folds(text, Dialect::Systemd), vec![(0, 3, None)]);
    }

    #[test]
    fn test_mkosi_value_excludes_detached_comments() {
        let text = "Packages=\n  vim\n  # indented\n  git\n# detached\nBootable=yes";
        assert_eq!(folds(text, Dialect::Mkosi), vec![(0, 3, None)]);
    }

    #[test]
    fn test_mkosi_value_keeps_trailing_indented_comment() {
        let text = "Packages=vim\n  git\n  # indented\nBootable=yes";
        assert_eq!(folds(text, Dialect::Mkosi), vec![(0, 2, None)]);
    }

    #[test]
    fn test_single_line_value_with_indented_comment_is_not_folded() {
        assert!(folds("A=1\n  # note\nB=2", Dialect::Systemd).is_empty());
    }

    #[test]
    fn test_sections_exclude_trailing_comments() {
        let text = "[Unit]\nA=1\nB=2\n# about service\n[Service]\nC=3\n";
        assert_eq!(folds(text, Dialect::Systemd), vec![(0, 2, None), (4, 5, None)]);
    }

    #[test]
    fn test_empty_section_is_not_folded() {
        assert!(folds("[Unit]\n\n[Service]", Dialect::Systemd).is_empty());
    }

    #[test]
    fn test_partial_overlap_is_dropped() {
        // The value fold (1..4) keeps its indented comments, the comment run (3..5) crosses its end
        let text = "[S]\nK=\n  a\n  # c1\n  # c2\n# out\nX=1";
        assert_eq!(
            folds(text, Dialect::Mkosi),
            vec![(0, 6, None), (1, 4, None)]
        );
    }

    #[test]
    fn test_options_disable_families() {
        let text = "# a\n# b\n[Unit]\nA=1\n";
        let tokens = tokenize(text, TokenizerOptions::default()).tokens;
        let only_sections = FoldingOptions {
            comments: false,
            regions: false,
            values: false,
            sections: true,
        };
        let ranges = compute_folding_ranges_with(&tokens, &only_sections);
        assert_eq!(ranges, vec![FoldingRange::new(2, 3, None)]);
    }

    #[test]
    fn test_to_lsp_folding_range() {
        let lsp = to_lsp_folding_range(&FoldingRange::new(2, 5, Some(FoldingRangeKind::Region)));
        assert_eq!(lsp.start_line, 2);
        assert_eq!(lsp.end_line, 5);
        assert_eq!(lsp.kind, Some(FoldingRangeKind::Region));
        assert_eq!(lsp.start_character, None);
    }
}
