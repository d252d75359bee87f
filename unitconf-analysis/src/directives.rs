//! Directive extraction
//!
//!     Walks the token sequence once and assembles one [`Directive`] per key. The open section
//!     is the text of the most recent section token and applies to every key until the next
//!     one.
//!
//!     A key immediately followed by an assignment collects every value token after it,
//!     skipping comments, until any other kind shows up. The collected texts are joined as
//!     captured, so escape characters and inner blanks survive unchanged. A key without an
//!     assignment yields a directive whose value is unset.

use serde::Serialize;
use unitconf_parser::{Range, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// Raw section header text, brackets included
    pub section: Option<String>,
    pub key: String,
    pub key_range: Range,
    /// Unset until an assignment follows the key
    pub value: Option<String>,
    pub value_ranges: Vec<Range>,
}

impl Directive {
    /// Section name without the brackets.
    pub fn section_name(&self) -> Option<&str> {
        self.section.as_deref().map(|section| {
            let section = section.strip_prefix('[').unwrap_or(section);
            section.strip_suffix(']').unwrap_or(section)
        })
    }

    /// Range spanning every value token.
    pub fn value_range(&self) -> Option<Range> {
        Range::bounding_box(self.value_ranges.iter())
    }

    pub fn is_complete(&self) -> bool {
        self.value.is_some()
    }

    /// Whether `offset` falls on the key or on one of the value tokens.
    pub fn covers(&self, offset: usize) -> bool {
        self.key_range.contains_offset(offset)
            || self
                .value_ranges
                .iter()
                .any(|range| range.contains_offset(offset))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Keep directives whose key has no assignment yet
    pub include_incomplete: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_incomplete: true,
        }
    }
}

pub fn extract_directives(tokens: &[Token], options: ExtractOptions) -> Vec<Directive> {
    let mut directives = Vec::new();
    let mut section: Option<&str> = None;

    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Section => section = Some(token.text.as_str()),
            TokenKind::DirectiveKey => {
                let directive = collect_directive(section, token, &tokens[index + 1..]);
                if directive.is_complete() || options.include_incomplete {
                    directives.push(directive);
                }
            }
            _ => {}
        }
    }

    tracing::debug!(
        directives = directives.len(),
        tokens = tokens.len(),
        "extracted directives"
    );
    directives
}

fn collect_directive(section: Option<&str>, key: &Token, rest: &[Token]) -> Directive {
    let mut directive = Directive {
        section: section.map(str::to_string),
        key: key.text.clone(),
        key_range: key.range,
        value: None,
        value_ranges: Vec::new(),
    };

    let Some((first, rest)) = rest.split_first() else {
        return directive;
    };
    if first.kind != TokenKind::Assignment {
        return directive;
    }

    let mut value = String::new();
    for token in rest {
        match token.kind {
            TokenKind::DirectiveValue => {
                value.push_str(&token.text);
                directive.value_ranges.push(token.range);
            }
            TokenKind::Comment => continue,
            _ => break,
        }
    }
    directive.value = Some(value);
    directive
}

/// The directive whose key or value covers `offset`.
pub fn directive_at(directives: &[Directive], offset: usize) -> Option<&Directive> {
    directives.iter().find(|directive| directive.covers(offset))
}

/// Directives under the section named `name` (without brackets).
pub fn directives_in_section<'a>(
    directives: &'a [Directive],
    name: &'a str,
) -> impl Iterator<Item = &'a Directive> + 'a {
    directives
        .iter()
        .filter(move |directive| directive.section_name() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitconf_parser::{tokenize, Dialect, TokenizerOptions};

    fn extract(text: &str, dialect: Dialect) -> Vec<Directive> {
        let tokens = tokenize(text, TokenizerOptions::new(dialect)).tokens;
        extract_directives(&tokens, ExtractOptions::default())
    }

    #[test]
    fn test_directives_carry_their_section() {
        let directives = extract(
            "Orphan=1\n[Unit]\nDescription=x\n[Service]\nType=simple\n",
            Dialect::Systemd,
        );
        let summary: Vec<_> = directives
            .iter()
            .map(|d| (d.section_name(), d.key.as_str(), d.value.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (None, "Orphan", Some("1")),
                (Some("Unit"), "Description", Some("x")),
                (Some("Service"), "Type", Some("simple")),
            ]
        );
        assert_eq!(directives[1].section.as_deref(), Some("[Unit]"));
    }

    #[test]
    fn test_key_without_assignment_is_incomplete() {
        let directives = extract("[Unit]\nDescript", Dialect::Systemd);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].key, "Descript");
        assert_eq!(directives[0].value, None);
        assert!(directives[0].value_ranges.is_empty());

        let tokens = tokenize("[Unit]\nDescript", TokenizerOptions::default()).tokens;
        let complete_only = extract_directives(
            &tokens,
            ExtractOptions {
                include_incomplete: false,
            },
        );
        assert!(complete_only.is_empty());
    }

    #[test]
    fn test_empty_value_is_set() {
        let directives = extract("Packages=\n", Dialect::Systemd);
        assert_eq!(directives[0].value.as_deref(), Some(""));
        assert_eq!(directives[0].value_range(), None);
    }

    #[test]
    fn test_continued_value_skips_comments() {
        let text = "ExecStart=/bin/echo \\\n# note\n  hello\nRestart=no";
        let directives = extract(text, Dialect::Systemd);
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].value.as_deref(), Some("/bin/echo \\hello"));
        assert_eq!(directives[0].value_ranges.len(), 2);
        assert_eq!(directives[1].key, "Restart");
    }

    #[test]
    fn test_mkosi_list_value() {
        let directives = extract("[Content]\nPackages=\n  vim\n  # x\n  git\n", Dialect::Mkosi);
        let packages = &directives[0];
        assert_eq!(packages.value.as_deref(), Some("vimgit"));
        let value_range = packages.value_range().map(|range| (range.start.line, range.end.line));
        assert_eq!(value_range, Some((2, 4)));
    }

    #[test]
    fn test_value_texts_match_their_ranges() {
        let text = "[S]\nA=one \\\n  two\nB=three";
        let directives = extract(text, Dialect::Systemd);
        for directive in &directives {
            let from_ranges: String = directive
                .value_ranges
                .iter()
                .map(|range| &text[range.span()])
                .collect();
            assert_eq!(directive.value.as_deref(), Some(from_ranges.as_str()));
        }
    }

    #[test]
    fn test_assignment_without_key_is_ignored() {
        let directives = extract("=value\nKey=1", Dialect::Systemd);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].key, "Key");
    }

    #[test]
    fn test_directive_at_and_in_section() {
        let text = "[Unit]\nAfter=a\n[Service]\nType=simple\nUser=me";
        let directives = extract(text, Dialect::Systemd);

        let offset = text.find("simple").unwrap_or_default() + 2;
        assert_eq!(
            directive_at(&directives, offset).map(|d| d.key.as_str()),
            Some("Type")
        );
        assert_eq!(
            directive_at(&directives, 0).map(|d| d.key.as_str()),
            None
        );

        let keys: Vec<_> = directives_in_section(&directives, "Service")
            .map(|d| d.key.as_str())
            .collect();
        assert_eq!(keys, vec!["Type", "User"]);
    }
}
