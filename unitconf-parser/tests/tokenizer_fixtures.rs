use rstest::rstest;
use unitconf_parser::unit::testing::{
    assert_prefix_incremental, assert_ranges_consistent, fixture, kinds_and_texts, FIXTURES,
};
use unitconf_parser::{tokenize, Dialect, TokenKind, TokenizerOptions};
use TokenKind::*;

#[rstest]
#[case("basic.service")]
#[case("continuation.service")]
#[case("regions.service")]
#[case("malformed.service")]
#[case("crlf.service")]
#[case("mkosi.conf")]
#[case("mkosi.conf.d/10-debug.conf")]
fn test_fixture_ranges_are_consistent(#[case] name: &str) {
    let fixture = fixture(name);
    assert_ranges_consistent(&fixture.source(), &fixture.tokenize());
}

#[test]
fn test_every_fixture_is_prefix_incremental() {
    for fixture in FIXTURES {
        assert_prefix_incremental(&fixture.source(), fixture.dialect());
    }
}

#[test]
fn test_fixtures_tokenize_differently_per_dialect() {
    let source = fixture("mkosi.conf").source();
    let systemd = tokenize(&source, TokenizerOptions::new(Dialect::Systemd)).tokens;
    let mkosi = tokenize(&source, TokenizerOptions::mkosi()).tokens;
    assert_ne!(kinds_and_texts(&systemd), kinds_and_texts(&mkosi));
}

#[test]
fn test_continuation_service() {
    let tokens = fixture("continuation.service").tokenize();
    assert_eq!(
        kinds_and_texts(&tokens),
        vec![
            (Section, "[Unit]"),
            (DirectiveKey, "Description"),
            (Assignment, "="),
            (DirectiveValue, "Service with continued command lines"),
            (Section, "[Service]"),
            (DirectiveKey, "ExecStart"),
            (Assignment, "="),
            (DirectiveValue, "/usr/bin/daemon \\"),
            (DirectiveValue, "--config /etc/daemon.conf \\"),
            (Comment, "# the next flag is optional"),
            (DirectiveValue, "--verbose"),
            (DirectiveKey, "Environment"),
            (Assignment, "="),
            (DirectiveValue, "\"A=1\" \\"),
            (DirectiveValue, "\"B=2\""),
            (DirectiveKey, "ExecStop"),
            (Assignment, "="),
            (DirectiveValue, "/bin/kill \\"),
            (DirectiveKey, "Restart"),
            (Assignment, "="),
            (DirectiveValue, "always"),
        ]
    );
}

#[test]
fn test_malformed_service_is_best_effort() {
    let tokens = fixture("malformed.service").tokenize();
    assert_eq!(
        kinds_and_texts(&tokens),
        vec![
            (Section, "[Unit"),
            (DirectiveKey, "Description"),
            (Assignment, "="),
            (DirectiveValue, "missing bracket above"),
            (Assignment, "="),
            (DirectiveValue, "orphan value"),
            (DirectiveKey, "JustAKey"),
            (Section, "[Service]"),
            (DirectiveKey, "Key"),
            (Assignment, "="),
            (DirectiveValue, "=double"),
            (Comment, "; indented comment"),
            (Section, "[]"),
        ]
    );
}

#[test]
fn test_crlf_service() {
    let fixture = fixture("crlf.service");
    let tokens = fixture.tokenize();
    assert_eq!(
        kinds_and_texts(&tokens),
        vec![
            (Section, "[Unit]"),
            (DirectiveKey, "Description"),
            (Assignment, "="),
            (DirectiveValue, "CRLF service"),
            (Comment, "# comment"),
            (DirectiveKey, "ExecStart"),
            (Assignment, "="),
            (DirectiveValue, "/bin/true \\"),
            (DirectiveValue, "--flag"),
            (Section, "[Install]"),
            (DirectiveKey, "WantedBy"),
            (Assignment, "="),
            (DirectiveValue, "default.target"),
        ]
    );
    assert!(tokens.iter().all(|token| !token.text.contains('\r')));
}

#[test]
fn test_mkosi_conf() {
    let tokens = fixture("mkosi.conf").tokenize();
    assert_eq!(
        kinds_and_texts(&tokens),
        vec![
            (Section, "[Distribution]"),
            (DirectiveKey, "Distribution"),
            (Assignment, "="),
            (DirectiveValue, "fedora"),
            (DirectiveKey, "Release"),
            (Assignment, "="),
            (DirectiveValue, "40"),
            (Section, "[Content]"),
            (Comment, "# Packages to install"),
            (DirectiveKey, "Packages"),
            (Assignment, "="),
            (DirectiveValue, "systemd"),
            (Comment, "# editors"),
            (DirectiveValue, "vim"),
            (DirectiveValue, "git"),
            (DirectiveKey, "Bootable"),
            (Assignment, "="),
            (DirectiveValue, "yes"),
            (DirectiveKey, "KernelCommandLine"),
            (Assignment, "="),
            (DirectiveValue, "console=ttyS0"),
            (DirectiveValue, "quiet"),
            (Section, "[Output]"),
            (DirectiveKey, "Format"),
            (Assignment, "="),
            (DirectiveValue, "disk"),
        ]
    );
}

#[test]
fn test_mkosi_drop_in_treats_semicolon_as_text() {
    let tokens = fixture("mkosi.conf.d/10-debug.conf").tokenize();
    let last = tokens.last().map(|token| (token.kind, token.text.as_str()));
    assert_eq!(last, Some((DirectiveKey, "; not a comment in mkosi")));
    assert!(tokens
        .iter()
        .any(|token| token.kind == DirectiveValue && token.text == "strace"));
}
