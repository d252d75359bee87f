//! Command-line interface for unitconf
//! This binary inspects systemd and mkosi configuration files the way an editor sees them.
//!
//! Usage:
//!   unitconf `<path>` [--format `<format>`] [--dialect `<dialect>`] [--offset `<n>`]
//!   unitconf `<path>` --config `<file>`      - Layer a TOML configuration over the defaults
//!
//! Formats: tokens, token-simple, directives, folding, context

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use unitconf_analysis::{compute_folding_ranges_with, cursor_context, extract_directives, ExtractOptions};
use unitconf_config::{Loader, OutputFormat, UnitConfig};
use unitconf_parser::{tokenize, Dialect, Token, TokenizerOptions};

const DEFAULT_CONFIG_FILE: &str = "unitconf.toml";

fn cli() -> Command {
    Command::new("unitconf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect tokens, directives, folding ranges and cursor context of unit files")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the unit or mkosi configuration file")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format (default from configuration: tokens)")
                .value_parser(OutputFormat::ALL.map(OutputFormat::as_str)),
        )
        .arg(
            Arg::new("dialect")
                .long("dialect")
                .short('d')
                .help("Dialect, or 'auto' to pick it from the file name")
                .value_parser(["auto", "systemd", "mkosi"]),
        )
        .arg(
            Arg::new("offset")
                .long("offset")
                .help("Byte offset for the context format (default: end of file)")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .help("Print JSON on a single line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log verbosity (-v, -vv, -vvv)")
                .action(ArgAction::Count),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    let Some(path) = matches.get_one::<PathBuf>("path") else {
        bail!("missing input path");
    };
    let config = load_config(&matches)?;
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let dialect = config.tokenizer.dialect.resolve(path);
    tracing::info!(path = %path.display(), %dialect, format = %config.output.format, "inspecting");

    let offset = matches.get_one::<usize>("offset").copied();
    let rendered = render(&source, dialect, &config, offset)?;
    println!("{rendered}");
    Ok(())
}

/// Logs go to stderr so that stdout stays machine-readable. `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<UnitConfig> {
    let mut loader = match matches.get_one::<PathBuf>("config") {
        Some(file) => Loader::new().with_file(file),
        None => Loader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader.set_override("output.format", format.as_str())?;
    }
    if let Some(dialect) = matches.get_one::<String>("dialect") {
        loader = loader.set_override("tokenizer.dialect", dialect.as_str())?;
    }
    if matches.get_flag("compact") {
        loader = loader.set_override("output.pretty", false)?;
    }
    loader.build().context("failed to load configuration")
}

fn render(source: &str, dialect: Dialect, config: &UnitConfig, offset: Option<usize>) -> Result<String> {
    let output = tokenize(source, TokenizerOptions::new(dialect));
    let pretty = config.output.pretty;

    match config.output.format {
        OutputFormat::Tokens => to_json(&output, pretty),
        OutputFormat::TokenSimple => Ok(render_token_simple(&output.tokens)),
        OutputFormat::Directives => {
            to_json(&extract_directives(&output.tokens, ExtractOptions::default()), pretty)
        }
        OutputFormat::Folding => {
            to_json(&compute_folding_ranges_with(&output.tokens, &config.folding), pretty)
        }
        OutputFormat::Context => {
            let offset = checked_offset(source, offset)?;
            to_json(&cursor_context(source, offset, dialect), pretty)
        }
    }
}

fn render_token_simple(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| token.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn checked_offset(source: &str, offset: Option<usize>) -> Result<usize> {
    let offset = offset.unwrap_or(source.len());
    if offset > source.len() {
        bail!("offset {offset} is past the end of the file ({} bytes)", source.len());
    }
    if !source.is_char_boundary(offset) {
        bail!("offset {offset} is inside a multi-byte character");
    }
    Ok(offset)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("failed to serialize output")
}
