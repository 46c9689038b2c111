//! cssxpath command-line tool
//!
//! Compiles CSS selectors to XPath 1.0, one result per line.
//!
//! - cssxpath 'ul > li:first-child'        # compile
//! - cssxpath -s 'a.external, a[rel]'      # predicate only
//! - cssxpath --tokens 'div:nth-of-type(2)' # dump decorated tokens as JSON
//! - cat selectors.txt | cssxpath          # one selector per input line

mod config;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cssxpath::context::resolve_tag_context;
use cssxpath::decorate::decorate;
use cssxpath::{CompileOptions, apply_custom_pseudos, compile, sub_expression, token_streams};
use owo_colors::OwoColorize;
use serde_json::{Value, json};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// cssxpath: compile CSS selectors to XPath 1.0 expressions
#[derive(Parser, Debug)]
#[command(name = "cssxpath")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Compile a selector
    cssxpath '#main > p.note'

    # Several selectors, one XPath per line
    cssxpath 'a:first-child' 'li:nth-child(odd)'

    # Predicate for use inside another expression
    cssxpath -s 'a, b'

    # Custom pseudo-classes from a JSON file
    cssxpath --pseudos pseudos.json ':radio:nth(2)'

    # Read selectors from stdin
    cat selectors.txt | cssxpath
"#)]
struct Cli {
    /// Selectors to compile (read from stdin, one per line, when omitted)
    #[arg(value_name = "SELECTOR")]
    selectors: Vec<String>,

    /// Print a bare predicate instead of a location path
    #[arg(short = 's', long, conflicts_with_all = ["expand", "tokens"])]
    sub_expression: bool,

    /// Print the selector after custom pseudo expansion
    #[arg(long, conflicts_with = "tokens")]
    expand: bool,

    /// Dump the decorated token streams as JSON
    #[arg(long)]
    tokens: bool,

    /// JSON file of custom pseudo definitions
    #[arg(short, long, value_name = "FILE")]
    pseudos: Option<PathBuf>,

    /// Log pipeline stages (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

/// What to print for each selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Compile,
    SubExpression,
    Expand,
    Tokens,
}

impl From<&Cli> for Mode {
    fn from(cli: &Cli) -> Self {
        if cli.tokens {
            Self::Tokens
        } else if cli.expand {
            Self::Expand
        } else if cli.sub_expression {
            Self::SubExpression
        } else {
            Self::Compile
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = match &cli.pseudos {
        Some(path) => CompileOptions::with_pseudos(config::load_pseudos(path)?),
        None => CompileOptions::default(),
    };

    let selectors = if cli.selectors.is_empty() {
        read_stdin_selectors()?
    } else {
        cli.selectors.clone()
    };

    let mode = Mode::from(&cli);
    let mut failed = false;
    for selector in &selectors {
        match run(mode, selector, &options) {
            Ok(output) => println!("{output}"),
            Err(err) => {
                failed = true;
                eprintln!("{} {selector}: {err}", "error:".red().bold());
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_stdin_selectors() -> Result<Vec<String>> {
    let mut selectors = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            selectors.push(trimmed.to_string());
        }
    }
    Ok(selectors)
}

fn run(mode: Mode, selector: &str, options: &CompileOptions) -> Result<String> {
    Ok(match mode {
        Mode::Compile => compile(selector, options)?,
        Mode::SubExpression => sub_expression(selector, options)?,
        Mode::Expand => apply_custom_pseudos(selector, &options.pseudos)?,
        Mode::Tokens => serde_json::to_string_pretty(&token_dump(selector, options)?)?,
    })
}

/// Decorated tokens of every alternative, each with its `is*` flag names.
fn token_dump(selector: &str, options: &CompileOptions) -> Result<Value> {
    let mut streams = Vec::new();
    for stream in token_streams(selector, &options.pseudos)? {
        let mut tokens: Vec<_> = stream.into_iter().map(decorate).collect();
        if let Err(err) = resolve_tag_context(&mut tokens) {
            warn!(selector, "{err}");
        }

        let mut dumped = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let mut value = serde_json::to_value(token)?;
            value["flags"] = json!(token.flag_names());
            dumped.push(value);
        }
        streams.push(Value::Array(dumped));
    }
    Ok(json!({ "selector": selector, "streams": streams }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_precedence() {
        let cli = Cli::parse_from(["cssxpath", "--expand", "a"]);
        assert_eq!(Mode::from(&cli), Mode::Expand);
        let cli = Cli::parse_from(["cssxpath", "-s", "a"]);
        assert_eq!(Mode::from(&cli), Mode::SubExpression);
        let cli = Cli::parse_from(["cssxpath", "a", "b"]);
        assert_eq!(Mode::from(&cli), Mode::Compile);
        assert_eq!(cli.selectors, ["a", "b"]);
    }

    #[test]
    fn conflicting_modes_are_rejected() {
        assert!(Cli::try_parse_from(["cssxpath", "-s", "--tokens", "a"]).is_err());
    }

    #[test]
    fn run_modes() {
        let options = CompileOptions::default();
        assert_eq!(run(Mode::Compile, "a, b", &options).unwrap(), "(//a|//b)");
        assert_eq!(run(Mode::SubExpression, "[b]", &options).unwrap(), "@b");
        assert_eq!(run(Mode::Expand, ":x", &options).unwrap(), ":x");
        assert!(run(Mode::Compile, ":hover", &options).is_err());
    }

    #[test]
    fn token_dump_includes_flags_and_context() {
        let dump = token_dump("div:first-child", &CompileOptions::default()).unwrap();
        let pseudo = &dump["streams"][0][1];
        assert_eq!(pseudo["type"], "pseudo");
        assert_eq!(pseudo["name"], "first-child");
        assert_eq!(pseudo["tag_context"], "div");
        assert_eq!(pseudo["flags"], json!(["isPseudo", "isPseudoFirstChild"]));
    }
}
