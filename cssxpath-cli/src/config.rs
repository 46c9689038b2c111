//! Custom pseudo definitions loaded from a JSON file.
//!
//! The file is an object mapping pseudo names (or `/pattern/` keys) to either
//! a replacement string or a template:
//!
//! ```json
//! {
//!   "radio": "input[type=\"radio\"]",
//!   "nth": { "template": ":nth-child($1)" },
//!   "/heading-(?P<level>\\d)/": { "template": "h${level}:contains($data)" }
//! }
//! ```
//!
//! Templates substitute `$1..$n` (arguments, or capture groups for patterns),
//! `${name}` (named capture groups), `$data` (the raw argument) and `$$`.
//! Entries keep their file order.

use std::path::Path;

use anyhow::{Context, Result};
use cssxpath::{PseudoMatch, PseudoRegistry};
use serde::Deserialize;
use serde_json::{Map, Value};

/// One entry of the pseudo file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PseudoDefinition {
    /// Fixed replacement text.
    Literal(String),
    /// Template expanded from the pseudo's arguments.
    Template {
        /// The template text.
        template: String,
        /// Number of comma-separated arguments; defaults to the highest `$n`.
        #[serde(default)]
        arity: Option<usize>,
    },
}

/// A `$` reference inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder<'a> {
    Index(usize),
    Name(&'a str),
    Data,
}

/// Read and parse a pseudo file.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a valid pseudo definition object.
pub fn load_pseudos(path: &Path) -> Result<PseudoRegistry> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading pseudo file {}", path.display()))?;
    registry_from_json(&text).with_context(|| format!("parsing pseudo file {}", path.display()))
}

/// Build a registry from pseudo file contents.
///
/// # Errors
///
/// Fails if `text` is not a JSON object of strings and `{ "template": ... }` objects.
pub fn registry_from_json(text: &str) -> Result<PseudoRegistry> {
    let entries: Map<String, Value> = serde_json::from_str(text)?;
    let mut registry = PseudoRegistry::new();

    for (key, value) in entries {
        let definition: PseudoDefinition = serde_json::from_value(value)
            .with_context(|| format!("invalid definition for '{key}'"))?;
        registry = match definition {
            PseudoDefinition::Literal(text) => registry.literal(key, text),
            PseudoDefinition::Template { template, .. } if key.starts_with('/') => {
                registry.pattern(key, move |data, matched| {
                    render_match(&template, data, matched)
                })
            }
            PseudoDefinition::Template { template, arity } => {
                let arity = arity.unwrap_or_else(|| highest_index(&template));
                registry.function(key, arity, move |args| render_args(&template, args))
            }
        };
    }

    Ok(registry)
}

fn render_args(template: &str, args: &[String]) -> String {
    render(template, |placeholder| match placeholder {
        Placeholder::Index(index) => index
            .checked_sub(1)
            .and_then(|i| args.get(i))
            .cloned(),
        Placeholder::Data => Some(args.join(", ")),
        Placeholder::Name(_) => None,
    })
}

fn render_match(template: &str, data: Option<&str>, matched: &PseudoMatch) -> String {
    render(template, |placeholder| match placeholder {
        Placeholder::Index(index) => index
            .checked_sub(1)
            .and_then(|i| matched.group(i))
            .map(str::to_string),
        Placeholder::Name(name) => matched.get(name).map(str::to_string),
        Placeholder::Data => data.map(str::to_string),
    })
}

/// Highest `$n` in `template`, at least 1.
fn highest_index(template: &str) -> usize {
    let mut highest = 1;
    let _ = render(template, |placeholder| {
        if let Placeholder::Index(index) = placeholder {
            highest = highest.max(index);
        }
        None
    });
    highest
}

/// Substitute `$` references; unresolved ones become empty.
fn render<'t, F>(template: &'t str, mut resolve: F) -> String
where
    F: FnMut(Placeholder<'t>) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(tail) = after.strip_prefix("data") {
            out.push_str(&resolve(Placeholder::Data).unwrap_or_default());
            rest = tail;
        } else if let Some((name, tail)) = after
            .strip_prefix('{')
            .and_then(|inner| inner.split_once('}'))
        {
            out.push_str(&resolve(Placeholder::Name(name)).unwrap_or_default());
            rest = tail;
        } else {
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            match after[..digits].parse::<usize>() {
                Ok(index) => out.push_str(&resolve(Placeholder::Index(index)).unwrap_or_default()),
                Err(_) => out.push('$'),
            }
            rest = &after[digits..];
        }
    }

    out.push_str(rest);
    out
}
