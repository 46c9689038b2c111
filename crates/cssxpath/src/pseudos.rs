//! Author-defined pseudo-classes.
//!
//! Custom pseudos are macros over selector text: before a selector is parsed,
//! every registered `:name` or `:name(args)` occurrence is replaced with the
//! selector text its handler returns. Keys are either plain names (`"first"`)
//! or slash-delimited patterns (`"/custom-(?P<n>\\d+)/"`) whose captures are
//! passed to the handler.
//!
//! ```
//! use cssxpath::{PseudoRegistry, apply_custom_pseudos};
//!
//! let pseudos = PseudoRegistry::new()
//!     .literal("radio", r#"input[type="radio"]"#)
//!     .function("nth", 1, |args| format!(":nth-child({})", args[0]));
//!
//! assert_eq!(
//!     apply_custom_pseudos(":radio:nth(2)", &pseudos).unwrap(),
//!     r#"input[type="radio"]:nth-child(2)"#
//! );
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use cssxpath_common::warning::warn_once;
use cssxpath_common::{Result, SyntaxError};
use fancy_regex::{Captures, Regex};
use itertools::Itertools;
use tracing::trace;

use crate::decorate::{PseudoClass, alias};
use crate::text::{LiteralTable, replace_all};

/// Optional parenthesized argument after a pseudo name. Without one, the name
/// must not continue (`:first` must not match `:first-child`).
const DATA_SUFFIX: &str = r"(?:\((?P<data>[^)]+)\)|(?![\w-]))";

/// Handler taking the comma-separated arguments of a custom pseudo.
pub type ArgsFn = dyn Fn(&[String]) -> String + Send + Sync;

/// Handler taking the raw argument text and the regex captures of a custom pseudo.
pub type MatchFn = dyn Fn(Option<&str>, &PseudoMatch) -> String + Send + Sync;

/// What a custom pseudo expands to.
#[derive(Clone)]
pub enum PseudoHandler {
    /// Fixed replacement text; any argument is discarded.
    Literal(String),
    /// Function of positional arguments.
    Args {
        /// Declared argument count. With more than one, the argument text is
        /// split on commas; otherwise it is passed whole.
        arity: usize,
        /// The expansion function.
        func: Arc<ArgsFn>,
    },
    /// Function of the raw argument and the pattern captures. Required for
    /// pattern keys.
    Match(Arc<MatchFn>),
}

impl fmt::Debug for PseudoHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Self::Args { arity, .. } => f.debug_struct("Args").field("arity", arity).finish(),
            Self::Match(_) => f.write_str("Match"),
        }
    }
}

/// Captures handed to a [`PseudoHandler::Match`] handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PseudoMatch {
    /// Named groups of the pattern that took part in the match.
    pub named: HashMap<String, String>,
    /// Group 1 is the whole pseudo name, followed by the pattern's own groups.
    /// Stored from index 0.
    pub positional: Vec<Option<String>>,
}

impl PseudoMatch {
    /// A named group's text.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// A positional group's text; `group(0)` is the pseudo name.
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&str> {
        self.positional.get(index).and_then(Option::as_deref)
    }
}

/// Insertion-ordered set of custom pseudos.
#[derive(Debug, Clone, Default)]
pub struct PseudoRegistry {
    entries: Vec<(String, PseudoHandler)>,
}

impl PseudoRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `key`, replacing (in place) any existing entry.
    pub fn insert(&mut self, key: impl Into<String>, handler: PseudoHandler) -> Option<PseudoHandler> {
        let key = key.into();
        if !is_pattern_key(&key) && (PseudoClass::from_str(&key).is_ok() || alias(&key).is_some()) {
            let _ = warn_once(
                "Pseudos",
                &format!("custom pseudo ':{key}' shadows a built-in pseudo-class"),
            );
        }

        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(existing, handler));
        }
        self.entries.push((key, handler));
        None
    }

    /// Add a fixed-text pseudo.
    #[must_use]
    pub fn literal(mut self, name: impl Into<String>, replacement: impl Into<String>) -> Self {
        let _ = self.insert(name, PseudoHandler::Literal(replacement.into()));
        self
    }

    /// Add a pseudo expanded by `func` from its arguments.
    #[must_use]
    pub fn function<F>(mut self, name: impl Into<String>, arity: usize, func: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        let _ = self.insert(
            name,
            PseudoHandler::Args {
                arity,
                func: Arc::new(func),
            },
        );
        self
    }

    /// Add a pseudo expanded by `func` from its raw argument and captures.
    /// `key` may be a plain name or a `/pattern/`.
    #[must_use]
    pub fn pattern<F>(mut self, key: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<&str>, &PseudoMatch) -> String + Send + Sync + 'static,
    {
        let _ = self.insert(key, PseudoHandler::Match(Arc::new(func)));
        self
    }

    /// The handler registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PseudoHandler> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, h)| h)
    }

    /// Registered keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of registered pseudos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_pattern_key(key: &str) -> bool {
    key.starts_with('/')
}

/// A validated pattern key ready to run.
struct PatternPass<'a> {
    regex: Regex,
    func: &'a MatchFn,
}

/// Check a `/pattern/flags` key and build its pass. Only the `i` flag is
/// honored.
fn compile_pattern<'a>(key: &str, handler: &'a PseudoHandler) -> Result<PatternPass<'a>> {
    let end = key.rfind('/').filter(|&end| end > 0).unwrap_or(1);
    let source = &key[1..end];
    let flags = &key[end..];

    let starts_ok = source.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let anchored_end = source.ends_with('$') && !source.ends_with("\\$");
    if !starts_ok || anchored_end {
        return Err(SyntaxError::InvalidPseudoPattern(key.to_string()));
    }

    let PseudoHandler::Match(func) = handler else {
        return Err(SyntaxError::PatternHandler(key.to_string()));
    };

    let case = if flags.contains('i') { "(?i)" } else { "" };
    let pattern = format!("{case}:({source}){DATA_SUFFIX}");
    let regex = Regex::new(&pattern).map_err(|err| SyntaxError::regex(&pattern, &err))?;
    Ok(PatternPass {
        regex,
        func: func.as_ref(),
    })
}

/// Expand every registered custom pseudo in `selector`.
///
/// Plain names are expanded in one pass, then each pattern key runs its own
/// pass in registry order. Expansions are not expanded again. Quoted strings
/// are never matched or split.
///
/// # Errors
///
/// Pattern keys are validated before any substitution:
/// [`SyntaxError::InvalidPseudoPattern`] when the pattern does not start with
/// `[a-z]` or is anchored, [`SyntaxError::PatternHandler`] when its handler is
/// not a [`PseudoHandler::Match`], [`SyntaxError::Regex`] when it does not
/// compile.
pub fn apply_custom_pseudos(selector: &str, registry: &PseudoRegistry) -> Result<String> {
    if registry.is_empty() {
        return Ok(selector.to_string());
    }

    let passes = registry
        .entries
        .iter()
        .filter(|(key, _)| is_pattern_key(key))
        .map(|(key, handler)| compile_pattern(key, handler))
        .collect::<Result<Vec<_>>>()?;

    let (mut text, literals) = LiteralTable::capture(selector)?;

    let names: Vec<String> = registry
        .keys()
        .filter(|key| !is_pattern_key(key))
        .map(|key| fancy_regex::escape(key).into_owned())
        .collect();

    if !names.is_empty() {
        let pattern = format!(":({}){DATA_SUFFIX}", names.iter().join("|"));
        let regex = Regex::new(&pattern).map_err(|err| SyntaxError::regex(&pattern, &err))?;
        text = replace_all(&regex, &text, |captures| {
            expand_name(registry, &literals, captures)
        })?;
    }

    for pass in &passes {
        text = replace_all(&pass.regex, &text, |captures| {
            expand_pattern(pass, &literals, captures)
        })?;
    }

    literals.restore(&text)
}

fn expand_name(
    registry: &PseudoRegistry,
    literals: &LiteralTable,
    captures: &Captures<'_>,
) -> Result<String> {
    let whole = captures.get(0).map_or("", |m| m.as_str());
    let name = captures.get(1).map_or("", |m| m.as_str());
    let Some(handler) = registry.get(name) else {
        return Ok(whole.to_string());
    };
    let data = captures
        .name("data")
        .map(|m| m.as_str().trim())
        .filter(|data| !data.is_empty());

    let expansion = match handler {
        PseudoHandler::Literal(text) => text.clone(),
        PseudoHandler::Args { arity, func } => {
            let args = match data {
                None => Vec::new(),
                Some(data) if *arity > 1 => data
                    .split(',')
                    .map(|arg| literals.restore(arg.trim()))
                    .collect::<Result<Vec<_>>>()?,
                Some(data) => vec![literals.restore(data)?],
            };
            func(&args)
        }
        PseudoHandler::Match(func) => {
            let data = data.map(|data| literals.restore(data)).transpose()?;
            func(data.as_deref(), &PseudoMatch::default())
        }
    };

    trace!(pseudo = name, %expansion, "expanded custom pseudo");
    Ok(expansion)
}

fn expand_pattern(
    pass: &PatternPass<'_>,
    literals: &LiteralTable,
    captures: &Captures<'_>,
) -> Result<String> {
    // The data group is always the last group of the pass regex.
    let data_index = captures.len() - 1;

    let mut named = HashMap::new();
    for (index, name) in pass.regex.capture_names().enumerate() {
        let (Some(name), Some(group)) = (name, captures.get(index)) else {
            continue;
        };
        if index != data_index {
            let _ = named.insert(name.to_string(), group.as_str().to_string());
        }
    }
    let positional = (1..data_index)
        .map(|index| captures.get(index).map(|m| m.as_str().to_string()))
        .collect();

    let data = captures
        .get(data_index)
        .map(|m| literals.restore(m.as_str()))
        .transpose()?;

    let matched = PseudoMatch { named, positional };
    let expansion = (pass.func)(data.as_deref(), &matched);
    trace!(pseudo = matched.group(0), %expansion, "expanded custom pseudo pattern");
    Ok(expansion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_is_identity() {
        let selector = ":foo('x')";
        assert_eq!(
            apply_custom_pseudos(selector, &PseudoRegistry::new()).unwrap(),
            selector
        );
    }

    #[test]
    fn names_do_not_match_longer_pseudos() {
        let pseudos = PseudoRegistry::new().literal("first", ":first-child:not(:last-child)");
        assert_eq!(
            apply_custom_pseudos("a :first-child c", &pseudos).unwrap(),
            "a :first-child c"
        );
        assert_eq!(
            apply_custom_pseudos(":first[b]", &pseudos).unwrap(),
            ":first-child:not(:last-child)[b]"
        );
    }

    #[test]
    fn later_names_are_tried_after_prefixes() {
        let pseudos = PseudoRegistry::new()
            .literal("link", "a")
            .literal("link2", "b");
        assert_eq!(apply_custom_pseudos(":link2 :link", &pseudos).unwrap(), "b a");
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut pseudos = PseudoRegistry::new().literal("a", "x").literal("b", "y");
        let previous = pseudos.insert("a", PseudoHandler::Literal("z".to_string()));
        assert!(matches!(previous, Some(PseudoHandler::Literal(text)) if text == "x"));
        assert_eq!(pseudos.keys().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn names_are_escaped() {
        let pseudos = PseudoRegistry::new().literal("a.b", "x");
        assert_eq!(apply_custom_pseudos(":a.b :aXb", &pseudos).unwrap(), "x :aXb");
    }

    #[test]
    fn pattern_receives_named_and_positional_groups() {
        let pseudos = PseudoRegistry::new().pattern(r"/h(?P<level>\d)/", |data, m| {
            format!(
                "{}|{}|{}|{}",
                m.group(0).unwrap_or_default(),
                m.group(1).unwrap_or_default(),
                m.get("level").unwrap_or_default(),
                data.unwrap_or("-")
            )
        });
        assert_eq!(
            apply_custom_pseudos(":h2(\"a, b\")", &pseudos).unwrap(),
            "h2|2|2|\"a, b\""
        );
    }

    #[test]
    fn pattern_flags() {
        let pseudos = PseudoRegistry::new().pattern("/big/i", |_, _| "x".to_string());
        assert_eq!(apply_custom_pseudos(":BIG", &pseudos).unwrap(), "x");
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        for key in ["/^foo/", "/Foo/", "/foo$/", "/"] {
            let pseudos = PseudoRegistry::new().pattern(key, |_, _| String::new());
            assert_eq!(
                apply_custom_pseudos(":foo", &pseudos),
                Err(SyntaxError::InvalidPseudoPattern(key.to_string())),
                "{key}"
            );
        }
        let pseudos = PseudoRegistry::new().literal("/foo/", "x");
        assert_eq!(
            apply_custom_pseudos(":foo", &pseudos),
            Err(SyntaxError::PatternHandler("/foo/".to_string()))
        );
    }
}
