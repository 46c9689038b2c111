//! String helpers shared by the preprocessor and the filter generator.

use std::sync::LazyLock;

use cssxpath_common::{Result, SyntaxError};
use fancy_regex::{Captures, Regex};
use itertools::Itertools;

/// A single- or double-quoted literal; the backreference keeps `"it's"` whole.
static LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(["'])(?:\\\1|.)*?\1"#).expect("literal regex"));

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__S(\d+)__").expect("placeholder regex"));

/// Replace every match of `regex` in `text` with the output of `replace`.
///
/// # Errors
///
/// Propagates regex evaluation failures (backtrack limits) and errors
/// returned by `replace`.
pub fn replace_all<F>(regex: &Regex, text: &str, mut replace: F) -> Result<String>
where
    F: FnMut(&Captures<'_>) -> Result<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for captures in regex.captures_iter(text) {
        let captures = captures.map_err(|err| SyntaxError::regex(regex.as_str(), &err))?;
        let Some(whole) = captures.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&replace(&captures)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Quoted literals masked out of a selector while custom pseudos are expanded.
///
/// Each literal is swapped for a `__S<n>__` placeholder so that commas,
/// parentheses and colons inside strings never reach the expansion regexes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralTable {
    literals: Vec<String>,
}

impl LiteralTable {
    /// Mask every quoted literal in `text`, returning the masked text and the table.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Regex`] if the literal scan fails.
    pub fn capture(text: &str) -> Result<(String, Self)> {
        let mut table = Self::default();
        let masked = replace_all(&LITERAL, text, |captures| {
            let literal = captures.get(0).map_or("", |m| m.as_str());
            table.literals.push(literal.to_string());
            Ok(format!("__S{}__", table.literals.len() - 1))
        })?;
        Ok((masked, table))
    }

    /// Put the original literals back in place of their placeholders.
    ///
    /// Placeholders this table never issued are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Regex`] if the placeholder scan fails.
    pub fn restore(&self, text: &str) -> Result<String> {
        if self.literals.is_empty() {
            return Ok(text.to_string());
        }
        replace_all(&PLACEHOLDER, text, |captures| {
            let whole = captures.get(0).map_or("", |m| m.as_str());
            let literal = captures
                .get(1)
                .and_then(|index| index.as_str().parse::<usize>().ok())
                .and_then(|index| self.literals.get(index));
            Ok(literal.map_or(whole, String::as_str).to_string())
        })
    }

    /// Number of captured literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// Returns true when the text contained no quoted literals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

/// Strip one pair of matching outer quotes, escape `"` as `&quot;` and wrap
/// the result in double quotes.
///
/// ```
/// use cssxpath::quoted_string;
///
/// assert_eq!(quoted_string("'Some text'"), "\"Some text\"");
/// assert_eq!(quoted_string("say \"hi\""), "\"say &quot;hi&quot;\"");
/// ```
#[must_use]
pub fn quoted_string(value: &str) -> String {
    let inner = ['\'', '"']
        .into_iter()
        .find(|quote| value.starts_with(*quote) && value.ends_with(*quote))
        .map_or(value, |quote| {
            let rest = &value[quote.len_utf8()..];
            rest.strip_suffix(quote).unwrap_or(rest)
        });
    format!("\"{}\"", inner.replace('"', "&quot;"))
}

/// Uppercase the first character when it is a word character.
#[must_use]
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_alphanumeric() || first == '_' => {
            first.to_uppercase().chain(chars).collect()
        }
        _ => word.to_string(),
    }
}

/// Letter tables for an XPath 1.0 `translate()` case fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseMap {
    /// Distinct lowercase letters, in order of first appearance.
    pub lower: String,
    /// `lower` uppercased.
    pub upper: String,
}

/// Build the case map for the letters of `text`.
///
/// Only ISO/IEC 8859-15 lowercase letters and Greek are folded; other scripts
/// have no case and pass through `translate()` unchanged.
#[must_use]
pub fn translate_case_map(text: &str) -> CaseMap {
    let lower: String = text
        .to_lowercase()
        .chars()
        .filter(|c| is_foldable(*c))
        .unique()
        .collect();
    let upper = lower.to_uppercase();
    CaseMap { lower, upper }
}

const fn is_foldable(c: char) -> bool {
    matches!(
        c,
        'a'..='z' | '\u{0161}' | '\u{017E}' | '\u{0153}' | '\u{00E0}'..='\u{00FF}' | '\u{03AC}'..='\u{03CE}'
    )
}

/// Collapse runs of whitespace to single spaces and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_are_masked_and_restored() {
        let (masked, table) = LiteralTable::capture(r#":link("a, b", 'c\'d')"#).unwrap();
        assert_eq!(masked, ":link(__S0__, __S1__)");
        assert_eq!(table.len(), 2);
        assert_eq!(table.restore(&masked).unwrap(), r#":link("a, b", 'c\'d')"#);
    }

    #[test]
    fn unknown_placeholders_survive_restore() {
        let (_, table) = LiteralTable::capture("'x'").unwrap();
        assert_eq!(table.restore("__S0__ __S7__").unwrap(), "'x' __S7__");
    }

    #[test]
    fn quoted_string_only_strips_matching_quotes() {
        assert_eq!(quoted_string("\"a\""), "\"a\"");
        assert_eq!(quoted_string("'a\""), "\"'a&quot;\"");
        assert_eq!(quoted_string("plain"), "\"plain\"");
    }

    #[test]
    fn case_map_keeps_first_occurrence_order() {
        let map = translate_case_map("\"CafÉ fØöBÄR\"");
        assert_eq!(map.lower, "caféøöbär");
        assert_eq!(map.upper, "CAFÉØÖBÄR");
        assert!(translate_case_map("עברית").lower.is_empty());
    }

    #[test]
    fn title_case_first_letter() {
        assert_eq!(title_case("nth"), "Nth");
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("-x"), "-x");
    }
}
