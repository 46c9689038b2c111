//! Predicate generation.
//!
//! Every tag, attribute and pseudo-class token resolves to one or more XPath
//! predicate fragments. Fragments for one location step are joined with
//! `and` by [`flatten_filters`]; selector alternatives inside `:not()` and
//! `:any()` are joined with `or`.

use std::sync::LazyLock;

use cssxpath_common::{Result, SyntaxError};
use cssxpath_selector::{AttributeAction, PseudoData, TokenKind, TokenStream};
use fancy_regex::Regex;
use itertools::Itertools;
use strum_macros::Display;

use crate::CompileOptions;
use crate::compiler::sub_expression;
use crate::decorate::{DecoratedToken, PseudoClass, decorate};
use crate::nth::nth_expression;
use crate::text::{collapse_whitespace, translate_case_map};

/// Fragments containing a comparison or a boolean keyword must be wrapped
/// before they are joined with others.
static NEEDS_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[=<>]|\b(and|or)\b").expect("parenthesize regex"));

/// Boolean operator used to join predicate fragments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operator {
    /// All fragments must hold.
    #[default]
    And,
    /// Any fragment may hold.
    Or,
}

/// Join predicate fragments with `operator`.
///
/// Empty fragments are dropped. When more than one fragment remains, those
/// that contain `=`, `<`, `>`, `and` or `or` are parenthesized. Duplicates
/// are removed, keeping the first occurrence.
///
/// # Errors
///
/// Returns [`SyntaxError::Regex`] if the fragment scan fails.
pub fn flatten_filters(filters: &[String], operator: Operator) -> Result<String> {
    let fragments: Vec<&String> = filters.iter().filter(|f| !f.is_empty()).collect();
    let wrap = fragments.len() > 1;

    let mut flattened = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let needs_parens = wrap
            && NEEDS_PARENS
                .is_match(fragment)
                .map_err(|err| SyntaxError::regex(NEEDS_PARENS.as_str(), &err))?;
        flattened.push(if needs_parens {
            format!("({fragment})")
        } else {
            fragment.clone()
        });
    }

    Ok(flattened
        .into_iter()
        .unique()
        .join(&format!(" {operator} ")))
}

/// Resolve each stream to an and-joined predicate, then join the streams
/// with `operator`. Combinators inside the streams are not supported.
///
/// # Errors
///
/// Propagates any error from [`resolve_filters`].
pub fn streams_expression(streams: &[TokenStream], operator: Operator) -> Result<String> {
    let mut stack = Vec::with_capacity(streams.len());
    for stream in streams {
        let mut filters = Vec::new();
        for token in stream {
            filters.extend(resolve_filters(&decorate(token.clone()))?);
        }
        stack.push(flatten_filters(&filters, Operator::And)?);
    }
    flatten_filters(&stack, operator)
}

/// Predicate fragments for one token.
///
/// # Errors
///
/// - [`SyntaxError::UnsupportedTokenType`] for `*`, combinators, the root
///   anchor and pseudo-elements
/// - [`SyntaxError::UnsupportedPseudo`] for pseudo-classes outside the
///   supported set
/// - [`SyntaxError::UnsupportedAttributeAction`], [`SyntaxError::BadNthExpression`]
///   and [`SyntaxError::MissingArgument`] for malformed tokens
pub fn resolve_filters(item: &DecoratedToken) -> Result<Vec<String>> {
    let token = &item.token;
    match token.kind {
        TokenKind::Tag => Ok(vec![tag_filter(token.name())]),
        TokenKind::Attribute => attribute_filters(
            token.name(),
            token.action,
            token.value.as_deref().unwrap_or_default(),
        ),
        TokenKind::Pseudo => {
            let Some(pseudo) = item.pseudo() else {
                return Err(SyntaxError::UnsupportedPseudo(token.name().to_string()));
            };
            pseudo_filters(pseudo, item).map(|filter| vec![filter])
        }
        kind => Err(SyntaxError::UnsupportedTokenType(kind.to_string())),
    }
}

/// `translate(name(), 'div', 'DIV') = 'DIV'`
fn tag_filter(name: &str) -> String {
    let map = translate_case_map(name);
    format!(
        "translate(name(), '{}', '{}') = '{}'",
        map.lower,
        map.upper,
        name.to_uppercase()
    )
}

fn attribute_filters(
    name: &str,
    action: Option<AttributeAction>,
    value: &str,
) -> Result<Vec<String>> {
    let exists = format!("@{name}");
    let filters = match action {
        Some(AttributeAction::Exists) => vec![exists],
        Some(AttributeAction::Element) => vec![
            exists,
            format!("contains(concat(' ', normalize-space(@{name}), ' '), ' {value} ')"),
        ],
        Some(AttributeAction::Any) => vec![exists, format!("contains(@{name}, '{value}')")],
        Some(AttributeAction::Start) => vec![exists, format!("starts-with(@{name}, '{value}')")],
        Some(AttributeAction::End) => {
            let offset = i64::try_from(value.chars().count()).unwrap_or(i64::MAX) - 1;
            vec![
                exists,
                format!("substring(@{name}, string-length(@{name})-{offset}) = '{value}'"),
            ]
        }
        Some(AttributeAction::Hyphen) => vec![
            exists,
            format!("(@{name} = '{value}' or starts-with(@{name}, '{value}-'))"),
        ],
        Some(AttributeAction::Not) => vec![format!("not(@{name}) or @{name} != '{value}'")],
        Some(AttributeAction::Equals) => vec![format!("@{name} = '{value}'")],
        None => {
            return Err(SyntaxError::UnsupportedAttributeAction {
                name: name.to_string(),
                action: "none".to_string(),
            });
        }
    };
    Ok(filters)
}

fn pseudo_filters(pseudo: PseudoClass, item: &DecoratedToken) -> Result<String> {
    let name = item.name();
    let data = item.token.data.as_ref();
    let text = || {
        data.and_then(PseudoData::as_text)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| SyntaxError::MissingArgument(name.to_string()))
    };

    let filter = match pseudo {
        PseudoClass::Empty => "not(*) and not(string-length())".to_string(),
        PseudoClass::Childless => "not(*) and not(string-length(normalize-space()))".to_string(),
        PseudoClass::FirstChild | PseudoClass::FirstOfType => "position() = 1".to_string(),
        PseudoClass::LastChild | PseudoClass::LastOfType => "position() = last()".to_string(),
        PseudoClass::OnlyChild => "last() = 1".to_string(),
        PseudoClass::NthChild | PseudoClass::NthOfType => nth_expression(text()?)?,
        PseudoClass::Not => {
            let streams = data
                .and_then(PseudoData::as_selector)
                .ok_or_else(|| SyntaxError::MissingArgument(name.to_string()))?;
            format!("not({})", streams_expression(streams, Operator::Or)?)
        }
        PseudoClass::Any => sub_expression(text()?, &CompileOptions::default())?,
        PseudoClass::Root | PseudoClass::Comment => {
            return Err(SyntaxError::UnsupportedPseudo(name.to_string()));
        }
        PseudoClass::Text
        | PseudoClass::TextCase
        | PseudoClass::TextContains
        | PseudoClass::TextContainsCase
        | PseudoClass::TextStart
        | PseudoClass::TextStartCase
        | PseudoClass::TextEnd
        | PseudoClass::TextEndCase => text_filter(pseudo, text()?),
    };
    Ok(filter)
}

/// Match the whitespace-normalized string value of the context node.
fn text_filter(pseudo: PseudoClass, search: &str) -> String {
    let mut haystack = "normalize-space()".to_string();
    let mut search = search.to_string();

    if !pseudo.is_case_sensitive() {
        let map = translate_case_map(&search);
        if !map.lower.is_empty() {
            haystack = format!(
                "translate(normalize-space(), '{}', '{}')",
                map.upper, map.lower
            );
        }
        search = search.to_lowercase();
    }

    // Keep the author's quote style so either kind can appear in the text.
    let (quote, inner) = match search.chars().next() {
        Some(quote @ ('\'' | '"')) if search.len() >= 2 && search.ends_with(quote) => {
            (quote, search[1..search.len() - 1].trim())
        }
        _ => ('"', search.as_str()),
    };
    let inner = collapse_whitespace(inner);
    let needle = format!("{quote}{inner}{quote}");

    match pseudo {
        PseudoClass::TextContains | PseudoClass::TextContainsCase => {
            format!("contains({haystack}, {needle})")
        }
        PseudoClass::TextStart | PseudoClass::TextStartCase => {
            format!("starts-with({haystack}, {needle})")
        }
        PseudoClass::TextEnd | PseudoClass::TextEndCase => {
            let offset = i64::try_from(inner.chars().count()).unwrap_or(i64::MAX) - 1;
            format!("substring({haystack}, string-length({haystack})-{offset}) = {needle}")
        }
        _ => format!("{haystack} = {needle}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cssxpath_selector::Token;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn single_fragment_is_left_alone() {
        let filter = "position() = 1".to_string();
        assert_eq!(
            flatten_filters(std::slice::from_ref(&filter), Operator::And).unwrap(),
            filter
        );
    }

    #[test]
    fn duplicate_fragments_collapse() {
        assert_eq!(
            flatten_filters(&strings(&["@b", "@b"]), Operator::And).unwrap(),
            "@b"
        );
    }

    #[test]
    fn comparisons_are_parenthesized() {
        assert_eq!(
            flatten_filters(&strings(&["@a", "@b = 'c'", "", "not(@d)"]), Operator::Or).unwrap(),
            "@a or (@b = 'c') or not(@d)"
        );
    }

    #[test]
    fn keyword_detection_is_word_bounded() {
        assert_eq!(
            flatten_filters(&strings(&["@color", "@order"]), Operator::And).unwrap(),
            "@color and @order"
        );
        assert_eq!(
            flatten_filters(&strings(&["@x", "a OR b"]), Operator::And).unwrap(),
            "@x and (a OR b)"
        );
    }

    #[test]
    fn hyphen_filter_is_balanced() {
        let filters =
            resolve_filters(&decorate(Token::attribute("b", AttributeAction::Hyphen, Some("c".to_string()))))
                .unwrap();
        assert_eq!(filters, ["@b", "(@b = 'c' or starts-with(@b, 'c-'))"]);
    }

    #[test]
    fn text_end_counts_characters() {
        assert_eq!(
            text_filter(PseudoClass::TextEndCase, "\"héllo\""),
            "substring(normalize-space(), string-length(normalize-space())-4) = \"héllo\""
        );
    }

    #[test]
    fn single_quotes_are_respected() {
        assert_eq!(
            text_filter(PseudoClass::TextCase, "'say \"hi\"'"),
            "normalize-space() = 'say \"hi\"'"
        );
    }

    #[test]
    fn unsupported_tokens() {
        assert_eq!(
            resolve_filters(&decorate(Token::bare(TokenKind::Universal))),
            Err(SyntaxError::UnsupportedTokenType("universal".to_string()))
        );
        assert_eq!(
            resolve_filters(&decorate(Token::pseudo("checked", None))),
            Err(SyntaxError::UnsupportedPseudo("checked".to_string()))
        );
        assert_eq!(
            resolve_filters(&decorate(Token::pseudo("text", None))),
            Err(SyntaxError::MissingArgument("text".to_string()))
        );
    }
}
