//! Selector token model.
//!
//! A selector list parses into one [`TokenStream`] per comma-separated
//! alternative. Each stream is a flat, left-to-right sequence of simple
//! selectors interleaved with combinator tokens, e.g. `a > .b` becomes
//! `tag(a) child attribute(class ~= b)`.

use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Ordered tokens of one complex selector.
pub type TokenStream = Vec<Token>;

/// What a [`Token`] represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors), e.g. `div`
    Tag,
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector): `*`
    Universal,
    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors),
    /// including the `#id` and `.class` shorthands.
    Attribute,
    /// A pseudo-class, e.g. `:first-child` or `:text("foo")`
    Pseudo,
    /// A pseudo-element, e.g. `::before`
    PseudoElement,
    /// Whitespace combinator
    Descendant,
    /// `>`
    Child,
    /// `~`
    Sibling,
    /// `+`
    Adjacent,
    /// Document root anchor. Never produced by the parser; the compiler
    /// synthesizes it for a leading `:root`.
    Root,
}

impl TokenKind {
    /// Returns true for the four combinator kinds.
    #[must_use]
    pub const fn is_combinator(self) -> bool {
        matches!(
            self,
            Self::Descendant | Self::Child | Self::Sibling | Self::Adjacent
        )
    }
}

/// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
///
/// The match operator of an attribute token.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum AttributeAction {
    /// `[att]`
    Exists,
    /// `[att~=val]`, whitespace-separated word match (also `.class`)
    Element,
    /// `[att*=val]`
    Any,
    /// `[att^=val]`
    Start,
    /// `[att$=val]`
    End,
    /// `[att|=val]`
    Hyphen,
    /// `[att!=val]` (non-standard, jQuery style)
    Not,
    /// `[att=val]` (also `#id`)
    Equals,
}

/// Argument of a functional pseudo-class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PseudoData {
    /// Raw argument text, trimmed but otherwise as authored (quotes included).
    Text(String),
    /// Parsed selector list, for `:not()` and its relatives.
    Selector(Vec<TokenStream>),
}

impl PseudoData {
    /// The raw argument text, if this is a text argument.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Selector(_) => None,
        }
    }

    /// The nested selector list, if this is a selector argument.
    #[must_use]
    pub fn as_selector(&self) -> Option<&[TokenStream]> {
        match self {
            Self::Selector(streams) => Some(streams),
            Self::Text(_) => None,
        }
    }
}

/// One simple selector or combinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Token kind.
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Tag, attribute, pseudo-class or pseudo-element name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Attribute value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Attribute match operator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<AttributeAction>,
    /// Pseudo-class argument.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PseudoData>,
}

impl Token {
    /// A token with no payload: `*`, a combinator, or the synthetic root.
    #[must_use]
    pub const fn bare(kind: TokenKind) -> Self {
        Self {
            kind,
            name: None,
            value: None,
            action: None,
            data: None,
        }
    }

    /// A type selector.
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::bare(TokenKind::Tag)
        }
    }

    /// An attribute selector. `value` is `None` only for [`AttributeAction::Exists`].
    #[must_use]
    pub fn attribute(
        name: impl Into<String>,
        action: AttributeAction,
        value: Option<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            value,
            action: Some(action),
            ..Self::bare(TokenKind::Attribute)
        }
    }

    /// A pseudo-class with an optional argument.
    #[must_use]
    pub fn pseudo(name: impl Into<String>, data: Option<PseudoData>) -> Self {
        Self {
            name: Some(name.into()),
            data,
            ..Self::bare(TokenKind::Pseudo)
        }
    }

    /// A pseudo-element.
    #[must_use]
    pub fn pseudo_element(name: impl Into<String>, data: Option<PseudoData>) -> Self {
        Self {
            name: Some(name.into()),
            data,
            ..Self::bare(TokenKind::PseudoElement)
        }
    }

    /// The token name, or `""` for nameless tokens.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// The pseudo-class argument as raw text.
    #[must_use]
    pub fn data_text(&self) -> Option<&str> {
        self.data.as_ref().and_then(PseudoData::as_text)
    }

    /// Returns true when this is the pseudo-class `name`.
    #[must_use]
    pub fn is_pseudo(&self, name: &str) -> bool {
        self.kind == TokenKind::Pseudo && self.name() == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kinds_use_kebab_case_names() {
        assert_eq!(TokenKind::PseudoElement.to_string(), "pseudo-element");
        assert_eq!(TokenKind::from_str("adjacent"), Ok(TokenKind::Adjacent));
        assert_eq!(AttributeAction::Hyphen.to_string(), "hyphen");
    }

    #[test]
    fn only_axes_are_combinators() {
        assert!(TokenKind::Sibling.is_combinator());
        assert!(!TokenKind::Root.is_combinator());
        assert!(!TokenKind::Universal.is_combinator());
    }

    #[test]
    fn pseudo_accessors() {
        let token = Token::pseudo("text", Some(PseudoData::Text("\"a\"".to_string())));
        assert!(token.is_pseudo("text"));
        assert_eq!(token.data_text(), Some("\"a\""));
        assert_eq!(Token::bare(TokenKind::Child).name(), "");
    }
}
