//! Token classification.
//!
//! The generator asks the same questions of every token ("is this a sibling
//! axis?", "is this `:nth-child`?"), so the answers are computed once when a
//! token enters the pipeline and carried alongside it as [`Flags`].

use std::str::FromStr;

use cssxpath_selector::{PseudoData, Token, TokenKind, TokenStream};
use itertools::Itertools;
use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::text::title_case;

/// The pseudo-classes the compiler can translate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PseudoClass {
    /// `:root`, only meaningful as the first token of a selector
    Root,
    /// `:comment` / `:comment(n)`, selects comment nodes
    Comment,
    /// `:not(selector list)`
    Not,
    /// `:any(selector list)`, any of the comma-separated alternatives
    Any,
    /// `:empty`, no child elements and no text
    Empty,
    /// `:childless`, no child elements and only whitespace text
    Childless,
    /// `:first-child`
    FirstChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-child`
    LastChild,
    /// `:last-of-type`
    LastOfType,
    /// `:only-child`
    OnlyChild,
    /// `:nth-child(an+b)`
    NthChild,
    /// `:nth-of-type(an+b)`
    NthOfType,
    /// `:text(s)`, case-insensitive equality of normalized text
    Text,
    /// `:text-case(s)`
    TextCase,
    /// `:text-contains(s)`
    TextContains,
    /// `:text-contains-case(s)`
    TextContainsCase,
    /// `:text-start(s)`
    TextStart,
    /// `:text-start-case(s)`
    TextStartCase,
    /// `:text-end(s)`
    TextEnd,
    /// `:text-end-case(s)`
    TextEndCase,
}

impl PseudoClass {
    /// Pseudo-classes that filter by position among siblings. When they follow
    /// a tag, the tag test moves into the predicate so `position()` counts all
    /// element siblings.
    #[must_use]
    pub const fn is_child_position(self) -> bool {
        matches!(
            self,
            Self::FirstChild | Self::LastChild | Self::NthChild | Self::OnlyChild
        )
    }

    /// The `:text*` family.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::TextCase
                | Self::TextContains
                | Self::TextContainsCase
                | Self::TextStart
                | Self::TextStartCase
                | Self::TextEnd
                | Self::TextEndCase
        )
    }

    /// `:text*-case` variants compare without case folding.
    #[must_use]
    pub const fn is_case_sensitive(self) -> bool {
        matches!(
            self,
            Self::TextCase | Self::TextContainsCase | Self::TextStartCase | Self::TextEndCase
        )
    }
}

/// Shorthand pseudo names rewritten before classification.
pub const PSEUDO_ALIASES: [(&str, &str); 4] = [
    ("first", "first-child"),
    ("last", "last-child"),
    ("child", "nth-child"),
    ("contains", "text-contains"),
];

/// The canonical name for an aliased pseudo-class.
#[must_use]
pub fn alias(name: &str) -> Option<&'static str> {
    PSEUDO_ALIASES
        .iter()
        .find(|(short, _)| *short == name)
        .map(|(_, canonical)| *canonical)
}

/// Rewrite aliased pseudo names in place, including inside `:not()` arguments.
pub fn alias_pseudos(streams: &mut [TokenStream]) {
    for token in streams.iter_mut().flatten() {
        if token.kind != TokenKind::Pseudo {
            continue;
        }
        if let Some(canonical) = alias(token.name()) {
            token.name = Some(canonical.to_string());
        }
        if let Some(PseudoData::Selector(nested)) = &mut token.data {
            alias_pseudos(nested);
        }
    }
}

/// Precomputed role flags for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Flags {
    /// The token kind.
    pub kind: TokenKind,
    /// The supported pseudo-class, for pseudo tokens with a known name.
    pub pseudo: Option<PseudoClass>,
    /// `~` or `+`
    pub is_sibling_axis: bool,
    /// Descendant whitespace or `>`
    pub is_non_sibling_axis: bool,
    /// Any combinator.
    pub is_axis: bool,
    /// A type selector or `*`.
    pub is_tag_or_universal: bool,
}

/// Compute the flags of a token.
#[must_use]
pub fn classify(token: &Token) -> Flags {
    let kind = token.kind;
    let is_sibling_axis = matches!(kind, TokenKind::Sibling | TokenKind::Adjacent);
    let is_non_sibling_axis = matches!(kind, TokenKind::Descendant | TokenKind::Child);
    let pseudo = if kind == TokenKind::Pseudo {
        PseudoClass::from_str(token.name()).ok()
    } else {
        None
    };

    Flags {
        kind,
        pseudo,
        is_sibling_axis,
        is_non_sibling_axis,
        is_axis: is_sibling_axis || is_non_sibling_axis,
        is_tag_or_universal: matches!(kind, TokenKind::Tag | TokenKind::Universal),
    }
}

/// A parser token with its flags and resolved tag context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecoratedToken {
    /// The token as parsed.
    #[serde(flatten)]
    pub token: Token,
    /// Role flags computed by [`classify`].
    #[serde(skip)]
    pub flags: Flags,
    /// Name of the type selector this token qualifies, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_context: Option<String>,
}

/// Attach flags to a token.
#[must_use]
pub fn decorate(token: Token) -> DecoratedToken {
    DecoratedToken {
        flags: classify(&token),
        token,
        tag_context: None,
    }
}

impl DecoratedToken {
    /// The supported pseudo-class this token names, if any.
    #[must_use]
    pub const fn pseudo(&self) -> Option<PseudoClass> {
        self.flags.pseudo
    }

    /// The token name, or `""`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.token.name()
    }

    /// Flag names in `is<Kind>` / `is<Kind><Name>` form, e.g. `isPseudo`,
    /// `isPseudoNthChild`, followed by the axis flags that are set.
    #[must_use]
    pub fn flag_names(&self) -> Vec<String> {
        let kind = camel_case(&self.flags.kind.to_string());
        let mut names = vec![format!("is{kind}")];
        if let Some(name) = &self.token.name {
            names.push(format!("is{kind}{}", camel_case(name)));
        }
        let axis_flags = [
            (self.flags.is_sibling_axis, "isSiblingAxis"),
            (self.flags.is_non_sibling_axis, "isNonSiblingAxis"),
            (self.flags.is_axis, "isAxis"),
            (self.flags.is_tag_or_universal, "isTagOrUniversal"),
        ];
        names.extend(
            axis_flags
                .into_iter()
                .filter(|(set, _)| *set)
                .map(|(_, name)| name.to_string()),
        );
        names
    }
}

fn camel_case(kebab: &str) -> String {
    kebab.split('-').map(title_case).join("")
}
