//! The error type shared by the selector parser and the XPath compiler.
//!
//! Every failure aborts the whole call: no partial XPath is ever returned, so
//! a single syntax-error kind with a descriptive variant is all callers need.

/// Result alias used across the cssxpath crates.
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// A selector that cannot be parsed or translated to XPath.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// The selector text is malformed.
    #[error("Invalid selector at offset {position}: {message}")]
    Parse {
        /// Character offset where the problem was detected.
        position: usize,
        /// What went wrong.
        message: String,
    },

    /// An attribute selector uses an operator that has no XPath translation.
    #[error("Unsupported attribute selector @{name} (action: {action}).")]
    UnsupportedAttributeAction {
        /// The attribute name.
        name: String,
        /// The match operator, e.g. `exists` or `equals`.
        action: String,
    },

    /// A pseudo-class outside the supported subset.
    #[error("Unsupported pseudo selector '{0}'.")]
    UnsupportedPseudo(String),

    /// A token that cannot be expressed as a predicate (axes, pseudo-elements, `*`).
    #[error("Unsupported token type '{0}'.")]
    UnsupportedTokenType(String),

    /// The argument of `:nth-child` / `:nth-of-type` is not an `an+b` expression.
    #[error("Unrecognized nth-expression '{0}'.")]
    BadNthExpression(String),

    /// A `*-of-type` pseudo was used without a preceding element name.
    #[error(
        "*-of-type pseudos require a tag context: ':{0}' needs an explicit tag before it, e.g. 'div:{0}'"
    )]
    MissingTagContext(String),

    /// A pseudo-class that needs an argument was written without one.
    #[error("Pseudo selector ':{0}' requires an argument.")]
    MissingArgument(String),

    /// A custom pseudo pattern key that does not start with `[a-z]` or uses anchors.
    #[error("Custom pseudo regexes must begin with [a-z] and not use anchors (^$): '{0}'")]
    InvalidPseudoPattern(String),

    /// A custom pseudo pattern key registered with a non-function handler.
    #[error("Custom pseudo regexes must have a function handler: '{0}'")]
    PatternHandler(String),

    /// A regular expression could not be compiled or evaluated.
    #[error("Regex error in '{pattern}': {message}")]
    Regex {
        /// The offending pattern.
        pattern: String,
        /// The engine's explanation.
        message: String,
    },
}

impl SyntaxError {
    /// Build a [`SyntaxError::Parse`] at `position`.
    #[must_use]
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Build a [`SyntaxError::Regex`] from any displayable engine error.
    #[must_use]
    pub fn regex(pattern: &str, error: &impl std::fmt::Display) -> Self {
        Self::Regex {
            pattern: pattern.to_string(),
            message: error.to_string(),
        }
    }
}
