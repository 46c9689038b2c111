//! CSS selector to XPath 1.0 compiler.
//!
//! The pipeline:
//! - **Custom pseudos** ([`pseudos`]) - author-defined `:name(args)` macros
//!   expanded in the selector text
//! - **Parsing** - [`cssxpath_selector::parse`], one token stream per alternative
//! - **Decoration** ([`decorate`]) - alias canonicalization and role flags
//! - **Tag context** ([`context`]) - which type selector each pseudo qualifies
//! - **Generation** ([`compiler`], [`filters`], [`nth`]) - location steps and predicates
//!
//! ```
//! use cssxpath::css_to_xpath;
//!
//! assert_eq!(css_to_xpath("#a > .b:last-child").unwrap(),
//!     "//*[@id = 'a']/*[@class and contains(concat(' ', normalize-space(@class), ' '), ' b ') and (position() = last())]");
//! assert_eq!(css_to_xpath("a, b").unwrap(), "(//a|//b)");
//! ```
//!
//! Beyond standard CSS, the compiler understands `:text()` and friends for
//! matching text content, `:comment` for comment nodes, `:childless` and
//! `:any()`. See [`decorate::PseudoClass`] for the full list.

pub mod compiler;
pub mod context;
pub mod decorate;
pub mod filters;
pub mod nth;
pub mod pseudos;
pub mod text;

pub use compiler::{compile, sub_expression, token_streams};
pub use cssxpath_common::{Result, SyntaxError};
pub use cssxpath_selector::{Token, TokenKind, TokenStream};
pub use pseudos::{PseudoHandler, PseudoMatch, PseudoRegistry, apply_custom_pseudos};
pub use text::quoted_string;

/// Options for [`compile`] and [`sub_expression`].
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Custom pseudos expanded before parsing.
    pub pseudos: PseudoRegistry,
}

impl CompileOptions {
    /// Options with the given custom pseudos.
    #[must_use]
    pub const fn with_pseudos(pseudos: PseudoRegistry) -> Self {
        Self { pseudos }
    }
}

/// Compile `selector` with no custom pseudos.
///
/// # Errors
///
/// See [`compile`].
pub fn css_to_xpath(selector: &str) -> Result<String> {
    compile(selector, &CompileOptions::default())
}
