//! CSS selector parsing for the cssxpath compiler.
//!
//! This crate turns selector text into flat token streams:
//! - **Scanner** - code-point cursor with CSS ident, escape and string rules
//! - **Tokens** - [`Token`], [`TokenKind`], [`AttributeAction`], [`PseudoData`]
//! - **Parser** - [`parse`], one [`TokenStream`] per comma-separated selector
//!
//! ```
//! use cssxpath_selector::{TokenKind, parse};
//!
//! let streams = parse("ul > li.item, p").unwrap();
//! assert_eq!(streams.len(), 2);
//! assert_eq!(streams[0][1].kind, TokenKind::Child);
//! ```

pub mod parser;
pub mod scanner;
pub mod token;

pub use parser::parse;
pub use token::{AttributeAction, PseudoData, Token, TokenKind, TokenStream};
