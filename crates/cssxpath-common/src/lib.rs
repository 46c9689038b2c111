//! Common utilities for the cssxpath compiler.
//!
//! This crate provides shared infrastructure used by the parser and the compiler:
//! - **Errors** - the single [`SyntaxError`] kind every stage reports
//! - **Warning System** - deduplicated warnings for ignored or shadowed input

pub mod error;
pub mod warning;

pub use error::{Result, SyntaxError};
