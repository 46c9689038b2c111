//! Tag-context resolution.
//!
//! `div:first-child` and `div:nth-of-type(2)` both need to know which element
//! name the pseudo-class qualifies. One forward pass records the most recent
//! type selector of the current compound and hands it to every later token
//! until the next combinator.

use cssxpath_common::{Result, SyntaxError};
use cssxpath_selector::TokenKind;

use crate::decorate::DecoratedToken;

/// Fill in `tag_context` for every token that follows a type selector in the
/// same compound selector.
///
/// # Errors
///
/// Returns [`SyntaxError::MissingTagContext`] for a `*-of-type` pseudo-class
/// with no type selector before it.
pub fn resolve_tag_context(stream: &mut [DecoratedToken]) -> Result<()> {
    let mut current: Option<String> = None;

    for item in stream.iter_mut() {
        if item.token.kind == TokenKind::Tag {
            current.clone_from(&item.token.name);
        } else if item.flags.is_axis {
            current = None;
        } else if current.is_some() {
            item.tag_context.clone_from(&current);
        }

        if item.token.kind == TokenKind::Pseudo
            && item.name().ends_with("-of-type")
            && item.tag_context.is_none()
        {
            return Err(SyntaxError::MissingTagContext(item.name().to_string()));
        }
    }

    Ok(())
}
