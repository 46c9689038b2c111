//! Deduplicated warnings.
//!
//! Input that is accepted but ignored (attribute case flags) or that silently
//! changes built-in behavior (a custom pseudo named like a built-in one) is
//! reported once per unique message through `tracing`.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about ignored or overridden input (emitted once per unique message)
///
/// Returns `true` when the warning was emitted, `false` when it was a repeat.
///
/// # Example
/// ```
/// use cssxpath_common::warning::warn_once;
///
/// let _ = warn_once("Selector", "attribute flag 'i' is ignored");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        tracing::warn!(component, "{message}");
    }
    should_emit
}

/// Clear all recorded warnings
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
