//! Deduplicated diagnostics.
//!
//! Unsupported properties, unknown tags and malformed values tend to repeat
//! once per element. [`warn_once`] forwards each distinct message to the
//! `log` facade a single time per document so a long event stream does not
//! bury the first occurrence.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Messages already reported since the last [`clear_warnings`].
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about unsupported input (logged once per unique message).
///
/// `component` becomes the log target, e.g. `numbat::css`.
///
/// # Example
/// ```
/// numbat_common::warning::warn_once("css", "unsupported unit 'vw' in width: 10vw");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let first_time = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if first_time {
        log::warn!(target: "numbat", "[{component}] {message}");
    }
}

/// Forget every recorded warning (call when a new document starts).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Number of distinct warnings recorded since the last [`clear_warnings`].
pub fn warning_count() -> usize {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map_or(0, HashSet::len)
}
