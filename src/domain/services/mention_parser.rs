//! Mention scanning.
//!
//! A mention is `@` followed by one or more ASCII word characters
//! (`[A-Za-z0-9_]`); a handle ends at the first character outside that set.
//! The scan is a lazy, single-pass iterator over the text; call
//! [`scan_mentions`] again to re-scan.

use once_cell::sync::Lazy;
use regex::{CaptureMatches, Regex};

static MENTION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([A-Za-z0-9_]+)").unwrap());

/// Lazy sequence of mentioned usernames, without the leading `@`.
pub struct Mentions<'t> {
    inner: CaptureMatches<'static, 't>,
}

impl<'t> Iterator for Mentions<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Scan `text` for `@username` tokens, in order of appearance.
pub fn scan_mentions(text: &str) -> Mentions<'_> {
    Mentions {
        inner: MENTION_REGEX.captures_iter(text),
    }
}
