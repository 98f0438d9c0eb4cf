//! Parsed request target.
//!
//! # Responsibilities
//! - Hold the frozen (path, query) view produced by the parser
//! - Provide lossy text accessors for routing, logging and echoing
//! - Literal pattern search over the query string
//!
//! # Design Decisions
//! - Borrowed from the parser; no copies per request
//! - No percent-decoding: routes and parameters are matched literally

use std::borrow::Cow;

/// Path and query of a completed request, without `/` and `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    path: &'a [u8],
    query: &'a [u8],
}

impl<'a> RequestTarget<'a> {
    pub fn new(path: &'a [u8], query: &'a [u8]) -> Self {
        Self { path, query }
    }

    pub fn path(&self) -> &'a [u8] {
        self.path
    }

    pub fn query(&self) -> &'a [u8] {
        self.query
    }

    pub fn path_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.path)
    }

    pub fn query_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.query)
    }

    /// Whether `pattern` occurs anywhere in the query string.
    pub fn query_contains(&self, pattern: &str) -> bool {
        contains(self.query, pattern.as_bytes())
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_contains_is_literal_substring() {
        let target = RequestTarget::new(b"tally", b"cam=12&pgm=10");
        assert!(target.query_contains("cam=1"));
        assert!(target.query_contains("pgm=1"));
        assert!(!target.query_contains("pvw=1"));
        assert!(target.query_contains(""));
    }

    #[test]
    fn lossy_accessors_replace_invalid_utf8() {
        let target = RequestTarget::new(b"caf\xe9", b"");
        assert_eq!(target.path_str(), "caf\u{fffd}");
        assert_eq!(target.query_str(), "");
    }
}
