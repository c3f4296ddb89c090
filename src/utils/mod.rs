//! Utility functions and helpers.

pub mod http;

#[cfg(test)]
pub(crate) mod test_server;

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
