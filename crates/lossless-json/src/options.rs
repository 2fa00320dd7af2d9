//! Decode and encode options.

use serde::{Deserialize, Serialize};

/// Behaviour switches for a [`Lossless`](crate::Lossless) wrapper.
///
/// Deserializable so a host application can load it from its own
/// configuration; missing keys take the defaults.
///
/// ```
/// use lossless_json::Options;
///
/// let options = Options::default().with_pretty(true);
/// assert!(options.weakly_typed);
/// assert!(options.pretty);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Accept lenient conversions on hydrate (`"42"` into an integer field,
    /// `42` into a string field, and so on).
    pub weakly_typed: bool,
    /// Fall back to a case-insensitive key match when a field's name has no
    /// exact match in the document.
    pub case_insensitive: bool,
    /// Pretty-print encoded output.
    pub pretty: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            weakly_typed: true,
            case_insensitive: true,
            pretty: false,
        }
    }
}

impl Options {
    /// Exact names and plain serde typing: no fallbacks.
    pub fn strict() -> Self {
        Self {
            weakly_typed: false,
            case_insensitive: false,
            pretty: false,
        }
    }

    pub fn with_weakly_typed(mut self, weakly_typed: bool) -> Self {
        self.weakly_typed = weakly_typed;
        self
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient() {
        let options = Options::default();
        assert!(options.weakly_typed);
        assert!(options.case_insensitive);
        assert!(!options.pretty);
    }

    #[test]
    fn loads_partial_config() {
        let options: Options = serde_json::from_str(r#"{"pretty": true}"#).unwrap();
        assert_eq!(options, Options::default().with_pretty(true));

        let options: Options =
            serde_json::from_str(r#"{"weakly_typed": false, "case_insensitive": false}"#)
                .unwrap();
        assert_eq!(options, Options::strict());
    }
}
