//! Full-match name patterns shared by executor bindings, event selectors and filters.

use crate::error::MetadataError;
use regex::Regex;
use std::fmt;

/// Pattern that matches everything.
pub const MATCH_ANY: &str = ".*";

/// A regular expression that must match the whole input.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    /// Compile `pattern`, anchoring it at both ends.
    ///
    /// # Errors
    ///
    /// [`MetadataError::Pattern`] naming `location` if `pattern` is not a valid regex.
    pub fn compile(location: &str, pattern: &str) -> Result<Self, MetadataError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            MetadataError::Pattern {
                location: location.to_string(),
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    #[must_use]
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// True for the match-anything pattern.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.source == MATCH_ANY
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
