use crate::error::MediaTypeParseError;
use crate::version::Version;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Charset assumed when a media type does not name one.
pub const DEFAULT_CHARSET: &str = "UTF-8";

static MEDIA_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^(?P<category>\*|text|application|image|message|audio|model|multipart|video)
        /
        (?:(?P<space>vnd|prs|x)(?P<sep>[.-]))?
        (?P<subtype>[a-z0-9*][a-z0-9_.*-]*?)
        (?:\.v(?P<version>[0-9]+(?:\.[0-9]+){0,2}))?
        (?:\+(?P<alt>[a-z0-9_.-]+))?
        (?:\s*;(?P<params>.*))?$",
    )
    .expect("media type regex should be valid")
});

/// An immutable, parsed MIME-type expression.
///
/// Category, vendor space, subtype and alternative subtype are stored lowercase.
/// The charset is stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    category: String,
    space: Option<(String, char)>,
    subtype: String,
    version: Option<String>,
    alt: Option<String>,
    charset: String,
}

impl MediaType {
    /// Parse a media type expression.
    ///
    /// # Errors
    ///
    /// Returns [`MediaTypeParseError`] when the category or subtype is missing, the
    /// category is not a known top-level type, or the expression has trailing garbage.
    pub fn parse(input: &str) -> Result<Self, MediaTypeParseError> {
        let trimmed = input.trim();
        let fail = |reason| MediaTypeParseError {
            input: input.to_string(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(fail("empty media type"));
        }
        let Some((category, rest)) = trimmed.split_once('/') else {
            return Err(fail("missing '/' between category and subtype"));
        };
        if category.trim().is_empty() {
            return Err(fail("missing category"));
        }
        if rest.trim().is_empty() || rest.trim_start().starts_with(';') {
            return Err(fail("missing subtype"));
        }

        let caps = MEDIA_TYPE_RE
            .captures(trimmed)
            .ok_or_else(|| fail("does not match category/subtype grammar"))?;

        let lower = |name: &str| caps.name(name).map(|m| m.as_str().to_ascii_lowercase());

        let charset = caps
            .name("params")
            .and_then(|p| charset_param(p.as_str()))
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string());

        let space = match (lower("space"), caps.name("sep")) {
            (Some(space), Some(sep)) => sep.as_str().chars().next().map(|c| (space, c)),
            _ => None,
        };

        Ok(MediaType {
            category: lower("category").unwrap_or_default(),
            space,
            subtype: lower("subtype").unwrap_or_default(),
            version: caps.name("version").map(|m| m.as_str().to_string()),
            alt: lower("alt"),
            charset,
        })
    }

    /// `*/*`
    #[must_use]
    pub fn wildcard() -> Self {
        Self::simple("*", "*")
    }

    /// `application/json`
    #[must_use]
    pub fn json() -> Self {
        Self::simple("application", "json")
    }

    /// `text/plain`
    #[must_use]
    pub fn text() -> Self {
        Self::simple("text", "plain")
    }

    fn simple(category: &str, subtype: &str) -> Self {
        MediaType {
            category: category.to_string(),
            space: None,
            subtype: subtype.to_string(),
            version: None,
            alt: None,
            charset: DEFAULT_CHARSET.to_string(),
        }
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Vendor tree (`vnd`, `prs`, `x`) if present.
    #[must_use]
    pub fn space(&self) -> Option<&str> {
        self.space.as_ref().map(|(s, _)| s.as_str())
    }

    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    #[must_use]
    pub fn alt_subtype(&self) -> Option<&str> {
        self.alt.as_deref()
    }

    #[must_use]
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Raw embedded version expression (`1.2` in `application/vnd.movie.v1.2+json`).
    #[must_use]
    pub fn version_expr(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Embedded version, parsed.
    #[must_use]
    pub fn version(&self) -> Option<Version> {
        self.version.as_deref().and_then(|v| Version::parse(v).ok())
    }

    /// Same media type with a different charset.
    #[must_use]
    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = charset.to_ascii_uppercase();
        self
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.subtype == "*"
    }

    /// Pairwise compatibility rule.
    #[must_use]
    pub fn is_compatible(&self, other: &MediaType) -> bool {
        if self.subtype == "*" || other.subtype == "*" {
            return true;
        }
        if self.subtype.eq_ignore_ascii_case(&other.subtype) {
            return true;
        }
        let alt_matches = |alt: &Option<String>, subtype: &str| {
            alt.as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(subtype))
        };
        alt_matches(&self.alt, &other.subtype) || alt_matches(&other.alt, &self.subtype)
    }

    /// True if `others` is empty or any element is compatible with `self`.
    #[must_use]
    pub fn is_compatible_to<'a, I>(&self, others: I) -> bool
    where
        I: IntoIterator<Item = &'a MediaType>,
    {
        let mut others = others.into_iter().peekable();
        if others.peek().is_none() {
            return true;
        }
        others.any(|o| self.is_compatible(o))
    }

    /// Parse a comma-separated `Accept` header into media types, in header order.
    ///
    /// Entries that fail to parse are skipped.
    #[must_use]
    pub fn parse_accept(header: &str) -> Vec<MediaType> {
        header
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| MediaType::parse(s).ok())
            .collect()
    }
}

fn charset_param(params: &str) -> Option<String> {
    params.split(';').find_map(|p| {
        let (key, value) = p.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then(|| value.to_ascii_uppercase())
        } else {
            None
        }
    })
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/", self.category)?;
        if let Some((space, sep)) = &self.space {
            write!(f, "{space}{sep}")?;
        }
        f.write_str(&self.subtype)?;
        if let Some(version) = &self.version {
            write!(f, ".v{version}")?;
        }
        if let Some(alt) = &self.alt {
            write!(f, "+{alt}")?;
        }
        write!(f, "; charset={}", self.charset)
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::parse(s)
    }
}

impl Serialize for MediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MediaType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MediaType::parse(&s).map_err(serde::de::Error::custom)
    }
}
