use crate::error::VersionParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A concrete three-part version. Omitted components are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub release: u32,
}

impl Version {
    #[must_use]
    pub const fn new(major: u32, minor: u32, release: u32) -> Self {
        Self {
            major,
            minor,
            release,
        }
    }

    /// Parse `major[.minor[.release]]`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionParseError`] on empty input, non-numeric segments, more
    /// than three segments, or trailing garbage.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        parse_with_precision(input).map(|(v, _)| v)
    }
}

fn parse_with_precision(input: &str) -> Result<(Version, u8), VersionParseError> {
    let fail = |reason| VersionParseError {
        input: input.to_string(),
        reason,
    };
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(fail("empty version"));
    }

    let mut parts = [0u32; 3];
    let mut precision = 0u8;
    for (idx, segment) in trimmed.split('.').enumerate() {
        if idx >= parts.len() {
            return Err(fail("more than three components"));
        }
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(fail("components must be non-negative integers"));
        }
        parts[idx] = segment
            .parse()
            .map_err(|_| fail("component out of range"))?;
        precision += 1;
    }

    Ok((Version::new(parts[0], parts[1], parts[2]), precision))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.release)
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// One end of a [`VersionRange`].
///
/// `precision` is the number of components the expression spelled out; it decides
/// how an inclusive upper bound treats the components that were left off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Bound {
    version: Version,
    precision: u8,
    inclusive: bool,
}

impl Bound {
    fn admits_from_below(&self, v: &Version) -> bool {
        if self.inclusive {
            *v >= self.version
        } else {
            *v > self.version
        }
    }

    fn admits_from_above(&self, v: &Version) -> bool {
        if self.inclusive {
            *v <= self.ceiling()
        } else {
            *v < self.version
        }
    }

    fn ceiling(&self) -> Version {
        let open = |idx: u8, value: u32| if self.precision > idx { value } else { u32::MAX };
        Version::new(
            self.version.major,
            open(1, self.version.minor),
            open(2, self.version.release),
        )
    }

    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = &self.version;
        match self.precision {
            1 => write!(f, "{}", v.major),
            2 => write!(f, "{}.{}", v.major, v.minor),
            _ => write!(f, "{v}"),
        }
    }
}

/// An interval over [`Version`]s. `None` bounds are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl VersionRange {
    /// Matches every version.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// `(,version]`: anything up to and including `version`, honouring its precision.
    ///
    /// # Errors
    ///
    /// Returns [`VersionParseError`] if `version` is not a valid version.
    pub fn up_to(version: &str) -> Result<Self, VersionParseError> {
        let (v, precision) = parse_with_precision(version)?;
        Ok(Self {
            lower: None,
            upper: Some(Bound {
                version: v,
                precision,
                inclusive: true,
            }),
        })
    }

    /// Parse a range expression.
    ///
    /// # Errors
    ///
    /// Returns [`VersionParseError`] for empty input, more than one separator, or a
    /// bound that is not a valid version.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let fail = |reason| VersionParseError {
            input: input.to_string(),
            reason,
        };
        let s = input.trim();
        if s.is_empty() {
            return Err(fail("empty range"));
        }

        let (lower_inclusive, rest) = match s.as_bytes()[0] {
            b'[' => (true, &s[1..]),
            b'(' | b']' => (false, &s[1..]),
            _ => (true, s),
        };
        let (body, upper_inclusive) = match rest.as_bytes().last() {
            Some(b']') => (&rest[..rest.len() - 1], true),
            Some(b')') | Some(b'[') => (&rest[..rest.len() - 1], false),
            _ => (rest, true),
        };

        let bound = |text: &str, inclusive: bool| -> Result<Option<Bound>, VersionParseError> {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            let (version, precision) = parse_with_precision(text).map_err(|e| VersionParseError {
                input: input.to_string(),
                reason: e.reason,
            })?;
            Ok(Some(Bound {
                version,
                precision,
                inclusive,
            }))
        };

        match body.split_once(',') {
            Some((lo, hi)) => {
                if hi.contains(',') {
                    return Err(fail("more than one ',' separator"));
                }
                Ok(Self {
                    lower: bound(lo, lower_inclusive)?,
                    upper: bound(hi, upper_inclusive)?,
                })
            }
            None => {
                let exact = bound(body, lower_inclusive)?.ok_or_else(|| fail("missing version"))?;
                Ok(Self {
                    lower: Some(exact),
                    upper: Some(Bound {
                        inclusive: upper_inclusive,
                        ..exact
                    }),
                })
            }
        }
    }

    /// True iff `version` lies within both bounds.
    #[must_use]
    pub fn includes(&self, version: &Version) -> bool {
        self.lower.is_none_or(|b| b.admits_from_below(version))
            && self.upper.is_none_or(|b| b.admits_from_above(version))
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Some(b) => {
                f.write_str(if b.inclusive { "[" } else { "(" })?;
                b.render(f)?;
            }
            None => f.write_str("(")?,
        }
        f.write_str(",")?;
        match &self.upper {
            Some(b) => {
                b.render(f)?;
                f.write_str(if b.inclusive { "]" } else { ")" })
            }
            None => f.write_str(")"),
        }
    }
}

impl FromStr for VersionRange {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

/// Pick the value bound to the greatest version inside `range`.
///
/// Works on anything that yields `(&Version, T)` pairs, such as `&BTreeMap<Version, T>`.
/// An empty candidate set yields `None`.
pub fn resolve_best<'a, T, I>(candidates: I, range: &VersionRange) -> Option<T>
where
    I: IntoIterator<Item = (&'a Version, T)>,
{
    candidates
        .into_iter()
        .filter(|(v, _)| range.includes(v))
        .max_by(|a, b| a.0.cmp(b.0))
        .map(|(_, value)| value)
}

/// [`resolve_best`] with the range given as an expression.
///
/// Empty candidate sets short-circuit to `Ok(None)` without parsing `expr`.
///
/// # Errors
///
/// Returns [`VersionParseError`] if `expr` is malformed and there is at least one candidate.
pub fn resolve_best_expr<'a, T, I>(candidates: I, expr: &str) -> Result<Option<T>, VersionParseError>
where
    I: IntoIterator<Item = (&'a Version, T)>,
{
    let mut candidates = candidates.into_iter().peekable();
    if candidates.peek().is_none() {
        return Ok(None);
    }
    let range = VersionRange::parse(expr)?;
    Ok(resolve_best(candidates, &range))
}
