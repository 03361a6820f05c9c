//! URI templates with `{name}` / `{name:regex}` groups.

use crate::error::MetadataError;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Sub-pattern used for groups that do not spell one out.
pub const DEFAULT_GROUP_PATTERN: &str = "[^/]+";

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered path parameters: `(name, value)` in template order.
///
/// Names are `Arc<str>` shared with the compiled template; values are per-call.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Group { name: Arc<str>, pattern: String },
}

/// A compiled URI template.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
    names: Vec<Arc<str>>,
    regex: Regex,
}

impl PathTemplate {
    /// Compile a template such as `/movies/{id:[0-9]+}/cast/{name}`.
    ///
    /// Each group becomes a capture using its sub-pattern (default `[^/]+`); literal
    /// text is regex-escaped. The compiled matcher requires a full-string match.
    ///
    /// # Errors
    ///
    /// [`MetadataError::Template`] for unbalanced braces, empty or invalid group
    /// names, duplicate group names, or a sub-pattern that is not a valid regex.
    pub fn compile(template: &str) -> Result<Self, MetadataError> {
        let fail = |reason: String| MetadataError::Template {
            template: template.to_string(),
            reason,
        };

        let segments = split_segments(template).map_err(|r| fail(r.to_string()))?;

        let mut seen = HashSet::new();
        let mut names = Vec::new();
        let mut pattern = String::with_capacity(template.len() + 8);
        pattern.push('^');
        for segment in &segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Group { name, pattern: sub } => {
                    if !seen.insert(Arc::clone(name)) {
                        return Err(fail(format!("duplicate group name '{name}'")));
                    }
                    pattern.push_str(&format!("(?P<p{}>{})", names.len(), sub));
                    names.push(Arc::clone(name));
                }
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| fail(e.to_string()))?;

        Ok(Self {
            source: template.to_string(),
            segments,
            names,
            regex,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Group names in template order.
    #[must_use]
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    /// Number of literal characters; used to rank more specific templates first.
    #[must_use]
    pub fn literal_len(&self) -> usize {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.len(),
                Segment::Group { .. } => 0,
            })
            .sum()
    }

    /// Match a path (base prefix already removed). Full match required.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (idx, name) in self.names.iter().enumerate() {
            let value = caps.name(&format!("p{idx}"))?.as_str().to_string();
            params.push((Arc::clone(name), value));
        }
        Some(params)
    }

    /// Strip `base` from `uri`, then [`match_path`](Self::match_path).
    #[must_use]
    pub fn match_uri(&self, base: &str, uri: &str) -> Option<ParamVec> {
        let path = strip_base(base, uri)?;
        self.match_path(path)
    }

    /// Substitute group placeholders positionally.
    ///
    /// Values are inserted verbatim (no URL encoding). Returns `None` if the number of
    /// values differs from the number of groups.
    #[must_use]
    pub fn render<I, S>(&self, values: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<S> = values.into_iter().collect();
        if values.len() != self.names.len() {
            return None;
        }
        let mut values = values.iter();
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Group { .. } => out.push_str(values.next()?.as_ref()),
            }
        }
        Some(out)
    }

    /// Substitute group placeholders by name using `lookup`.
    ///
    /// Returns `None` when `lookup` has no value for some group.
    pub fn render_with<'a, F>(&self, mut lookup: F) -> Option<String>
    where
        F: FnMut(&str) -> Option<&'a str>,
    {
        let values = self
            .names
            .iter()
            .map(|n| lookup(n))
            .collect::<Option<Vec<_>>>()?;
        self.render(values)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Remove the application base path (and any query string) from `uri`.
pub(crate) fn strip_base<'u>(base: &str, uri: &'u str) -> Option<&'u str> {
    let uri = uri.split_once('?').map_or(uri, |(p, _)| p);
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return Some(uri);
    }
    let rest = uri.strip_prefix(base)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

fn split_segments(template: &str) -> Result<Vec<Segment>, &'static str> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let mut depth = 1usize;
                let mut body = String::new();
                for inner in chars.by_ref() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    body.push(inner);
                }
                if depth != 0 {
                    return Err("unterminated '{' group");
                }
                segments.push(parse_group(&body)?);
            }
            '}' => return Err("unbalanced '}'"),
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn parse_group(body: &str) -> Result<Segment, &'static str> {
    let (name, pattern) = match body.split_once(':') {
        Some((name, pattern)) => (name.trim(), pattern.trim()),
        None => (body.trim(), DEFAULT_GROUP_PATTERN),
    };
    if name.is_empty() {
        return Err("group without a name");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err("group names may only contain letters, digits, '_', '-' and '.'");
    }
    if pattern.is_empty() {
        return Err("group with an empty pattern");
    }
    Ok(Segment::Group {
        name: Arc::from(name),
        pattern: pattern.to_string(),
    })
}
