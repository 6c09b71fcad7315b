//! Scheme-qualified resource addresses.
//!
//! A [`Resource`] names something a file-access provider can operate on:
//! a scheme (`file`, `untitled`, `memfs`, ...) plus an absolute,
//! `/`-separated path. Containment checks work on path segments, so
//! `/a/bc` is never considered to live under `/a/b`.

use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

/// Scheme used for bare absolute paths.
pub const FILE_SCHEME: &str = "file";

/// A scheme-qualified, normalized resource path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Resource {
    scheme: CompactString,
    path: String,
}

impl Resource {
    /// Create a resource from a scheme and a path.
    ///
    /// The scheme is lowercased. The path is made absolute and lexically
    /// normalized: empty and `.` segments are dropped and `..` pops its parent.
    pub fn new(scheme: impl AsRef<str>, path: impl AsRef<str>) -> Self {
        Self {
            scheme: CompactString::from(scheme.as_ref().to_ascii_lowercase()),
            path: normalize_path(path.as_ref()),
        }
    }

    /// Create a `file` scheme resource.
    pub fn file(path: impl AsRef<str>) -> Self {
        Self::new(FILE_SCHEME, path)
    }

    /// The resource scheme (always lowercase).
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The normalized absolute path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Iterate over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// Append a relative path below this resource.
    pub fn join(&self, relative: impl AsRef<str>) -> Self {
        Self {
            scheme: self.scheme.clone(),
            path: normalize_path(&format!("{}/{}", self.path, relative.as_ref())),
        }
    }

    /// Check path equality within the same scheme.
    pub fn is_equal(&self, other: &Resource, ignore_case: bool) -> bool {
        self.scheme == other.scheme && segment_eq(&self.path, &other.path, ignore_case)
    }

    /// Check if this resource equals `ancestor` or lives somewhere below it.
    pub fn is_equal_or_descendant_of(&self, ancestor: &Resource, ignore_case: bool) -> bool {
        if self.scheme != ancestor.scheme {
            return false;
        }

        let mut own = self.segments();
        for wanted in ancestor.segments() {
            match own.next() {
                Some(segment) if segment_eq(segment, wanted, ignore_case) => {}
                _ => return false,
            }
        }
        true
    }
}

fn segment_eq(a: &str, b: &str, ignore_case: bool) -> bool {
    if ignore_case {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}

fn normalize_path(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl FromStr for Resource {
    type Err = ResourceError;

    /// Parse `scheme://path`, an opaque `scheme:name` (as used by flat
    /// schemes such as `untitled:Untitled-1`) or a bare absolute path
    /// (treated as `file`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((scheme, path)) = s.split_once("://") {
            if !is_valid_scheme(scheme) {
                return Err(ResourceError::InvalidScheme {
                    input: s.to_string(),
                });
            }
            return Ok(Self::new(scheme, path));
        }

        if let Some((scheme, name)) = s.split_once(':') {
            if is_valid_scheme(scheme) && !name.is_empty() {
                return Ok(Self::new(scheme, name));
            }
        }

        if s.starts_with('/') {
            Ok(Self::file(s))
        } else {
            Err(ResourceError::NotAbsolute {
                input: s.to_string(),
            })
        }
    }
}

impl TryFrom<String> for Resource {
    type Error = ResourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resource> for String {
    fn from(resource: Resource) -> Self {
        resource.to_string()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.path)
    }
}
