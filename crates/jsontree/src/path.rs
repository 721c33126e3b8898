//! Path expressions addressing locations inside a document.
//!
//! A path is a sequence of segments. In string form segments are separated
//! by `/`:
//!
//! - `*` matches every key of an object or every index of an array
//! - `#` is the append position of an array during mutation, and its length
//!   during a query
//! - anything else is an object key, or a base-10 index when it meets an array
//!
//! Concrete paths handed to predicates and visitors contain only `Key`
//! segments. Wildcards are expanded to the keys or indices they matched, and
//! a mutating `#` to the index it appended at. A query's trailing `#` stays
//! as is, since it names the length rather than an element.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single path segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// `*`
    Wildcard,
    /// `#`
    Append,
    /// Object key or array index, kept verbatim.
    Key(String),
}

impl Segment {
    /// Classify a raw segment string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "*" => Segment::Wildcard,
            "#" => Segment::Append,
            _ => Segment::Key(raw.to_owned()),
        }
    }

    pub fn key(k: impl Into<String>) -> Self {
        Segment::Key(k.into())
    }

    /// Concrete segment for an array position.
    pub fn index(i: usize) -> Self {
        Segment::Key(i.to_string())
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(k) => Some(k),
            _ => None,
        }
    }

    /// Interpret the segment as an array index. The whole segment must be
    /// base-10 digits; signs and surrounding whitespace are rejected. Digits
    /// too large for `usize` saturate, so they read as out of range rather
    /// than as a non-index.
    pub fn as_index(&self) -> Option<usize> {
        let k = self.as_key()?;
        if k.is_empty() || !k.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(k.parse().unwrap_or(usize::MAX))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Wildcard => f.write_str("*"),
            Segment::Append => f.write_str("#"),
            Segment::Key(k) => f.write_str(k),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::parse(s)
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        match s.as_str() {
            "*" => Segment::Wildcard,
            "#" => Segment::Append,
            _ => Segment::Key(s),
        }
    }
}

impl From<usize> for Segment {
    fn from(i: usize) -> Self {
        Segment::index(i)
    }
}

/// A sequence of segments. The empty path addresses the root.
///
/// ```
/// use jsontree::{Path, Segment};
///
/// let p = Path::parse("users/*/name");
/// assert_eq!(p.len(), 3);
/// assert_eq!(p[1], Segment::Wildcard);
/// assert_eq!(p.to_string(), "users/*/name");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Split a `/`-separated string. The empty string is the root; otherwise
    /// empty segments are kept as empty keys.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Self::root();
        }
        Self(s.split('/').map(Segment::parse).collect())
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, seg: impl Into<Segment>) {
        self.0.push(seg.into());
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.0.pop()
    }

    /// A new path with `seg` appended; `self` is left untouched.
    pub fn child(&self, seg: Segment) -> Path {
        let mut result = Path(Vec::with_capacity(self.0.len() + 1));
        result.0.extend(self.0.iter().cloned());
        result.0.push(seg);
        result
    }

    /// True if no segment is `*` or `#`.
    pub fn is_concrete(&self) -> bool {
        self.0.iter().all(|s| matches!(s, Segment::Key(_)))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Path::parse(&s)
    }
}

impl From<&String> for Path {
    fn from(s: &String) -> Self {
        Path::parse(s)
    }
}

impl From<&Path> for Path {
    fn from(p: &Path) -> Self {
        p.clone()
    }
}

/// Already-split segments; no further splitting on `/` happens.
impl From<Vec<&str>> for Path {
    fn from(v: Vec<&str>) -> Self {
        Path(v.into_iter().map(Segment::parse).collect())
    }
}

impl From<&[&str]> for Path {
    fn from(v: &[&str]) -> Self {
        Path(v.iter().copied().map(Segment::parse).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(v: [&str; N]) -> Self {
        Path(v.into_iter().map(Segment::parse).collect())
    }
}

impl From<Vec<Segment>> for Path {
    fn from(v: Vec<Segment>) -> Self {
        Path(v)
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl IntoIterator for Path {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Segment;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Path::parse(&s))
    }
}
