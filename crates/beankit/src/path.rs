//! Property path representation for navigating bean graphs.
//!
//! A path is a non-empty sequence of segments separated by `.`. Each segment
//! names a property and may add one element access:
//!
//! ```text
//! segment := identifier ( '[' integer ']' | '(' key ')' )?
//! path    := segment ( '.' segment )*
//! ```
//!
//! `customer.orders[0].tags(color)` reads `customer`, then its `orders`
//! list, element 0 of that list, then the `tags` map of that element and
//! finally the entry under `color`.

use crate::error::PropertyAccessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single step in a property path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Seg {
    /// Plain property access: `name`
    Property(String),
    /// List element of a property: `name[index]`
    Indexed(String, usize),
    /// Map entry of a property: `name(key)`
    Keyed(String, String),
}

impl Seg {
    /// Create a property segment.
    #[inline]
    pub fn property(name: impl Into<String>) -> Self {
        Seg::Property(name.into())
    }

    /// Create an indexed segment.
    #[inline]
    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Seg::Indexed(name.into(), index)
    }

    /// Create a keyed segment.
    #[inline]
    pub fn keyed(name: impl Into<String>, key: impl Into<String>) -> Self {
        Seg::Keyed(name.into(), key.into())
    }

    /// The property this segment reads.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Seg::Property(name) | Seg::Indexed(name, _) | Seg::Keyed(name, _) => name,
        }
    }

    /// Returns true if the segment is a plain property access.
    #[inline]
    pub fn is_property(&self) -> bool {
        matches!(self, Seg::Property(_))
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Property(name) => write!(f, "{}", name),
            Seg::Indexed(name, index) => write!(f, "{}[{}]", name, index),
            Seg::Keyed(name, key) => write!(f, "{}({})", name, key),
        }
    }
}

/// A complete property path.
///
/// # Examples
///
/// ```
/// use beankit::PropertyPath;
///
/// let parsed: PropertyPath = "orders[0].lines(sku)".parse().unwrap();
/// let built = PropertyPath::root().index("orders", 0).key("lines", "sku");
/// assert_eq!(parsed, built);
/// assert_eq!(parsed.to_string(), "orders[0].lines(sku)");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyPath(Vec<Seg>);

impl PropertyPath {
    /// Create an empty path. Only useful as a builder start.
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from segments.
    #[inline]
    pub fn from_segments(segments: Vec<Seg>) -> Self {
        Self(segments)
    }

    /// Parse a path expression.
    pub fn parse(input: &str) -> Result<Self, PropertyAccessError> {
        Parser::new(input).parse()
    }

    /// Append a property segment (builder pattern).
    #[inline]
    pub fn prop(mut self, name: impl Into<String>) -> Self {
        self.0.push(Seg::Property(name.into()));
        self
    }

    /// Append an indexed segment (builder pattern).
    #[inline]
    pub fn index(mut self, name: impl Into<String>, index: usize) -> Self {
        self.0.push(Seg::Indexed(name.into(), index));
        self
    }

    /// Append a keyed segment (builder pattern).
    #[inline]
    pub fn key(mut self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.0.push(Seg::Keyed(name.into(), key.into()));
        self
    }

    /// Push a segment onto the path.
    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// Check if this path has no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the first segment.
    #[inline]
    pub fn first(&self) -> Option<&Seg> {
        self.0.first()
    }

    /// Get the terminal segment.
    #[inline]
    pub fn last(&self) -> Option<&Seg> {
        self.0.last()
    }

    /// The path without its terminal segment.
    #[inline]
    pub fn parent(&self) -> Option<PropertyPath> {
        match self.0.split_last() {
            Some((_, rest)) => Some(PropertyPath(rest.to_vec())),
            None => None,
        }
    }

    /// Returns true for a single plain property segment.
    #[inline]
    pub fn is_simple(&self) -> bool {
        self.0.len() == 1 && self.0[0].is_property()
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = PropertyAccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PropertyPath {
    type Error = PropertyAccessError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PropertyPath> for String {
    fn from(path: PropertyPath) -> Self {
        path.to_string()
    }
}

impl FromIterator<Seg> for PropertyPath {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        PropertyPath(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PropertyPath {
    type Item = &'a Seg;
    type IntoIter = std::slice::Iter<'a, Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for PropertyPath {
    type Output = Seg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn fail(&self, reason: impl Into<String>) -> PropertyAccessError {
        PropertyAccessError::malformed(self.input, reason)
    }

    fn parse(mut self) -> Result<PropertyPath, PropertyAccessError> {
        if self.input.trim().is_empty() {
            return Err(self.fail("empty path"));
        }

        let mut segments = Vec::new();
        loop {
            segments.push(self.segment()?);
            match self.chars.next() {
                None => break,
                Some((_, '.')) => continue,
                Some((pos, c)) => {
                    return Err(self.fail(format!("unexpected `{}` at {}", c, pos)));
                }
            }
        }
        Ok(PropertyPath(segments))
    }

    fn segment(&mut self) -> Result<Seg, PropertyAccessError> {
        let name = self.identifier()?;
        match self.chars.peek() {
            Some((_, '[')) => {
                self.chars.next();
                let index = self.index()?;
                Ok(Seg::Indexed(name, index))
            }
            Some((_, '(')) => {
                self.chars.next();
                let key = self.key()?;
                Ok(Seg::Keyed(name, key))
            }
            _ => Ok(Seg::Property(name)),
        }
    }

    fn identifier(&mut self) -> Result<String, PropertyAccessError> {
        let mut name = String::new();
        while let Some(&(pos, c)) = self.chars.peek() {
            let valid = if name.is_empty() {
                c.is_ascii_alphabetic() || c == '_'
            } else {
                c.is_ascii_alphanumeric() || c == '_'
            };
            if !valid {
                if name.is_empty() {
                    return Err(self.fail(format!("expected property name at {}", pos)));
                }
                break;
            }
            name.push(c);
            self.chars.next();
        }
        if name.is_empty() {
            return Err(self.fail("expected property name at end of path"));
        }
        Ok(name)
    }

    fn index(&mut self) -> Result<usize, PropertyAccessError> {
        let mut digits = String::new();
        loop {
            match self.chars.next() {
                Some((_, ']')) => break,
                Some((_, c)) if c.is_ascii_digit() => digits.push(c),
                Some((pos, c)) => {
                    return Err(self.fail(format!("invalid index character `{}` at {}", c, pos)));
                }
                None => return Err(self.fail("unterminated index, expected `]`")),
            }
        }
        if digits.is_empty() {
            return Err(self.fail("empty index"));
        }
        digits
            .parse()
            .map_err(|_| self.fail(format!("index `{}` is too large", digits)))
    }

    fn key(&mut self) -> Result<String, PropertyAccessError> {
        let mut key = String::new();
        loop {
            match self.chars.next() {
                Some((_, ')')) => break,
                Some((_, c)) => key.push(c),
                None => return Err(self.fail("unterminated key, expected `)`")),
            }
        }
        if key.is_empty() {
            return Err(self.fail("empty key"));
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let path = PropertyPath::parse("name").unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0], Seg::property("name"));
        assert!(path.is_simple());
    }

    #[test]
    fn test_parse_mixed() {
        let path = PropertyPath::parse("a.b[0].c(k)").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], Seg::property("a"));
        assert_eq!(path[1], Seg::indexed("b", 0));
        assert_eq!(path[2], Seg::keyed("c", "k"));
        assert!(!path.is_simple());
    }

    #[test]
    fn test_keys_may_contain_dots_and_brackets() {
        let path = PropertyPath::parse("headers(x.trace[id])").unwrap();
        assert_eq!(path[0], Seg::keyed("headers", "x.trace[id]"));
    }

    #[test]
    fn test_display_matches_grammar() {
        let path = PropertyPath::root()
            .prop("customer")
            .index("orders", 12)
            .key("attrs", "color");
        assert_eq!(path.to_string(), "customer.orders[12].attrs(color)");
        assert_eq!(PropertyPath::parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn test_parent() {
        let path = PropertyPath::parse("a.b.c").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "a.b");
        assert!(PropertyPath::root().parent().is_none());
    }

    #[test]
    fn test_malformed_paths() {
        for bad in [
            "", " ", "a.", ".a", "a..b", "a[", "a[]", "a[x]", "a[-1]", "a()", "a(k", "1a",
            "a b", "a[0]b", "a[0][1]",
        ] {
            let err = PropertyPath::parse(bad).unwrap_err();
            assert!(
                matches!(err, PropertyAccessError::MalformedPath { .. }),
                "expected malformed path for {:?}, got {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_path_serde() {
        let path = PropertyPath::parse("items[2].name").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"items[2].name\"");
        let parsed: PropertyPath = serde_json::from_str(&json).unwrap();
        assert_eq!(path, parsed);
        assert!(serde_json::from_str::<PropertyPath>("\"items[\"").is_err());
    }
}
