//! Dot-separated field paths with backslash escaping.

use std::fmt;
use std::str::FromStr;

/// A parsed field path.
///
/// Segments are separated by unescaped `.`; a backslash escapes the next
/// character, so `\.` is a literal dot inside a key and `\\` a literal
/// backslash. A trailing lone backslash is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a path string into raw key segments.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = path.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                },
                '.' => segments.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        segments.push(current);

        Self { segments }
    }

    /// Builds a path from raw (unescaped) keys.
    ///
    /// Returns `None` when no keys are given.
    pub fn from_keys<I, S>(keys: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = keys.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// Escapes a raw key so it addresses a single segment.
    #[must_use]
    pub fn escape_key(key: &str) -> String {
        let mut escaped = String::with_capacity(key.len());
        for c in key.chars() {
            if c == '\\' || c == '.' {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    /// Returns the raw key segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Splits the path into its parent segments and the leaf key.
    #[must_use]
    pub fn split_leaf(&self) -> (&[String], &str) {
        match self.segments.split_last() {
            Some((leaf, parents)) => (parents, leaf.as_str()),
            None => (&[], ""),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&Self::escape_key(segment))?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_path() {
        let path = FieldPath::parse("a.b.c");
        assert_eq!(path.segments(), &["a", "b", "c"]);
    }

    #[test]
    fn test_parse_single_key() {
        let path = FieldPath::parse("message");
        assert_eq!(path.segments(), &["message"]);
        assert_eq!(path.split_leaf(), (&[][..], "message"));
    }

    #[test]
    fn test_parse_escaped_dot() {
        let path = FieldPath::parse(r"host\.name.value");
        assert_eq!(path.segments(), &["host.name", "value"]);
    }

    #[test]
    fn test_parse_escaped_backslash() {
        let path = FieldPath::parse(r"a\\.b");
        assert_eq!(path.segments(), &[r"a\", "b"]);
    }

    #[test]
    fn test_trailing_backslash_is_literal() {
        let path = FieldPath::parse(r"a\");
        assert_eq!(path.segments(), &[r"a\"]);
    }

    #[test]
    fn test_empty_segments_preserved() {
        let path = FieldPath::parse("a..b");
        assert_eq!(path.segments(), &["a", "", "b"]);
    }

    #[test]
    fn test_escape_key_round_trips_through_display() {
        let key = r"weird.key\with";
        let escaped = FieldPath::escape_key(key);
        assert_eq!(escaped, r"weird\.key\\with");
        assert_eq!(FieldPath::parse(&escaped).segments(), &[key]);
    }

    #[test]
    fn test_display_escapes_segments() {
        let path = FieldPath::from_keys(["a.b", "c"]).unwrap();
        assert_eq!(path.to_string(), r"a\.b.c");
    }

    #[test]
    fn test_from_keys_empty() {
        assert!(FieldPath::from_keys(Vec::<String>::new()).is_none());
    }
}
