//! Expression paths: dotted key sequences into the data graph.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::Error;

/// A parsed `a.b.c` expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpressionPath {
    source: String,
    segments: SmallVec<[String; 2]>,
}

impl ExpressionPath {
    /// The first segment, resolved against the view's top-level keys.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Everything but the last segment, and the last segment.
    pub fn split_last(&self) -> (&[String], &str) {
        let (last, parent) = self
            .segments
            .split_last()
            .map(|(last, parent)| (last.as_str(), parent))
            .unwrap_or(("", &[]));
        (parent, last)
    }
}

impl FromStr for ExpressionPath {
    type Err = Error;

    /// Surrounding whitespace is ignored; empty segments are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let source = s.trim();
        let segments: SmallVec<[String; 2]> = source.split('.').map(|seg| seg.trim().to_owned()).collect();

        if source.is_empty() || segments.iter().any(String::is_empty) {
            return Err(Error::InvalidExpression(s.to_owned()));
        }

        Ok(Self {
            source: segments.join("."),
            segments,
        })
    }
}

impl fmt::Display for ExpressionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_paths() {
        let path: ExpressionPath = " user . name ".parse().unwrap();
        assert_eq!(path.segments(), &["user", "name"]);
        assert_eq!(path.root(), "user");
        assert_eq!(path.as_str(), "user.name");
        assert_eq!(path.split_last(), (&["user".to_owned()][..], "name"));
    }

    #[test]
    fn rejects_empty_segments() {
        for bad in ["", "   ", "a..b", ".a", "a."] {
            assert!(
                matches!(bad.parse::<ExpressionPath>(), Err(Error::InvalidExpression(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
