//! Path segments locating a value inside the input being parsed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a path: an object field name or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{i}"),
            PathSegment::Key(k) => write!(f, "{k}"),
        }
    }
}

/// Render a path as a JSON Pointer (`/items/2/name`). The empty path
/// renders as the empty string.
pub fn to_pointer(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        out.push('/');
        match segment {
            PathSegment::Index(i) => out.push_str(&i.to_string()),
            PathSegment::Key(k) => out.push_str(&k.replace('~', "~0").replace('/', "~1")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_escapes_reserved_characters() {
        let path = vec![PathSegment::from("a/b"), PathSegment::from(2), PathSegment::from("~x")];
        assert_eq!(to_pointer(&path), "/a~1b/2/~0x");
    }

    #[test]
    fn test_empty_path_is_root() {
        assert_eq!(to_pointer(&[]), "");
    }
}
