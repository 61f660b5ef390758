//! Slash-delimited path handling.
//!
//! Remote resource names and virtual filesystem paths share the same shape:
//! "/"-delimited segments with no meaning attached to repeated or trailing
//! separators. An empty segment list names the root directory.

use crate::error::{Error, Result};

/// Split a path into its non-empty segments.
///
/// "/", "" and "///" all yield an empty list (the root).
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Split a path into parent segments and a terminal name.
///
/// Fails with `EmptyPath` when the path names the root, which has no parent.
pub fn split_terminal(path: &str) -> Result<(Vec<&str>, &str)> {
    let mut parts = segments(path);
    match parts.pop() {
        Some(name) => Ok((parts, name)),
        None => Err(Error::empty_path()),
    }
}

/// Return the last segment of a path, or an empty string for the root.
pub fn basename(path: &str) -> &str {
    segments(path).last().copied().unwrap_or("")
}

/// Join a prefix path and a relative suffix with a single separator.
pub fn join(prefix: &str, rest: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let rest = rest.trim_start_matches('/');
    if prefix.is_empty() {
        format!("/{}", rest)
    } else if rest.is_empty() {
        prefix.to_string()
    } else {
        format!("{}/{}", prefix, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments() {
        assert_eq!(segments("/a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(segments("a/b"), vec!["a", "b"]);
        assert_eq!(segments("//a//b/"), vec!["a", "b"]);
        assert!(segments("/").is_empty());
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_split_terminal() {
        let (parents, name) = split_terminal("/dir/sub/file.js").unwrap();
        assert_eq!(parents, vec!["dir", "sub"]);
        assert_eq!(name, "file.js");

        let (parents, name) = split_terminal("top.css").unwrap();
        assert!(parents.is_empty());
        assert_eq!(name, "top.css");

        assert_eq!(split_terminal("/"), Err(Error::empty_path()));
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/a/b", "c/d"), "/a/b/c/d");
        assert_eq!(join("/", "x"), "/x");
        assert_eq!(join("/a", ""), "/a");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("/a/b/c.js"), "c.js");
        assert_eq!(basename("top"), "top");
        assert_eq!(basename("/"), "");
    }
}
