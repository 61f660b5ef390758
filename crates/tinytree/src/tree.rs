use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::node::{EntryKind, Node, NodeID, ROOT_ID};
use crate::path;

/// Hierarchical index over a flat namespace of slash-delimited names.
///
/// Nodes live in an arena addressed by stable `NodeID` indices, which avoids
/// ownership cycles between parents and children. Detached nodes stay in the
/// arena as garbage until the next `clear`; the tree is rebuilt wholesale on
/// every reload so the arena never grows without bound.
///
/// The tree holds metadata only - no file content is cached here.
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates a new tree with an empty root directory
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node::new_dir()],
        }
    }

    /// Drop every node and start over with an empty root
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::new_dir());
    }

    pub fn node(&self, id: NodeID) -> &Node {
        &self.nodes[id.as_usize()]
    }

    fn node_mut(&mut self, id: NodeID) -> &mut Node {
        &mut self.nodes[id.as_usize()]
    }

    fn add_node(&mut self, node: Node) -> NodeID {
        let id = NodeID::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Walk the path from the root, descending through directories only.
    ///
    /// Fails with `NotFound` when a segment is missing or an intermediate
    /// segment names a file (a file cannot be descended into).
    pub fn resolve(&self, path: &str) -> Result<NodeID> {
        let mut cur = ROOT_ID;
        for seg in path::segments(path) {
            let entries = self
                .node(cur)
                .as_dir()
                .ok_or_else(|| Error::not_found(path))?;
            cur = entries
                .get(seg)
                .copied()
                .ok_or_else(|| Error::not_found(path))?;
        }
        Ok(cur)
    }

    pub fn kind(&self, path: &str) -> Result<EntryKind> {
        Ok(self.node(self.resolve(path)?).kind())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    /// Remote identifier of the file at `path`; `None` for a pending local
    /// create. Fails with `NotAFile` when the path names a directory.
    pub fn identifier(&self, path: &str) -> Result<Option<String>> {
        let id = self.resolve(path)?;
        self.node(id)
            .as_file()
            .cloned()
            .ok_or_else(|| Error::not_a_file(path))
    }

    /// Commit (or clear) the remote identifier of an existing file node
    pub fn set_identifier(&mut self, path: &str, identifier: Option<String>) -> Result<()> {
        let id = self.resolve(path)?;
        match self.node_mut(id) {
            Node::File(slot) => {
                *slot = identifier;
                Ok(())
            }
            Node::Directory(_) => Err(Error::not_a_file(path)),
        }
    }

    /// Insert a file node, creating intermediate directories as needed.
    ///
    /// A name whose intermediate segment already exists as a file is
    /// malformed from the tree's point of view; the whole insert is silently
    /// skipped rather than corrupting existing entries. The terminal entry is
    /// overwritten whatever its previous kind. Returns whether the file was
    /// actually placed.
    pub fn insert(&mut self, path: &str, identifier: Option<String>) -> bool {
        let Ok((parents, name)) = path::split_terminal(path) else {
            return false;
        };
        let mut cur = ROOT_ID;
        for seg in parents {
            let existing = match self.node(cur).as_dir() {
                Some(entries) => entries.get(seg).copied(),
                None => return false,
            };
            match existing {
                Some(child) => {
                    if self.node(child).as_dir().is_none() {
                        // conflicting remote name, drop it
                        return false;
                    }
                    cur = child;
                }
                None => {
                    let child = self.add_node(Node::new_dir());
                    if let Some(entries) = self.node_mut(cur).as_dir_mut() {
                        entries.insert(seg.to_string(), child);
                    }
                    cur = child;
                }
            }
        }
        let file = self.add_node(Node::new_file(identifier));
        if let Some(entries) = self.node_mut(cur).as_dir_mut() {
            entries.insert(name.to_string(), file);
        }
        true
    }

    /// Verify that a file could be placed at `path` by `insert`.
    ///
    /// Every existing intermediate segment must name a directory; missing
    /// segments are fine, `insert` creates them. Fails with `NotADirectory`
    /// when a file occupies part of the parent chain, so callers can reject
    /// a path before committing to side effects elsewhere.
    pub fn validate_insert(&self, path: &str) -> Result<()> {
        let (parents, _name) = path::split_terminal(path)?;
        let mut cur = ROOT_ID;
        for seg in parents {
            let entries = self
                .node(cur)
                .as_dir()
                .ok_or_else(|| Error::not_a_directory(path))?;
            match entries.get(seg) {
                Some(child) => cur = *child,
                None => return Ok(()),
            }
        }
        if self.node(cur).as_dir().is_some() {
            Ok(())
        } else {
            Err(Error::not_a_directory(path))
        }
    }

    /// Create a directory chain, failing if the terminal entry already exists
    pub fn insert_dir(&mut self, path: &str) -> Result<NodeID> {
        let segs = path::segments(path);
        if segs.is_empty() {
            return Err(Error::already_exists("/"));
        }
        let mut cur = ROOT_ID;
        for (i, seg) in segs.iter().enumerate() {
            let last = i + 1 == segs.len();
            let existing = self
                .node(cur)
                .as_dir()
                .ok_or_else(|| Error::not_a_directory(path))?
                .get(*seg)
                .copied();
            match existing {
                Some(child) => {
                    if last {
                        return Err(Error::already_exists(path));
                    }
                    if self.node(child).as_dir().is_none() {
                        return Err(Error::not_a_directory(path));
                    }
                    cur = child;
                }
                None => {
                    let child = self.add_node(Node::new_dir());
                    if let Some(entries) = self.node_mut(cur).as_dir_mut() {
                        entries.insert(seg.to_string(), child);
                    }
                    cur = child;
                }
            }
        }
        Ok(cur)
    }

    /// Detach the named entry from its parent directory.
    ///
    /// The caller is responsible for sequencing this after any remote-side
    /// deletion; the tree performs no I/O.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        let (parents, name) = path::split_terminal(path)?;
        let mut cur = ROOT_ID;
        for seg in parents {
            let entries = self
                .node(cur)
                .as_dir()
                .ok_or_else(|| Error::not_found(path))?;
            cur = entries
                .get(seg)
                .copied()
                .ok_or_else(|| Error::not_found(path))?;
        }
        let entries = self
            .node_mut(cur)
            .as_dir_mut()
            .ok_or_else(|| Error::not_found(path))?;
        entries
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(path))
    }

    /// Immediate children of the directory at `path`, in name order
    pub fn list(&self, path: &str) -> Result<Vec<(String, EntryKind)>> {
        let id = self.resolve(path)?;
        let entries = self
            .node(id)
            .as_dir()
            .ok_or_else(|| Error::not_a_directory(path))?;
        Ok(entries
            .iter()
            .map(|(name, cid)| (name.clone(), self.node(*cid).kind()))
            .collect())
    }

    /// Relative paths of every descendant file under `path`, depth-first
    pub fn walk_files(&self, path: &str) -> Result<Vec<String>> {
        let id = self.resolve(path)?;
        let entries = self
            .node(id)
            .as_dir()
            .ok_or_else(|| Error::not_a_directory(path))?;
        let mut out = Vec::new();
        self.walk_into(entries, "", &mut out);
        Ok(out)
    }

    fn walk_into(&self, entries: &BTreeMap<String, NodeID>, prefix: &str, out: &mut Vec<String>) {
        for (name, cid) in entries {
            let rel = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };
            match self.node(*cid) {
                Node::Directory(children) => self.walk_into(children, &rel, out),
                Node::File(_) => out.push(rel),
            }
        }
    }

    /// Relative paths of every descendant directory under `path`, parents
    /// before children
    pub fn walk_dirs(&self, path: &str) -> Result<Vec<String>> {
        let id = self.resolve(path)?;
        let entries = self
            .node(id)
            .as_dir()
            .ok_or_else(|| Error::not_a_directory(path))?;
        let mut out = Vec::new();
        self.walk_dirs_into(entries, "", &mut out);
        Ok(out)
    }

    fn walk_dirs_into(&self, entries: &BTreeMap<String, NodeID>, prefix: &str, out: &mut Vec<String>) {
        for (name, cid) in entries {
            if let Node::Directory(children) = self.node(*cid) {
                let rel = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                };
                out.push(rel.clone());
                self.walk_dirs_into(children, &rel, out);
            }
        }
    }

    /// Number of reachable file nodes
    pub fn file_count(&self) -> usize {
        self.walk_files("/").map(|v| v.len()).unwrap_or(0)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tree{{files: {}}}", self.file_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_resolve() {
        let mut tree = Tree::new();
        tree.insert("scripts/app.js", Some("id-1".into()));
        tree.insert("scripts/lib/util.js", Some("id-2".into()));
        tree.insert("top.css", None);

        assert_eq!(tree.kind("/scripts").unwrap(), EntryKind::Directory);
        assert_eq!(tree.kind("/scripts/app.js").unwrap(), EntryKind::File);
        assert_eq!(
            tree.identifier("/scripts/lib/util.js").unwrap(),
            Some("id-2".to_string())
        );
        assert_eq!(tree.identifier("/top.css").unwrap(), None);
        assert_eq!(tree.file_count(), 3);
    }

    #[test]
    fn test_resolve_through_file_fails() {
        let mut tree = Tree::new();
        tree.insert("a.js", Some("x".into()));
        assert_eq!(
            tree.resolve("/a.js/nested"),
            Err(Error::not_found("/a.js/nested"))
        );
    }

    #[test]
    fn test_malformed_name_is_skipped() {
        let mut tree = Tree::new();
        assert!(tree.insert("conflict", Some("file-id".into())));
        // "conflict" already exists as a file, so this name cannot be placed
        assert!(!tree.insert("conflict/inner.js", Some("other".into())));

        assert_eq!(tree.kind("/conflict").unwrap(), EntryKind::File);
        assert_eq!(tree.identifier("/conflict").unwrap(), Some("file-id".into()));
        assert_eq!(tree.file_count(), 1);
    }

    #[test]
    fn test_validate_insert() {
        let mut tree = Tree::new();
        tree.insert("dir/a.js", Some("1".into()));

        // existing parent, missing parent chain, sibling overwrite: all fine
        tree.validate_insert("/dir/b.js").unwrap();
        tree.validate_insert("/brand/new/deep.js").unwrap();
        tree.validate_insert("/dir/a.js").unwrap();

        // a file in the parent chain is rejected
        assert_eq!(
            tree.validate_insert("/dir/a.js/nested.js"),
            Err(Error::not_a_directory("/dir/a.js/nested.js"))
        );
        assert_eq!(tree.validate_insert("/"), Err(Error::empty_path()));
    }

    #[test]
    fn test_list_children() {
        let mut tree = Tree::new();
        tree.insert("dir/b.js", Some("1".into()));
        tree.insert("dir/a.css", Some("2".into()));
        tree.insert("dir/sub/c.js", Some("3".into()));

        let children = tree.list("/dir").unwrap();
        assert_eq!(
            children,
            vec![
                ("a.css".to_string(), EntryKind::File),
                ("b.js".to_string(), EntryKind::File),
                ("sub".to_string(), EntryKind::Directory),
            ]
        );

        assert_eq!(tree.list("/missing"), Err(Error::not_found("/missing")));
        assert_eq!(
            tree.list("/dir/b.js"),
            Err(Error::not_a_directory("/dir/b.js"))
        );
    }

    #[test]
    fn test_list_root() {
        let mut tree = Tree::new();
        tree.insert("one.js", Some("1".into()));
        let children = tree.list("/").unwrap();
        assert_eq!(children, vec![("one.js".to_string(), EntryKind::File)]);
    }

    #[test]
    fn test_remove() {
        let mut tree = Tree::new();
        tree.insert("dir/a.js", Some("1".into()));
        tree.remove("/dir/a.js").unwrap();
        assert!(!tree.contains("/dir/a.js"));
        // parent directory survives
        assert!(tree.contains("/dir"));
        assert_eq!(tree.remove("/dir/a.js"), Err(Error::not_found("/dir/a.js")));
    }

    #[test]
    fn test_insert_dir() {
        let mut tree = Tree::new();
        tree.insert_dir("/a/b").unwrap();
        assert_eq!(tree.kind("/a/b").unwrap(), EntryKind::Directory);
        assert_eq!(tree.insert_dir("/a/b"), Err(Error::already_exists("/a/b")));
        assert_eq!(tree.insert_dir("/"), Err(Error::already_exists("/")));
    }

    #[test]
    fn test_set_identifier() {
        let mut tree = Tree::new();
        tree.insert("pending.js", None);
        tree.set_identifier("/pending.js", Some("fresh".into()))
            .unwrap();
        assert_eq!(
            tree.identifier("/pending.js").unwrap(),
            Some("fresh".to_string())
        );

        tree.insert_dir("/d").unwrap();
        assert_eq!(
            tree.set_identifier("/d", Some("x".into())),
            Err(Error::not_a_file("/d"))
        );
    }

    #[test]
    fn test_clear() {
        let mut tree = Tree::new();
        tree.insert("a/b/c.js", Some("1".into()));
        tree.clear();
        assert_eq!(tree.file_count(), 0);
        assert!(tree.list("/").unwrap().is_empty());
    }

    #[test]
    fn test_walk_files_depth_first() {
        let mut tree = Tree::new();
        tree.insert("d/x/deep.js", Some("1".into()));
        tree.insert("d/a.js", Some("2".into()));
        tree.insert("d/z.js", Some("3".into()));

        let files = tree.walk_files("/d").unwrap();
        assert_eq!(files, vec!["a.js", "x/deep.js", "z.js"]);
    }

    #[test]
    fn test_walk_dirs_parents_first() {
        let mut tree = Tree::new();
        tree.insert("d/x/deep.js", Some("1".into()));
        tree.insert_dir("/d/empty").unwrap();
        tree.insert_dir("/d/x/hollow").unwrap();

        let dirs = tree.walk_dirs("/d").unwrap();
        assert_eq!(dirs, vec!["empty", "x", "x/hollow"]);
    }
}
