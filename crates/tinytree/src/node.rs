use std::collections::BTreeMap;

pub const ROOT_ID: NodeID = NodeID(0);

/// Unique identifier for a node in the tree cache.
///
/// IDs are stable arena indices; a removed node's slot is never reused
/// within the lifetime of a tree, and the whole arena is dropped on reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeID(usize);

impl NodeID {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single record in the tree arena.
///
/// Directories have no remote identity; they exist purely as a grouping
/// artifact derived from slash-delimited remote names. A file's identifier is
/// the sole correlation key to the remote resource; `None` means the file
/// exists locally but has not been persisted remotely yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory(BTreeMap<String, NodeID>),
    File(Option<String>),
}

impl Node {
    pub fn new_dir() -> Self {
        Node::Directory(BTreeMap::new())
    }

    pub fn new_file(identifier: Option<String>) -> Self {
        Node::File(identifier)
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Node::Directory(_) => EntryKind::Directory,
            Node::File(_) => EntryKind::File,
        }
    }

    pub fn as_dir(&self) -> Option<&BTreeMap<String, NodeID>> {
        match self {
            Node::Directory(entries) => Some(entries),
            Node::File(_) => None,
        }
    }

    pub fn as_dir_mut(&mut self) -> Option<&mut BTreeMap<String, NodeID>> {
        match self {
            Node::Directory(entries) => Some(entries),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&Option<String>> {
        match self {
            Node::File(identifier) => Some(identifier),
            Node::Directory(_) => None,
        }
    }
}

/// Kind of a directory entry (file or directory)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(EntryKind::File),
            "directory" => Ok(EntryKind::Directory),
            other => Err(format!("Unknown entry kind: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_string_conversion() {
        assert_eq!(EntryKind::File.as_str(), "file");
        assert_eq!(EntryKind::Directory.as_str(), "directory");
        assert_eq!("file".parse::<EntryKind>().unwrap(), EntryKind::File);
        assert!("symlink".parse::<EntryKind>().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&EntryKind::Directory).unwrap();
        assert_eq!(json, "\"directory\"");
        let parsed: EntryKind = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(parsed, EntryKind::File);
    }
}
