//! Pure in-memory tree cache over a flat, slash-delimited namespace.
//!
//! This crate performs no I/O. It indexes remote resource names of the form
//! `dir/sub/name.ext` as a directory/file hierarchy, with file nodes carrying
//! an optional opaque remote identifier. The sync engine layered above it is
//! responsible for keeping the tree consistent with the remote store.

pub mod error;
pub mod node;
pub mod path;
pub mod tree;

pub use error::{Error, Result};
pub use node::{EntryKind, Node, NodeID, ROOT_ID};
pub use tree::Tree;
