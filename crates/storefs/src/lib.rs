//! Virtual filesystem over a flat, remotely-hosted resource store.
//!
//! The store exposes named resources through a paginated REST API with
//! opaque identifiers and no hierarchy. This crate rebuilds a directory tree
//! from the "/"-delimited resource names, serves filesystem reads from that
//! cache, and translates every mutation (including rename, which the store
//! cannot do natively) into the store's flat create/read/update/delete/
//! publish primitives.
//!
//! Hosts provide credentials through a [`ConnectionContext`] and observe
//! mutations through the [`ChangeEvent`] broadcast stream.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod fs;
pub mod memory_store;
pub mod protocol;
pub mod resource_type;
pub mod store;

pub use client::HttpResourceStore;
pub use config::{ConnectionContext, EngineConfig, FilterSet};
pub use error::{Error, Result};
pub use events::ChangeEvent;
pub use fs::{RenameOptions, StoreFs, WriteOptions};
pub use memory_store::MemoryResourceStore;
pub use protocol::{ListPage, ResourceRecord};
pub use resource_type::ResourceType;
pub use store::ResourceStore;

pub use tinytree::EntryKind;
