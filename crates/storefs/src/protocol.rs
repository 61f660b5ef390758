//! Wire shapes exchanged with the remote resource store

use serde::{Deserialize, Serialize};

use crate::resource_type::ResourceType;

/// One (identifier, name) pair returned by the listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: String,
    pub name: String,
}

/// A single page of the paginated listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPage {
    pub value: Vec<ResourceRecord>,
    #[serde(rename = "nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

/// Content field of a single resource, base64 on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBody {
    pub content: String,
}

/// Content plus declared type, fetched when recreating under a new name
#[derive(Debug, Clone, Deserialize)]
pub struct SourceBody {
    pub content: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
}

/// Create payload for a new resource
#[derive(Debug, Clone, Serialize)]
pub struct NewResource<'a> {
    pub name: &'a str,
    pub displayname: &'a str,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// base64-encoded bytes
    pub content: String,
}

/// Create response body; some store versions omit the id and only send the
/// entity-location header
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedBody {
    #[serde(default)]
    pub id: Option<String>,
}
