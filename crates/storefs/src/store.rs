use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::ListPage;
use crate::resource_type::ResourceType;

/// Flat create/read/update/delete/publish surface of the remote store.
///
/// Implementations deal in decoded bytes; base64 and any other wire encoding
/// is an implementation concern. The engine never caches content, so every
/// call here reaches the store.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch one listing page. `next_link` is the opaque continuation token
    /// from the previous page, or `None` for the first page.
    async fn list_page(&self, next_link: Option<&str>) -> Result<ListPage>;

    /// Content of a single resource
    async fn fetch_content(&self, id: &str) -> Result<Vec<u8>>;

    /// Content plus declared type, everything needed to recreate the
    /// resource under a different name
    async fn fetch_source(&self, id: &str) -> Result<(Vec<u8>, ResourceType)>;

    /// Create a resource and return its new identifier
    async fn create(
        &self,
        name: &str,
        display_name: &str,
        resource_type: ResourceType,
        content: &[u8],
    ) -> Result<String>;

    /// Replace the content of an existing resource
    async fn update(&self, id: &str, content: &[u8]) -> Result<()>;

    /// Delete a resource by identifier
    async fn delete(&self, id: &str) -> Result<()>;

    /// Finalize a pending change so it takes effect beyond the store's
    /// internal staging
    async fn publish(&self, id: &str) -> Result<()>;
}
