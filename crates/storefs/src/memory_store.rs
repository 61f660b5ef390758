//! In-memory resource store for tests and local experimentation.
//!
//! Behaves like the remote store's flat namespace: opaque identifiers fixed
//! at creation, no rename primitive, an explicit publish step. Every call is
//! appended to an operation log so tests can assert call ordering, and
//! individual operations can be made to fail on demand.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::protocol::{ListPage, ResourceRecord};
use crate::resource_type::ResourceType;
use crate::store::ResourceStore;

#[derive(Debug, Clone)]
struct StoredResource {
    name: String,
    resource_type: ResourceType,
    content: Vec<u8>,
}

#[derive(Debug, Default)]
struct Inner {
    resources: BTreeMap<String, StoredResource>,
    published: Vec<String>,
    calls: Vec<String>,
    next_id: u64,
    page_size: usize,
    failing: HashSet<String>,
    fail_after: HashMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a resource directly, bypassing the call log. Returns its id.
    pub async fn put(&self, name: &str, resource_type: ResourceType, content: &[u8]) -> String {
        let mut inner = self.inner.lock().await;
        let id = Self::mint_id(&mut inner);
        inner.resources.insert(
            id.clone(),
            StoredResource {
                name: name.to_string(),
                resource_type,
                content: content.to_vec(),
            },
        );
        id
    }

    /// Make the named operation ("list", "create", "update", "delete",
    /// "publish") fail until cleared
    pub async fn fail_on(&self, operation: &str) {
        self.inner.lock().await.failing.insert(operation.to_string());
    }

    /// Let the named operation succeed `successes` more times, then fail
    pub async fn set_fail_after(&self, operation: &str, successes: usize) {
        self.inner
            .lock()
            .await
            .fail_after
            .insert(operation.to_string(), successes);
    }

    pub async fn clear_failures(&self) {
        let mut inner = self.inner.lock().await;
        inner.failing.clear();
        inner.fail_after.clear();
    }

    /// Split listings into pages of `n` entries; 0 means a single page
    pub async fn set_page_size(&self, n: usize) {
        self.inner.lock().await.page_size = n;
    }

    pub async fn call_log(&self) -> Vec<String> {
        self.inner.lock().await.calls.clone()
    }

    pub async fn published(&self) -> Vec<String> {
        self.inner.lock().await.published.clone()
    }

    pub async fn contains_name(&self, name: &str) -> bool {
        self.inner
            .lock()
            .await
            .resources
            .values()
            .any(|r| r.name == name)
    }

    pub async fn content_of_name(&self, name: &str) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .await
            .resources
            .values()
            .find(|r| r.name == name)
            .map(|r| r.content.clone())
    }

    pub async fn resource_count(&self) -> usize {
        self.inner.lock().await.resources.len()
    }

    fn mint_id(inner: &mut Inner) -> String {
        inner.next_id += 1;
        format!("mem-{:04}", inner.next_id)
    }

    fn check_failure(inner: &mut Inner, operation: &str) -> Result<()> {
        if let Some(remaining) = inner.fail_after.get_mut(operation) {
            if *remaining == 0 {
                return Err(Error::unavailable(format!(
                    "injected {} failure",
                    operation
                )));
            }
            *remaining -= 1;
        }
        if inner.failing.contains(operation) {
            Err(Error::unavailable(format!(
                "injected {} failure",
                operation
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn list_page(&self, next_link: Option<&str>) -> Result<ListPage> {
        let mut inner = self.inner.lock().await;
        inner.calls.push("list".to_string());
        Self::check_failure(&mut inner, "list")?;

        let offset: usize = match next_link {
            Some(link) => link
                .strip_prefix("page:")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| Error::decode(format!("bad continuation token {}", link)))?,
            None => 0,
        };

        let records: Vec<ResourceRecord> = inner
            .resources
            .iter()
            .map(|(id, r)| ResourceRecord {
                id: id.clone(),
                name: r.name.clone(),
            })
            .collect();

        if inner.page_size == 0 || records.len() <= inner.page_size {
            return Ok(ListPage {
                value: if offset == 0 { records } else { Vec::new() },
                next_link: None,
            });
        }

        let end = (offset + inner.page_size).min(records.len());
        let next_link = (end < records.len()).then(|| format!("page:{}", end));
        Ok(ListPage {
            value: records[offset.min(records.len())..end].to_vec(),
            next_link,
        })
    }

    async fn fetch_content(&self, id: &str) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(format!("read {}", id));
        Self::check_failure(&mut inner, "read")?;
        inner
            .resources
            .get(id)
            .map(|r| r.content.clone())
            .ok_or_else(|| Error::unavailable(format!("unknown resource {}", id)))
    }

    async fn fetch_source(&self, id: &str) -> Result<(Vec<u8>, ResourceType)> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(format!("source {}", id));
        Self::check_failure(&mut inner, "source")?;
        inner
            .resources
            .get(id)
            .map(|r| (r.content.clone(), r.resource_type))
            .ok_or_else(|| Error::unavailable(format!("unknown resource {}", id)))
    }

    async fn create(
        &self,
        name: &str,
        _display_name: &str,
        resource_type: ResourceType,
        content: &[u8],
    ) -> Result<String> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(format!("create {}", name));
        Self::check_failure(&mut inner, "create")?;
        let id = Self::mint_id(&mut inner);
        inner.resources.insert(
            id.clone(),
            StoredResource {
                name: name.to_string(),
                resource_type,
                content: content.to_vec(),
            },
        );
        Ok(id)
    }

    async fn update(&self, id: &str, content: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(format!("update {}", id));
        Self::check_failure(&mut inner, "update")?;
        match inner.resources.get_mut(id) {
            Some(resource) => {
                resource.content = content.to_vec();
                Ok(())
            }
            None => Err(Error::unavailable(format!("unknown resource {}", id))),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(format!("delete {}", id));
        Self::check_failure(&mut inner, "delete")?;
        match inner.resources.remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::unavailable(format!("unknown resource {}", id))),
        }
    }

    async fn publish(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(format!("publish {}", id));
        Self::check_failure(&mut inner, "publish")?;
        let id = id.to_string();
        inner.published.push(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_walks_all_records() {
        tokio_test::block_on(async {
            let store = MemoryResourceStore::new();
            for i in 0..5 {
                store
                    .put(&format!("file{}.js", i), ResourceType::Script, b"x")
                    .await;
            }
            store.set_page_size(2).await;

            let mut names = Vec::new();
            let mut next: Option<String> = None;
            loop {
                let page = store.list_page(next.as_deref()).await.unwrap();
                names.extend(page.value.into_iter().map(|r| r.name));
                match page.next_link {
                    Some(link) => next = Some(link),
                    None => break,
                }
            }
            assert_eq!(names.len(), 5);
        });
    }

    #[test]
    fn test_injected_failure() {
        tokio_test::block_on(async {
            let store = MemoryResourceStore::new();
            store.fail_on("delete").await;
            let id = store.put("a.js", ResourceType::Script, b"x").await;
            assert!(store.delete(&id).await.is_err());
            store.clear_failures().await;
            assert!(store.delete(&id).await.is_ok());
        });
    }
}
