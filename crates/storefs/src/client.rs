use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use async_trait::async_trait;
use diagnostics::log_debug;

use crate::config::ConnectionContext;
use crate::error::{Error, Result};
use crate::protocol::{ContentBody, CreatedBody, ListPage, NewResource, SourceBody};
use crate::resource_type::ResourceType;
use crate::store::ResourceStore;

const TIMEOUT_SECONDS: u64 = 60;

/// Header carrying the canonical entity URL of a freshly created resource,
/// used when the create response body omits the identifier.
const ENTITY_LOCATION_HEADER: &str = "Location";

/// Async REST client for the remote resource store
pub struct HttpResourceStore {
    http_client: reqwest::Client,
    token: String,
    base_url: String,
}

impl HttpResourceStore {
    pub fn new(ctx: &ConnectionContext) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .build()?;

        Ok(HttpResourceStore {
            http_client,
            token: ctx.access_token.clone(),
            base_url: ctx.api_url.trim_end_matches('/').to_string(),
        })
    }

    // URL construction helpers
    fn list_url(&self) -> String {
        format!("{}/resources?select=id,name", self.base_url)
    }

    fn select_url(&self, id: &str, select: &str) -> String {
        format!("{}/resources({})?select={}", self.base_url, id, select)
    }

    fn entity_url(&self, id: &str) -> String {
        format!("{}/resources({})", self.base_url, id)
    }

    fn create_url(&self) -> String {
        format!("{}/resources", self.base_url)
    }

    fn publish_url(&self) -> String {
        format!("{}/publish", self.base_url)
    }

    /// Generic JSON fetch with bearer authentication
    async fn fetch_json<T>(&self, url: &str) -> Result<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::unavailable(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("bad JSON from {}: {}", url, e)))
    }

    fn check_status(response: &reqwest::Response, what: &str) -> Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::unavailable(format!(
                "HTTP {} while {}",
                response.status(),
                what
            )))
        }
    }

    fn decode_content(encoded: &str) -> Result<Vec<u8>> {
        BASE64
            .decode(encoded)
            .map_err(|e| Error::decode(format!("invalid base64 content: {}", e)))
    }

    /// Extract the identifier from an entity URL of the form
    /// `.../resources(<id>)`
    fn id_from_entity_location(location: &str) -> Option<String> {
        let open = location.rfind('(')?;
        let close = location.rfind(')')?;
        (close > open + 1).then(|| location[open + 1..close].to_string())
    }

    fn publish_envelope(id: &str) -> String {
        format!(
            "<publish><resources><resource>{}</resource></resources></publish>",
            id
        )
    }
}

#[async_trait]
impl ResourceStore for HttpResourceStore {
    async fn list_page(&self, next_link: Option<&str>) -> Result<ListPage> {
        let url = next_link
            .map(str::to_string)
            .unwrap_or_else(|| self.list_url());
        log_debug!("Fetching listing page {url}", url: url);
        self.fetch_json(&url).await
    }

    async fn fetch_content(&self, id: &str) -> Result<Vec<u8>> {
        let body: ContentBody = self.fetch_json(&self.select_url(id, "content")).await?;
        Self::decode_content(&body.content)
    }

    async fn fetch_source(&self, id: &str) -> Result<(Vec<u8>, ResourceType)> {
        let body: SourceBody = self.fetch_json(&self.select_url(id, "content,type")).await?;
        Ok((Self::decode_content(&body.content)?, body.resource_type))
    }

    async fn create(
        &self,
        name: &str,
        display_name: &str,
        resource_type: ResourceType,
        content: &[u8],
    ) -> Result<String> {
        let payload = NewResource {
            name,
            displayname: display_name,
            resource_type,
            content: BASE64.encode(content),
        };
        let response = self
            .http_client
            .post(self.create_url())
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;
        Self::check_status(&response, &format!("creating {}", name))?;

        let header_id = response
            .headers()
            .get(ENTITY_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::id_from_entity_location);

        let body = response.text().await.unwrap_or_default();
        if let Ok(created) = serde_json::from_str::<CreatedBody>(&body) {
            if let Some(id) = created.id {
                return Ok(id);
            }
        }

        header_id
            .ok_or_else(|| Error::decode(format!("create response for {} carried no identifier", name)))
    }

    async fn update(&self, id: &str, content: &[u8]) -> Result<()> {
        let body = serde_json::json!({ "content": BASE64.encode(content) });
        let response = self
            .http_client
            .patch(self.entity_url(id))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check_status(&response, &format!("updating {}", id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .http_client
            .delete(self.entity_url(id))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check_status(&response, &format!("deleting {}", id))
    }

    async fn publish(&self, id: &str) -> Result<()> {
        let response = self
            .http_client
            .post(self.publish_url())
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(Self::publish_envelope(id))
            .send()
            .await?;
        Self::check_status(&response, &format!("publishing {}", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> HttpResourceStore {
        let ctx = ConnectionContext::new("test", "https://example.test/api/", "token");
        HttpResourceStore::new(&ctx).unwrap()
    }

    #[test]
    fn test_url_construction() {
        let store = test_store();
        assert_eq!(
            store.list_url(),
            "https://example.test/api/resources?select=id,name"
        );
        assert_eq!(
            store.select_url("abc-123", "content"),
            "https://example.test/api/resources(abc-123)?select=content"
        );
        assert_eq!(
            store.entity_url("abc-123"),
            "https://example.test/api/resources(abc-123)"
        );
        assert_eq!(store.publish_url(), "https://example.test/api/publish");
    }

    #[test]
    fn test_id_from_entity_location() {
        assert_eq!(
            HttpResourceStore::id_from_entity_location(
                "https://example.test/api/resources(abc-123)"
            ),
            Some("abc-123".to_string())
        );
        assert_eq!(
            HttpResourceStore::id_from_entity_location("https://example.test/api/resources"),
            None
        );
        assert_eq!(HttpResourceStore::id_from_entity_location("()"), None);
    }

    #[test]
    fn test_publish_envelope() {
        assert_eq!(
            HttpResourceStore::publish_envelope("abc"),
            "<publish><resources><resource>abc</resource></resources></publish>"
        );
    }
}
