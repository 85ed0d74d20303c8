pub mod error;
pub mod types;

pub use error::{NotionError, Result};
pub use types::{
    DateValue, Filter, FilterCondition, Page, PageReference, PropertyValue, QueryRequest,
    QueryResponse, RichText, Sort, SortDirection, TextCondition, UpdatePageRequest,
};

use serde::de::DeserializeOwned;
use types::ErrorBody;

const BASE_URL: &str = "https://api.notion.com";

/// API version pinned for every request.
const NOTION_VERSION: &str = "2022-06-28";

pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl NotionClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    /// Point the client at a different origin (proxies, mock servers).
    pub fn with_base_url(token: String, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Query one page of a database. Pass `next_cursor` back as `start_cursor`
    /// to continue.
    pub async fn query_database(
        &self,
        database_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse> {
        let url = format!("{}/v1/databases/{}/query", self.base_url, database_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(request)
            .send()
            .await?;

        let page: QueryResponse = Self::decode(resp).await?;
        tracing::debug!(
            database_id,
            count = page.results.len(),
            has_more = page.has_more,
            "Queried database page"
        );
        Ok(page)
    }

    /// Retrieve a single page with its full property set.
    pub async fn retrieve_page(&self, page_id: &str) -> Result<Page> {
        let url = format!("{}/v1/pages/{}", self.base_url, page_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;

        Self::decode(resp).await
    }

    /// Update page properties in a single PATCH call.
    pub async fn update_page(&self, page_id: &str, request: &UpdatePageRequest) -> Result<Page> {
        let url = format!("{}/v1/pages/{}", self.base_url, page_id);
        let resp = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(request)
            .send()
            .await?;

        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => (err.code, err.message),
                Err(_) => (String::new(), body),
            };
            return Err(NotionError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
