use super::RemoteStore;
use crate::config::RemoteConfig;
use crate::entities::Row;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// HTTP client for a PostgREST-style backend.
///
/// Tables are exposed under `<base>/rest/v1/<table>`; the anon key is sent
/// both as `apikey` and as a bearer token. Inserts ask the server to return
/// the stored representation so callers see server-assigned columns.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.anon_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: reqwest::Response, table: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Remote(format!("{table}: {status}: {body}")))
    }
}

#[async_trait]
impl RemoteStore for RestClient {
    #[instrument(skip(self))]
    async fn fetch_rows(&self, table: &str) -> Result<Vec<Row>> {
        let response = self
            .authed(self.http.get(self.table_url(table)))
            .query(&[("select", "*")])
            .send()
            .await?;
        let rows: Vec<Row> = Self::check(response, table).await?.json().await?;
        debug!(table, count = rows.len(), "fetched rows");
        Ok(rows)
    }

    #[instrument(skip(self, row))]
    async fn insert_row(&self, table: &str, row: Row) -> Result<Row> {
        let response = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&serde_json::Value::Object(row))
            .send()
            .await?;
        let mut returned: Vec<Row> = Self::check(response, table).await?.json().await?;
        returned
            .drain(..)
            .next()
            .ok_or_else(|| Error::Remote(format!("{table}: insert returned no representation")))
    }

    #[instrument(skip(self))]
    async fn delete_row(&self, table: &str, key_column: &str, key: &str) -> Result<()> {
        let response = self
            .authed(self.http.delete(self.table_url(table)))
            .query(&[(key_column, format!("eq.{key}"))])
            .send()
            .await?;
        Self::check(response, table).await?;
        debug!(table, key_column, key, "deleted rows");
        Ok(())
    }
}
