//! Thin async client for a PostgREST endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

/// Connection settings for the record store endpoint.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
  /// Base URL of the REST endpoint, e.g. `https://x.supabase.co/rest/v1`.
  pub base_url: String,
  /// Service key, sent both as `apikey` and as a bearer token.
  pub api_key:  String,
}

/// Async client for one PostgREST endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct Postgrest {
  client: Client,
  config: PostgrestConfig,
}

impl Postgrest {
  pub fn new(config: PostgrestConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, table: &str) -> String {
    format!("{}/{table}", self.config.base_url.trim_end_matches('/'))
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    req
      .header("apikey", &self.config.api_key)
      .bearer_auth(&self.config.api_key)
  }

  async fn unexpected(table: &str, resp: reqwest::Response) -> Error {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Error::UnexpectedStatus { table: table.to_string(), status, body }
  }

  /// `GET /{table}?{query}` — rows matching the filter.
  pub async fn select<T: DeserializeOwned>(
    &self,
    table: &str,
    query: &[(&str, String)],
  ) -> Result<Vec<T>> {
    let resp = self
      .auth(self.client.get(self.url(table)))
      .query(query)
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Self::unexpected(table, resp).await);
    }
    Ok(resp.json().await?)
  }

  /// `POST /{table}?{query}` — returns `None` on a uniqueness conflict,
  /// the created rows otherwise.
  pub async fn insert<T: DeserializeOwned, B: Serialize>(
    &self,
    table: &str,
    query: &[(&str, String)],
    body: &B,
  ) -> Result<Option<Vec<T>>> {
    let resp = self
      .auth(self.client.post(self.url(table)))
      .query(query)
      .header("Prefer", "return=representation")
      .json(body)
      .send()
      .await?;

    if resp.status() == StatusCode::CONFLICT {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(Self::unexpected(table, resp).await);
    }
    Ok(Some(resp.json().await?))
  }

  /// `PATCH /{table}?{query}` — the rows the filter matched and updated.
  /// An empty vec means the filter matched nothing.
  pub async fn update<T: DeserializeOwned, B: Serialize>(
    &self,
    table: &str,
    query: &[(&str, String)],
    body: &B,
  ) -> Result<Vec<T>> {
    let resp = self
      .auth(self.client.patch(self.url(table)))
      .query(query)
      .header("Prefer", "return=representation")
      .json(body)
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Self::unexpected(table, resp).await);
    }
    Ok(resp.json().await?)
  }
}
