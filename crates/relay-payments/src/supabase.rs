//! Hosted Record Store (Supabase / PostgREST)
//!
//! Reads and appends `pro_users` rows through the PostgREST HTTP interface.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::entitlement::EntitlementRecord;
use crate::error::{PaymentError, Result};
use crate::store::EntitlementStore;

/// Record store connection settings
#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Access key sent as both `apikey` and bearer token
    pub api_key: String,

    /// Table holding entitlement rows
    pub table: String,
}

impl SupabaseConfig {
    pub const DEFAULT_TABLE: &'static str = "pro_users";

    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            table: Self::DEFAULT_TABLE.into(),
        }
    }

    /// Build from an environment-style variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup("SUPABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PaymentError::Config("SUPABASE_URL not set".into()))?;
        let api_key = lookup("SUPABASE_ANON_KEY")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PaymentError::Config("SUPABASE_ANON_KEY not set".into()))?;

        let mut config = Self::new(url, api_key);
        if let Some(table) = lookup("SUPABASE_TABLE") {
            config.table = table;
        }
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
struct ProFlagRow {
    #[serde(rename = "isPro", default)]
    is_pro: Option<bool>,
}

/// PostgREST-backed entitlement store
pub struct SupabaseStore {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PaymentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, self.config.table)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PaymentError::Storage(format!("record store returned {status}: {body}")))
    }
}

#[async_trait]
impl EntitlementStore for SupabaseStore {
    async fn find_pro_flag(&self, email: &str) -> Result<Option<bool>> {
        let filter = format!("eq.{email}");

        // limit=2 is enough to tell "one row" from "several"
        let response = self
            .request(self.client.get(self.table_url()))
            .query(&[("select", "isPro"), ("email", filter.as_str()), ("limit", "2")])
            .send()
            .await
            .map_err(|e| PaymentError::Storage(e.to_string()))?;

        let rows: Vec<ProFlagRow> = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| PaymentError::Storage(format!("decode: {e}")))?;

        match rows.as_slice() {
            [] => Ok(None),
            [row] => Ok(Some(row.is_pro.unwrap_or(false))),
            _ => Err(PaymentError::Storage(format!(
                "multiple rows returned for single-row lookup of {email}"
            ))),
        }
    }

    async fn insert(&self, record: &EntitlementRecord) -> Result<()> {
        let response = self
            .request(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await
            .map_err(|e| PaymentError::Storage(e.to_string()))?;

        Self::check_status(response).await?;
        Ok(())
    }
}
