use std::time::Duration;

use serde::Deserialize;
use url::Url;
use watcher_core::Item;

use crate::http::{build_client, decode, endpoint, get_body, parse_base, string_or_number};
use crate::{FailureKind, FetchError};

/// What the per-account client returns: the account's items, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub items: Vec<Item>,
}

/// Per-account data source. One call is one fetch attempt.
#[async_trait::async_trait]
pub trait ProfileClient: Send + Sync {
    async fn fetch_profile(&self, internal_id: &str) -> Result<Profile, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub session_id: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Number of newest items requested per account.
    pub page_size: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.tiktok.com".to_string(),
            session_id: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            page_size: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemListResponse {
    #[serde(default)]
    status_code: i64,
    #[serde(default)]
    status_msg: Option<String>,
    #[serde(default)]
    item_list: Option<Vec<ItemRecord>>,
}

#[derive(Debug, Deserialize)]
struct ItemRecord {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
}

/// Fetches an account's item listing from the JSON item-list endpoint.
#[derive(Debug, Clone)]
pub struct HttpProfileClient {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl HttpProfileClient {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let base = parse_base(&settings.base_url)?;
        let client = build_client(settings.connect_timeout, settings.request_timeout)?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }
}

#[async_trait::async_trait]
impl ProfileClient for HttpProfileClient {
    async fn fetch_profile(&self, internal_id: &str) -> Result<Profile, FetchError> {
        let url = endpoint(
            &self.base,
            "api/post/item_list/",
            &[
                ("userId", internal_id.to_string()),
                ("count", self.settings.page_size.to_string()),
            ],
        )?;
        let body = get_body(&self.client, url, self.settings.session_id.as_deref()).await?;
        let response: ItemListResponse = decode(&body)?;

        if response.status_code != 0 {
            return Err(FetchError::new(
                FailureKind::Api {
                    code: response.status_code,
                },
                response.status_msg.unwrap_or_default(),
            ));
        }

        let items = response
            .item_list
            .unwrap_or_default()
            .into_iter()
            .map(|record| Item::new(record.id))
            .collect();
        Ok(Profile { items })
    }
}
