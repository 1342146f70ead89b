use engine_logging::engine_info;
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use watcher_core::Account;

use crate::client::ClientSettings;
use crate::http::{build_client, decode, endpoint, get_body, parse_base, string_or_number};
use crate::FetchError;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("account directory request failed: {0}")]
    Request(#[from] FetchError),
    #[error("account directory rejected the request (status {code}): {message}")]
    Rejected { code: i64, message: String },
    #[error("account directory response has no user list")]
    MissingUserList,
    #[error("account directory needs a session id")]
    MissingSession,
}

/// Source of the accounts to watch. Consulted once at startup.
#[async_trait::async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn accounts(&self) -> Result<Vec<Account>, DirectoryError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserListResponse {
    #[serde(default)]
    status_code: i64,
    #[serde(default)]
    status_msg: Option<String>,
    #[serde(default)]
    user_list: Option<Vec<UserEntry>>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    user: UserRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    unique_id: String,
}

/// Lists the accounts the session follows.
#[derive(Debug, Clone)]
pub struct HttpAccountDirectory {
    base: Url,
    session_id: String,
    client: reqwest::Client,
}

impl HttpAccountDirectory {
    /// Upper bound on accounts requested in the single directory call.
    pub const MAX_ACCOUNTS: u32 = 10_000;

    /// Uses the same endpoint, session and timeouts as the profile client.
    pub fn new(settings: &ClientSettings) -> Result<Self, DirectoryError> {
        let session_id = settings
            .session_id
            .clone()
            .ok_or(DirectoryError::MissingSession)?;
        Ok(Self {
            base: parse_base(&settings.base_url)?,
            session_id,
            client: build_client(settings.connect_timeout, settings.request_timeout)?,
        })
    }
}

#[async_trait::async_trait]
impl AccountDirectory for HttpAccountDirectory {
    async fn accounts(&self) -> Result<Vec<Account>, DirectoryError> {
        engine_info!("Getting following list");
        let url = endpoint(
            &self.base,
            "api/user/list",
            &[
                ("count", Self::MAX_ACCOUNTS.to_string()),
                ("minCursor", "0".to_string()),
            ],
        )?;
        let body = get_body(&self.client, url, Some(&self.session_id)).await?;
        let response: UserListResponse = decode(&body)?;

        if response.status_code != 0 {
            return Err(DirectoryError::Rejected {
                code: response.status_code,
                message: response.status_msg.unwrap_or_default(),
            });
        }

        let users = response.user_list.ok_or(DirectoryError::MissingUserList)?;
        Ok(users
            .into_iter()
            .map(|entry| Account::new(entry.user.id, entry.user.unique_id))
            .collect())
    }
}
