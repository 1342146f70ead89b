//! Request plumbing shared by the HTTP collaborators.

use std::time::Duration;

use reqwest::header::{HeaderValue, COOKIE};
use serde::de::{self, Deserialize, Deserializer};
use url::Url;

use crate::{FailureKind, FetchError};

pub(crate) fn build_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
}

/// Parses the API base, making sure relative joins keep any path prefix.
pub(crate) fn parse_base(base_url: &str) -> Result<Url, FetchError> {
    let mut base = Url::parse(base_url).map_err(|err| {
        FetchError::new(FailureKind::InvalidUrl, format!("{base_url}: {err}"))
    })?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

pub(crate) fn endpoint(
    base: &Url,
    path: &str,
    params: &[(&str, String)],
) -> Result<Url, FetchError> {
    let mut url = base
        .join(path)
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if !params.is_empty() {
        url.query_pairs_mut()
            .clear()
            .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
    }
    Ok(url)
}

/// GETs `url` with the session cookie and returns the body of a 2xx response.
pub(crate) async fn get_body(
    client: &reqwest::Client,
    url: Url,
    session_id: Option<&str>,
) -> Result<Vec<u8>, FetchError> {
    let mut request = client.get(url);
    if let Some(session_id) = session_id {
        let cookie = HeaderValue::from_str(&format!("sessionid={session_id}")).map_err(|err| {
            FetchError::new(
                FailureKind::InvalidCredential,
                format!("session id cannot be sent as a cookie: {err}"),
            )
        })?;
        request = request.header(COOKIE, cookie);
    }

    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }

    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    Ok(bytes.to_vec())
}

pub(crate) fn decode<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, FetchError> {
    serde_json::from_slice(body)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::Decode, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

/// Remote IDs arrive as either JSON strings or numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}
