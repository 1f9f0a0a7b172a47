use std::time::Duration;

use models::NoteOwner;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use url::Url;
use utils::config::Config;

use crate::{
    api::{BugReportsApi, DevApi, ExhibitsApi, JotformsApi, NotesApi, PartsApi},
    error::{ClientError, map_reqwest_error},
};

/// Which response codes count as success for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expected {
    AnySuccess,
    Exactly(StatusCode),
}

impl Expected {
    pub(crate) const NO_CONTENT: Self = Self::Exactly(StatusCode::NO_CONTENT);
    pub(crate) const OK: Self = Self::Exactly(StatusCode::OK);

    fn accepts(self, status: StatusCode) -> bool {
        match self {
            Self::AnySuccess => status.is_success(),
            Self::Exactly(expected) => status == expected,
        }
    }
}

/// Typed REST client for the inventory backend.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    http: Client,
    base_url: String,
}

impl InventoryClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Self::REQUEST_TIMEOUT)
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::with_timeout(config.base_url.as_str(), config.request_timeout)
    }

    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(base_url.as_ref())?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("inventory-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn exhibits(&self) -> ExhibitsApi<'_> {
        ExhibitsApi::new(self)
    }

    pub fn parts(&self) -> PartsApi<'_> {
        PartsApi::new(self)
    }

    pub fn notes(&self, owner: NoteOwner) -> NotesApi<'_> {
        NotesApi::new(self, owner)
    }

    pub fn jotforms(&self) -> JotformsApi<'_> {
        JotformsApi::new(self)
    }

    pub fn bug_reports(&self) -> BugReportsApi<'_> {
        BugReportsApi::new(self)
    }

    pub fn dev(&self) -> DevApi<'_> {
        DevApi::new(self)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        expected: Expected,
    ) -> Result<Response, ClientError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, "Sending inventory request");
        let response = request.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "Inventory request failed to send");
            map_reqwest_error(e)
        })?;

        let status = response.status();
        if expected.accepts(status) {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            %method,
            path,
            status = status.as_u16(),
            "Inventory request returned unexpected status"
        );
        Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let text = response.text().await.map_err(map_reqwest_error)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .execute::<()>(Method::GET, path, None, Expected::AnySuccess)
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn send_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        expected: Expected,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(method, path, Some(body), expected).await?;
        Self::decode(response).await
    }

    /// Issue a write whose response body is not needed.
    pub(crate) async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        expected: Expected,
    ) -> Result<(), ClientError> {
        self.execute(method, path, body, expected).await?;
        Ok(())
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ClientError::InvalidBaseUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl(format!(
            "{raw}: unsupported scheme {}",
            url.scheme()
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = InventoryClient::new("http://localhost:3030//").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3030");
        assert_eq!(client.url("/exhibits"), "http://localhost:3030/exhibits");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            InventoryClient::new("not a url"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            InventoryClient::new("ftp://localhost:3030"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_from_config_uses_configured_host() {
        let config = Config::default();
        let client = InventoryClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3030");
    }

    #[test]
    fn test_expected_status_policy() {
        assert!(Expected::AnySuccess.accepts(StatusCode::CREATED));
        assert!(Expected::AnySuccess.accepts(StatusCode::NO_CONTENT));
        assert!(!Expected::AnySuccess.accepts(StatusCode::NOT_FOUND));
        assert!(Expected::NO_CONTENT.accepts(StatusCode::NO_CONTENT));
        assert!(!Expected::NO_CONTENT.accepts(StatusCode::OK));
        assert!(!Expected::OK.accepts(StatusCode::CREATED));
    }
}
