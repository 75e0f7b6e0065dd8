use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::error::{NotizError, Result};

/// Default location of the backup service.
pub const DEFAULT_API_BASE: &str = "http://localhost:7001/api";

/// Routes exposed by the backup service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Load,
    Save,
    Push,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Load => "load",
            Route::Save => "save",
            Route::Push => "push",
        }
    }
}

/// Transport to the remote backup service.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetch the stored board, bypassing any caches.
    async fn load(&self) -> Result<Value>;

    /// Replace the stored board with `body` (a JSON array).
    async fn save(&self, body: String) -> Result<()>;

    /// Signal that the session is ending. A service without this route is not an error.
    async fn push(&self) -> Result<()>;

    /// Queue a request that outlives the caller. Returns `false` when no such
    /// transport is available; nothing is sent in that case.
    fn beacon(&self, _route: Route, _body: String) -> bool {
        false
    }
}

/// reqwest-backed client for `GET {base}/load`, `POST {base}/save`, `POST {base}/push`.
pub struct HttpRemote {
    base: String,
    client: reqwest::Client,
    beacons: bool,
}

impl HttpRemote {
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        reqwest::Url::parse(base)
            .map_err(|e| NotizError::Config(format!("invalid api_base '{base}': {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotizError::Config(format!("http client: {e}")))?;

        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client,
            beacons: true,
        })
    }

    /// Disable detached dispatch, e.g. in a process that exits right after finalizing.
    pub fn without_beacon(mut self) -> Self {
        self.beacons = false;
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, route: Route) -> String {
        format!("{}/{}", self.base, route.path())
    }
}

fn unavailable(method: &str, url: &str, detail: impl std::fmt::Display) -> NotizError {
    NotizError::RemoteUnavailable(format!("{method} {url}: {detail}"))
}

async fn post(client: &reqwest::Client, url: &str, body: String) -> Result<StatusCode> {
    let mut req = client.post(url);
    if !body.is_empty() {
        req = req.header(CONTENT_TYPE, "application/json");
    }
    let resp = req
        .body(body)
        .send()
        .await
        .map_err(|e| unavailable("POST", url, e))?;
    Ok(resp.status())
}

#[async_trait]
impl RemoteClient for HttpRemote {
    async fn load(&self) -> Result<Value> {
        let url = self.url(Route::Load);
        let resp = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| unavailable("GET", &url, e))?;

        if !resp.status().is_success() {
            return Err(unavailable("GET", &url, resp.status()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| unavailable("GET", &url, e))?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(url = %url, error = %e, "remote load body is not JSON");
                Ok(Value::Null)
            }
        }
    }

    async fn save(&self, body: String) -> Result<()> {
        let url = self.url(Route::Save);
        let status = post(&self.client, &url, body).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(unavailable("POST", &url, status))
        }
    }

    async fn push(&self) -> Result<()> {
        let url = self.url(Route::Push);
        let status = post(&self.client, &url, String::new()).await?;
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => {
                debug!(url = %url, "service has no push route");
                Ok(())
            }
            s => Err(unavailable("POST", &url, s)),
        }
    }

    fn beacon(&self, route: Route, body: String) -> bool {
        if !self.beacons || route == Route::Load {
            return false;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return false;
        };

        let client = self.client.clone();
        let url = self.url(route);
        handle.spawn(async move {
            match post(&client, &url, body).await {
                Ok(status) => debug!(url = %url, %status, "beacon delivered"),
                Err(e) => debug!(error = %e, "beacon failed"),
            }
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_joined_under_base() {
        let remote = HttpRemote::new("http://localhost:7001/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(remote.base(), "http://localhost:7001/api");
        assert_eq!(remote.url(Route::Load), "http://localhost:7001/api/load");
        assert_eq!(remote.url(Route::Save), "http://localhost:7001/api/save");
        assert_eq!(remote.url(Route::Push), "http://localhost:7001/api/push");
    }

    #[test]
    fn test_invalid_base_is_config_error() {
        let result = HttpRemote::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(NotizError::Config(_))));
    }

    #[test]
    fn test_beacon_unavailable_outside_runtime() {
        let remote = HttpRemote::new(DEFAULT_API_BASE, Duration::from_secs(1)).unwrap();
        assert!(!remote.beacon(Route::Save, "[]".to_string()));
    }

    #[tokio::test]
    async fn test_beacon_disabled() {
        let remote = HttpRemote::new(DEFAULT_API_BASE, Duration::from_secs(1))
            .unwrap()
            .without_beacon();
        assert!(!remote.beacon(Route::Push, String::new()));
    }
}
