//! HTTP client for the public `web_profile_info` endpoint.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::{ScraperError, TransientKind};
use crate::proxy::Egress;
use crate::types::{RawProfile, WebProfileResponse};

const DEFAULT_BASE_URL: &str = "https://i.instagram.com/";
const PROFILE_INFO_PATH: &str = "api/v1/users/web_profile_info/";
const APP_ID_HEADER: &str = "x-ig-app-id";
const MAX_REDIRECTS: usize = 10;

/// Performs one profile lookup through a given egress.
///
/// [`ProfileClient`] is the production implementation; tests substitute
/// scripted sources to drive the retry controller and scheduler.
pub trait ProfileSource: Send + Sync {
    /// Fetches the raw profile record for `username`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::ProfileUnavailable`]: no user in the response.
    /// - [`ScraperError::Transient`]: status, egress or timeout failure.
    /// - Any other variant is terminal.
    fn fetch_profile(
        &self,
        username: &str,
        egress: &Egress,
    ) -> impl Future<Output = Result<RawProfile, ScraperError>> + Send;
}

impl<T: ProfileSource> ProfileSource for Arc<T> {
    fn fetch_profile(
        &self,
        username: &str,
        egress: &Egress,
    ) -> impl Future<Output = Result<RawProfile, ScraperError>> + Send {
        (**self).fetch_profile(username, egress)
    }
}

/// Client for `GET /api/v1/users/web_profile_info/?username=<u>`.
///
/// The direct-egress `reqwest::Client` is built once; proxied attempts get a
/// fresh client per attempt because `reqwest` binds proxies at build time.
pub struct ProfileClient {
    direct: Client,
    base_url: Url,
    app_id: String,
    user_agent: String,
    timeout: Duration,
}

impl ProfileClient {
    /// Creates a client pointed at the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Unexpected`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(timeout_secs: u64, app_id: &str, user_agent: &str) -> Result<Self, ScraperError> {
        Self::with_base_url(timeout_secs, app_id, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Unexpected`] if the client cannot be built or
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        timeout_secs: u64,
        app_id: &str,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        let timeout = Duration::from_secs(timeout_secs);
        let direct = build_http_client(timeout, user_agent, None)?;

        // Exactly one trailing slash so `join` appends rather than replaces
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ScraperError::Unexpected {
            detail: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            direct,
            base_url,
            app_id: app_id.to_owned(),
            user_agent: user_agent.to_owned(),
            timeout,
        })
    }

    /// Builds the profile lookup URL with `username` percent-encoded.
    fn profile_url(&self, username: &str) -> Result<Url, ScraperError> {
        let mut url = self
            .base_url
            .join(PROFILE_INFO_PATH)
            .map_err(|e| ScraperError::Unexpected {
                detail: format!("could not build profile URL: {e}"),
            })?;
        url.query_pairs_mut().append_pair("username", username);
        Ok(url)
    }

    fn client_for(&self, egress: &Egress) -> Result<Client, ScraperError> {
        match egress {
            Egress::Direct => Ok(self.direct.clone()),
            Egress::Proxy(proxy_url) => {
                build_http_client(self.timeout, &self.user_agent, Some(proxy_url))
            }
        }
    }
}

impl ProfileSource for ProfileClient {
    async fn fetch_profile(
        &self,
        username: &str,
        egress: &Egress,
    ) -> Result<RawProfile, ScraperError> {
        let url = self.profile_url(username)?;
        let client = self.client_for(egress)?;

        let response = client
            .get(url)
            .header(APP_ID_HEADER, &self.app_id)
            .send()
            .await
            .map_err(|e| ScraperError::from_transport(username, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Transient {
                username: username.to_owned(),
                kind: TransientKind::HttpStatus(status.as_u16()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::from_transport(username, &e))?;
        let envelope = serde_json::from_str::<WebProfileResponse>(&body).map_err(|e| {
            ScraperError::Deserialize {
                context: format!("web_profile_info response for {username}"),
                source: e,
            }
        })?;

        match envelope.into_user(username)? {
            Some(user) => Ok(RawProfile {
                username: username.to_owned(),
                user: Some(user),
            }),
            None => Err(ScraperError::ProfileUnavailable {
                username: username.to_owned(),
            }),
        }
    }
}

fn build_http_client(
    timeout: Duration,
    user_agent: &str,
    proxy_url: Option<&str>,
) -> Result<Client, ScraperError> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));

    if let Some(proxy_url) = proxy_url {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| ScraperError::InvalidProxy {
            reason: e.to_string(),
        })?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| ScraperError::Unexpected {
        detail: format!("could not build HTTP client: {e}"),
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
