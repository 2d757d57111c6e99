//! HTTP client for the remote screenshot-rendering service.
//!
//! The client owns the endpoint, the access key and a configured
//! `reqwest::Client`. A capture request is a single GET whose query string
//! carries the key, the percent-encoded target URL and the viewport
//! parameters of one profile. The paired capture issues both profile requests
//! back-to-back and joins them, so they run concurrently.

use std::time::Duration;

use url::Url;

use crate::{CaptureConfig, Error, Result, Viewport, ViewportProfile};

/// Client for the capture endpoint (either the remote service or a relay).
#[derive(Debug, Clone)]
pub struct ScreenshotClient {
    http: reqwest::Client,
    endpoint: Url,
    access_key: String,
    mobile_device: String,
    mobile_full_page: bool,
    desktop_viewport: Viewport,
}

impl ScreenshotClient {
    /// Build a client from a capture config.
    pub fn new(config: &CaptureConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint {:?}: {}", config.endpoint, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            access_key: config.access_key.clone(),
            mobile_device: config.mobile_device.clone(),
            mobile_full_page: config.mobile_full_page,
            desktop_viewport: config.desktop_viewport,
        })
    }

    /// Viewport query pairs for one profile.
    fn profile_params(&self, profile: ViewportProfile) -> Vec<(&'static str, String)> {
        match profile {
            ViewportProfile::Mobile => vec![
                ("viewport_device", self.mobile_device.clone()),
                ("full_page", self.mobile_full_page.to_string()),
            ],
            ViewportProfile::Desktop => vec![
                ("viewport_width", self.desktop_viewport.width.to_string()),
                ("viewport_height", self.desktop_viewport.height.to_string()),
            ],
        }
    }

    /// Build the full capture URL for one profile.
    ///
    /// The query serializer percent-encodes the target, so it is safe to pass
    /// URLs containing their own query strings.
    pub fn request_url(&self, target: &Url, profile: ViewportProfile) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("access_key", &self.access_key);
            query.append_pair("url", target.as_str());
            for (key, value) in self.profile_params(profile) {
                query.append_pair(key, &value);
            }
        }
        url
    }

    /// Fetch one screenshot for the given profile.
    ///
    /// Any non-success status and any transport failure collapse into
    /// [`Error::Fetch`]; the distinction is kept only in the debug log.
    pub async fn take(&self, target: &Url, profile: ViewportProfile) -> Result<Vec<u8>> {
        let request_url = self.request_url(target, profile);
        // Log the target, not the request URL: the key lives in the query string
        log::debug!("capturing {} ({} profile)", target, profile);

        let response = self
            .http
            .get(request_url)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("{} request failed: {}", profile, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!("{} capture returned {}", profile, status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::fetch(format!("{} body read failed: {}", profile, e)))?;

        log::debug!("{} capture: {} bytes", profile, bytes.len());
        Ok(bytes.to_vec())
    }

    /// Capture the mobile/desktop pair concurrently.
    ///
    /// Both requests are issued before either is awaited; either failure fails
    /// the pair and no partial result is surfaced.
    pub async fn take_pair(&self, target: &Url) -> Result<(Vec<u8>, Vec<u8>)> {
        futures::try_join!(
            self.take(target, ViewportProfile::Mobile),
            self.take(target, ViewportProfile::Desktop),
        )
    }

    /// Forward a pre-built set of query pairs to the capture endpoint with
    /// this client's access key. Used by the relay, which re-signs requests
    /// that arrive without a key.
    pub async fn forward(&self, params: &[(String, String)]) -> Result<Vec<u8>> {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("access_key", &self.access_key);
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("forwarded request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!("upstream returned {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::fetch(format!("forwarded body read failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
