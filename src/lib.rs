//! Shotpair
//!
//! A small client for a third-party screenshot-rendering API that captures a
//! target URL twice, once with a mobile viewport profile and once with a
//! desktop viewport, and hands back the two images as releasable file-backed
//! handles.
//!
//! # Features
//!
//! - **Paired capture**: both requests are issued concurrently and joined;
//!   either failure fails the pair
//! - **Superseding submissions**: a newer submission silently discards results
//!   from older in-flight ones
//! - **Credential relay** (default): an HTTP relay that keeps the access key
//!   server-side and forwards only the target URL and viewport selection
//!
//! # Example
//!
//! ```no_run
//! use shotpair::{CaptureConfig, Session};
//!
//! # async fn run() -> shotpair::Result<()> {
//! let config = CaptureConfig::from_env();
//! let mut session = Session::new(&config, std::env::temp_dir())?;
//! session.submit("https://example.com").await;
//! println!("{}", shotpair::render::render(session.state()));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

use url::Url;

pub mod error;
pub use error::{Error, Result};

pub mod client;
pub use client::ScreenshotClient;

pub mod handle;
pub use handle::ImageHandle;

pub mod session;
pub use session::{Session, Submission, ViewState};

pub mod render;

// Credential relay: holds the access key server-side (feature-gated)
#[cfg(feature = "relay")]
pub mod relay;

/// Default capture endpoint of the remote rendering service.
pub const DEFAULT_ENDPOINT: &str = "https://api.screenshotone.com/take";

/// Environment variable holding the service access key.
pub const ACCESS_KEY_VAR: &str = "SCREENSHOTONE_ACCESS_KEY";

/// Device name sent for the mobile viewport profile.
pub const MOBILE_DEVICE: &str = "iphone_12_pro_max";

/// Configuration for paired screenshot capture
///
/// Defaults are chosen to match the remote service's expectations: the mobile
/// profile emulates a recent phone with full-page capture enabled, and the
/// desktop profile uses a fixed 1440×900 viewport.
///
/// # Examples
///
/// ```
/// let cfg = shotpair::CaptureConfig::default();
/// assert_eq!(cfg.desktop_viewport.width, 1440);
/// assert!(cfg.mobile_full_page);
/// ```
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Capture endpoint of the rendering service (or of a relay)
    pub endpoint: String,
    /// Access key sent as a query parameter; may be empty, in which case the
    /// remote service rejects the request and the failure surfaces as the
    /// generic fetch error
    pub access_key: String,
    /// Device emulated for the mobile profile
    pub mobile_device: String,
    /// Whether the mobile profile captures the full page height
    pub mobile_full_page: bool,
    /// Viewport dimensions for the desktop profile
    pub desktop_viewport: Viewport,
    /// Timeout per capture request in milliseconds
    pub timeout_ms: u64,
    /// User agent string sent with capture requests
    pub user_agent: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_key: String::new(),
            mobile_device: MOBILE_DEVICE.to_string(),
            mobile_full_page: true,
            desktop_viewport: Viewport::default(),
            timeout_ms: 30000,
            user_agent: format!("shotpair/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CaptureConfig {
    /// Build a config with the access key sourced from [`ACCESS_KEY_VAR`].
    ///
    /// An unset variable yields an empty key; requests are still sent and the
    /// remote rejection surfaces as a fetch error.
    pub fn from_env() -> Self {
        Self {
            access_key: std::env::var(ACCESS_KEY_VAR).unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440,
            height: 900,
        }
    }
}

/// The two capture profiles sent to the rendering service.
///
/// `Mobile` emulates a phone device with full-page capture; `Desktop` uses an
/// explicit fixed-size viewport. The profile determines only the viewport
/// query parameters of the request; everything else is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportProfile {
    Mobile,
    Desktop,
}

impl ViewportProfile {
    /// File stem used when naming an image produced for this profile.
    pub fn file_stem(self) -> &'static str {
        match self {
            ViewportProfile::Mobile => "mobile",
            ViewportProfile::Desktop => "desktop",
        }
    }
}

impl fmt::Display for ViewportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

impl FromStr for ViewportProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mobile" => Ok(ViewportProfile::Mobile),
            "desktop" => Ok(ViewportProfile::Desktop),
            other => Err(Error::Config(format!("unknown profile: {}", other))),
        }
    }
}

/// Parse a user-supplied capture target.
///
/// Accepts absolute `http`/`https` URLs with a host; anything else is
/// rejected, including strings the URL parser technically accepts under
/// other schemes. Never panics on malformed input.
pub fn parse_target(input: &str) -> Option<Url> {
    let url = Url::parse(input).ok()?;
    match url.scheme() {
        "http" | "https" => url.has_host().then_some(url),
        _ => None,
    }
}

/// Whether the input is a well-formed capture target.
pub fn is_valid_url(input: &str) -> bool {
    parse_target(input).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.desktop_viewport.width, 1440);
        assert_eq!(config.desktop_viewport.height, 900);
        assert_eq!(config.mobile_device, "iphone_12_pro_max");
        assert!(config.mobile_full_page);
        assert!(config.access_key.is_empty());
    }

    #[test]
    fn test_valid_targets() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("https://www.example.com"));
        assert!(is_valid_url("http://localhost:8080/path?q=1"));
    }

    #[test]
    fn test_invalid_targets() {
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("not-a-url"));
        assert!(!is_valid_url("ftp:/broken"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("https://"));
    }

    #[test]
    fn test_profile_round_trip() {
        assert_eq!(
            "mobile".parse::<ViewportProfile>().unwrap(),
            ViewportProfile::Mobile
        );
        assert_eq!(
            "desktop".parse::<ViewportProfile>().unwrap(),
            ViewportProfile::Desktop
        );
        assert!("tablet".parse::<ViewportProfile>().is_err());
        assert_eq!(ViewportProfile::Mobile.to_string(), "mobile");
    }
}
