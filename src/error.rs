//! Error types for paired screenshot capture

use thiserror::Error;

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a capture submission
///
/// The two user-facing kinds carry fixed display strings: validation failures
/// render as `Please enter a valid URL` and any post-validation failure as
/// `Failed to fetch screenshots`. The underlying cause of a fetch failure is
/// kept in `reason` for debug logging and is never shown to the user.
#[derive(Error, Debug)]
pub enum Error {
    /// Input did not parse as an absolute http(s) URL
    #[error("Please enter a valid URL")]
    InvalidUrl,

    /// A capture request failed: non-success status or transport failure
    #[error("Failed to fetch screenshots")]
    Fetch { reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Filesystem failure while materializing an image handle
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a fetch error, preserving the cause for diagnostics only.
    pub fn fetch(reason: impl Into<String>) -> Self {
        Error::Fetch {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages_are_fixed() {
        assert_eq!(Error::InvalidUrl.to_string(), "Please enter a valid URL");
        assert_eq!(
            Error::fetch("mobile returned 500").to_string(),
            "Failed to fetch screenshots"
        );
    }
}
