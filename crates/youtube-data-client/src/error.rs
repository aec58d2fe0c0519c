//! Error types for the YouTube Data API client

use std::fmt;

/// Errors that can occur when talking to the YouTube Data API
#[derive(Debug)]
pub enum YoutubeError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// The API answered with a non-success status
    Api { status: u16, message: String },
    /// A request URL could not be built
    Url(url::ParseError),
}

impl fmt::Display for YoutubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "YouTube HTTP error: {}", e),
            Self::Api { status, message } => {
                write!(f, "YouTube API returned status {}: {}", status, message)
            }
            Self::Url(e) => write!(f, "Invalid YouTube API URL: {}", e),
        }
    }
}

impl std::error::Error for YoutubeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Url(e) => Some(e),
            Self::Api { .. } => None,
        }
    }
}

impl From<reqwest::Error> for YoutubeError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<url::ParseError> for YoutubeError {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e)
    }
}

/// Result type for YouTube API operations
pub type Result<T> = std::result::Result<T, YoutubeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = YoutubeError::Api {
            status: 403,
            message: "quotaExceeded".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "YouTube API returned status 403: quotaExceeded"
        );
    }
}
