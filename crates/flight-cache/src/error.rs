//! Error types for cache computations and coordinated downloads

use std::fmt;
use std::sync::Arc;

/// Failure of a [`FlightCache`](crate::FlightCache) computation
///
/// The compute error is shared between every caller that was waiting on the
/// same key, hence the `Arc`.
#[derive(Debug)]
pub enum FlightError<E> {
    /// The computation itself returned an error
    Compute(Arc<E>),
    /// The task running the computation panicked or was aborted
    Join(tokio::task::JoinError),
}

impl<E: fmt::Display> fmt::Display for FlightError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compute(e) => write!(f, "{}", e),
            Self::Join(e) => write!(f, "Computation task failed: {}", e),
        }
    }
}

impl<E> std::error::Error for FlightError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Compute(e) => Some(e.as_ref()),
            Self::Join(e) => Some(e),
        }
    }
}

/// Failure of a [`DownloadCoordinator`](crate::DownloadCoordinator) fetch
#[derive(Debug)]
pub enum DownloadError<E> {
    /// The download function returned an error
    Download(E),
    /// The download function reported success but the resource is still absent
    Missing(String),
    /// The task running the download panicked or was aborted
    Join(tokio::task::JoinError),
}

impl<E: fmt::Display> fmt::Display for DownloadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download(e) => write!(f, "Download failed: {}", e),
            Self::Missing(id) => write!(f, "Download of {} produced no resource", id),
            Self::Join(e) => write!(f, "Download task failed: {}", e),
        }
    }
}

impl<E> std::error::Error for DownloadError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Download(e) => Some(e),
            Self::Missing(_) => None,
            Self::Join(e) => Some(e),
        }
    }
}
