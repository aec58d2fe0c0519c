//! Audio downloads with sponsor segments removed

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use flight_cache::{DownloadCoordinator, DownloadError};
use tokio::process::Command;
use tracing::{info, warn};

use crate::keys::DownloadKey;
use crate::links::AUDIO_EXTENSION;

#[derive(Debug)]
pub enum FetchError {
    /// The downloader could not be started or its output could not be moved
    Io(std::io::Error),
    /// The downloader ran and reported failure
    Failed { code: Option<i32>, stderr: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Failed { code, stderr } => match code {
                Some(code) => write!(f, "Downloader exited with {}: {}", code, stderr.trim()),
                None => write!(f, "Downloader was terminated: {}", stderr.trim()),
            },
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Failed { .. } => None,
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Downloads a video's audio track to a file, cutting the given segment categories
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn download(
        &self,
        video_id: &str,
        output_path: &Path,
        categories_to_remove: &[String],
    ) -> Result<(), FetchError>;
}

/// Runs `yt-dlp` with SponsorBlock segment removal
pub struct YtDlpFetcher {
    program: String,
}

impl YtDlpFetcher {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

/// yt-dlp reads `--output` as a template; literal `%` must be doubled
fn output_template(path: &Path) -> String {
    path.to_string_lossy().replace('%', "%%")
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn download(
        &self,
        video_id: &str,
        output_path: &Path,
        categories_to_remove: &[String],
    ) -> Result<(), FetchError> {
        let output = Command::new(&self.program)
            .arg("--quiet")
            .arg("--no-playlist")
            .args(["--format", "bestaudio[ext=m4a]"])
            .arg("--sponsorblock-remove")
            .arg(categories_to_remove.join(","))
            .arg("--output")
            .arg(output_template(output_path))
            .arg(format!("https://www.youtube.com/watch?v={}", video_id))
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(FetchError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

/// Downloaded audio files, one per video, materialized on first request
pub struct AudioLibrary {
    dir: PathBuf,
    fetcher: Arc<dyn MediaFetcher>,
    coordinator: DownloadCoordinator,
    categories_to_remove: Arc<Vec<String>>,
}

impl AudioLibrary {
    pub fn new(
        dir: PathBuf,
        fetcher: Arc<dyn MediaFetcher>,
        categories_to_remove: Vec<String>,
    ) -> Self {
        Self {
            dir,
            fetcher,
            coordinator: DownloadCoordinator::new(),
            categories_to_remove: Arc::new(categories_to_remove),
        }
    }

    /// Final location of a video's audio
    pub fn audio_path(&self, key: &DownloadKey) -> PathBuf {
        self.dir.join(format!("{}{}", key.as_str(), AUDIO_EXTENSION))
    }

    /// Where the downloader writes before the file is renamed into place
    fn partial_path(&self, key: &DownloadKey) -> PathBuf {
        self.dir
            .join(format!("{}.partial{}", key.as_str(), AUDIO_EXTENSION))
    }

    /// Number of downloads currently holding or waiting on a guard
    pub fn active_downloads(&self) -> usize {
        self.coordinator.active_guards()
    }

    /// Path of the finished audio for `key`, downloading it on first request
    pub async fn fetch_or_download(
        &self,
        key: &DownloadKey,
    ) -> Result<PathBuf, DownloadError<FetchError>> {
        let final_path = self.audio_path(key);
        let partial_path = self.partial_path(key);
        let dir = self.dir.clone();
        let fetcher = self.fetcher.clone();
        let categories = self.categories_to_remove.clone();
        let video_id = key.as_str().to_string();

        let exists = {
            let final_path = final_path.clone();
            move || {
                let final_path = final_path.clone();
                async move {
                    match tokio::fs::metadata(&final_path).await {
                        Ok(meta) if meta.is_file() => Some(final_path),
                        _ => None,
                    }
                }
            }
        };

        let download = move || async move {
            tokio::fs::create_dir_all(&dir).await?;

            let result = fetcher
                .download(&video_id, &partial_path, &categories)
                .await;
            if let Err(e) = result {
                if let Err(cleanup) = tokio::fs::remove_file(&partial_path).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!(video_id = %video_id, error = %cleanup, "Failed to remove partial download");
                    }
                }
                return Err(e);
            }

            tokio::fs::rename(&partial_path, &final_path).await?;
            info!(video_id = %video_id, "Finished downloading audio");
            Ok::<(), FetchError>(())
        };

        self.coordinator
            .fetch_or_download(key.as_str(), exists, download)
            .await
    }
}
