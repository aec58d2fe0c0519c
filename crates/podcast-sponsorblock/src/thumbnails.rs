//! Locally stored podcast artwork

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::warn;

/// Image files in one directory, looked up by file stem or alias
pub struct ThumbnailStore {
    dir: PathBuf,
    /// Lower-cased alias name → playlist ID
    aliases: HashMap<String, String>,
}

impl ThumbnailStore {
    pub fn new(dir: PathBuf, aliases: HashMap<String, String>) -> Self {
        Self { dir, aliases }
    }

    /// Lower-cased stems that identify `key`: the key itself, the target of an
    /// alias named `key`, and the name of any alias targeting `key`
    fn candidate_stems(&self, key: &str) -> Vec<String> {
        let mut stems = vec![key.to_lowercase()];
        for (alias, target) in &self.aliases {
            if key.eq_ignore_ascii_case(alias) {
                stems.push(target.to_lowercase());
            } else if key.eq_ignore_ascii_case(target) {
                stems.push(alias.to_lowercase());
            }
        }
        stems
    }

    /// Path of the first regular file whose stem matches `key`
    pub async fn find(&self, key: &str) -> Option<PathBuf> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(dir = ?self.dir, error = %e, "Failed to read thumbnail directory");
                return None;
            }
        };

        let stems = self.candidate_stems(key);
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => return None,
                Err(e) => {
                    warn!(dir = ?self.dir, error = %e, "Failed to list thumbnail directory");
                    return None;
                }
            };

            let path = entry.path();
            let matches = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stems.contains(&stem.to_lowercase()));
            if !matches {
                continue;
            }
            if entry.file_type().await.is_ok_and(|t| t.is_file()) {
                return Some(path);
            }
        }
    }
}
