/// Longest identifier accepted before asking the API whether it exists
const MAX_ID_LEN: usize = 50;

/// Syntactic check for YouTube video and playlist IDs
///
/// Accepts 1 to 50 characters from `[A-Za-z0-9_-]`. Existence is checked
/// separately against the metadata provider.
pub fn is_plausible_youtube_id(candidate: &str) -> bool {
    (1..=MAX_ID_LEN).contains(&candidate.len())
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
