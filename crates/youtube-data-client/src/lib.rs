//! Rust client for the subset of the YouTube Data API v3 needed to turn
//! playlists into podcast feeds.
//!
//! # Example
//!
//! ```no_run
//! use youtube_data_client::YoutubeClient;
//!
//! # async fn example() -> Result<(), youtube_data_client::YoutubeError> {
//! let client = YoutubeClient::new("api-key");
//!
//! if let Some(playlist) = client.get_playlist("PLxyz").await? {
//!     println!("{}", playlist.snippet.title);
//!     for item in client.list_playlist_items(&playlist.id).await? {
//!         println!("{}", item.snippet.resource_id.video_id);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - `GET /playlists?part=snippet` - Playlist details
//! - `GET /channels?part=snippet` - Channel details
//! - `GET /playlistItems?part=snippet,status` - All items of a playlist, following pagination
//! - `GET /videos?part=id` - Video existence check

mod client;
mod error;
mod types;

pub use client::YoutubeClient;
pub use error::{Result, YoutubeError};
pub use types::{
    Channel, ChannelSnippet, ListResponse, Playlist, PlaylistItem, PlaylistItemSnippet,
    PlaylistItemStatus, PlaylistSnippet, ResourceId, Thumbnail, Thumbnails, Video,
};
