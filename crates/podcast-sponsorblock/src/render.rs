//! Podcast RSS rendering

use std::fmt;

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use rss::extension::itunes::{
    ITunesCategoryBuilder, ITunesChannelExtensionBuilder, ITunesItemExtensionBuilder,
};
use rss::{ChannelBuilder, EnclosureBuilder, GuidBuilder, ImageBuilder, ItemBuilder};

use crate::links::Links;
use crate::models::{EpisodeDetails, FeedOptions, PlaylistIdentity};

const DEFAULT_DESCRIPTION: &str = "No description available";

#[derive(Debug)]
pub enum RenderError {
    Xml(rss::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml(e) => write!(f, "Failed to write feed XML: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Xml(e) => Some(e),
        }
    }
}

impl From<rss::Error> for RenderError {
    fn from(e: rss::Error) -> Self {
        Self::Xml(e)
    }
}

/// Podcast-level fields of a feed
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMetadata {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: String,
    pub image_url: Option<String>,
    pub language: Option<String>,
    pub explicit: Option<bool>,
    pub category: Option<String>,
    /// Artwork from the podcast's iTunes listing
    pub itunes_image: Option<String>,
}

/// One episode of a feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub guid: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub enclosure_url: String,
    pub enclosure_type: &'static str,
}

/// Serializes a feed to bytes
pub trait FeedWriter: Send + Sync {
    fn render(&self, channel: &ChannelMetadata, entries: &[FeedEntry])
        -> Result<Bytes, RenderError>;
}

/// Everything one feed document is rendered from
pub struct FeedRenderContext<'a> {
    pub playlist: &'a PlaylistIdentity,
    pub episodes: &'a [EpisodeDetails],
    pub logo_url: &'a str,
    pub options: &'a FeedOptions,
    pub artwork_url: Option<String>,
}

/// Map a render context to feed fields, making resource links absolute for
/// the requesting host
pub fn build_feed(ctx: &FeedRenderContext<'_>, links: &Links) -> (ChannelMetadata, Vec<FeedEntry>) {
    let host = ctx.options.host.as_str();
    let overrides = ctx.options.overrides.as_ref();

    let description = overrides
        .and_then(|o| o.description.clone())
        .filter(|d| !d.is_empty())
        .or_else(|| Some(ctx.playlist.description.clone()).filter(|d| !d.is_empty()))
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let channel = ChannelMetadata {
        title: ctx.playlist.title.clone(),
        link: format!("https://www.youtube.com/playlist?list={}", ctx.playlist.id),
        description,
        author: ctx.playlist.author.name.clone(),
        image_url: Some(links.absolute(ctx.logo_url, host)),
        language: overrides.and_then(|o| o.language.clone()),
        explicit: overrides.and_then(|o| o.explicit),
        category: overrides.and_then(|o| o.itunes_category.clone()),
        itunes_image: ctx.artwork_url.clone(),
    };

    let enclosure_type = if links.is_decorated() {
        "audio/x-m4a"
    } else {
        "audio/mp4"
    };

    let entries = ctx
        .episodes
        .iter()
        .map(|episode| FeedEntry {
            guid: episode.video_id.clone(),
            title: episode.title.clone(),
            description: episode.description.clone(),
            author: episode.author.name.clone(),
            image_url: episode.thumbnail_url.clone(),
            published_at: episode.published_at,
            enclosure_url: links.absolute(&links.media_path(&episode.video_id), host),
            enclosure_type,
        })
        .collect();

    (channel, entries)
}

/// Writes RSS 2.0 with the iTunes podcast extension
#[derive(Debug, Default)]
pub struct RssFeedWriter;

impl FeedWriter for RssFeedWriter {
    fn render(
        &self,
        channel: &ChannelMetadata,
        entries: &[FeedEntry],
    ) -> Result<Bytes, RenderError> {
        let items: Vec<rss::Item> = entries.iter().map(rss_item).collect();

        let categories = channel
            .category
            .iter()
            .map(|c| ITunesCategoryBuilder::default().text(sanitize_xml_text(c)).build())
            .collect::<Vec<_>>();

        let itunes = ITunesChannelExtensionBuilder::default()
            .author(sanitize_xml_text(&channel.author))
            .subtitle(sanitize_xml_text(&channel.description))
            .summary(sanitize_xml_text(&channel.description))
            .image(channel.itunes_image.clone().or_else(|| channel.image_url.clone()))
            .explicit(channel.explicit.map(|e| if e { "yes" } else { "no" }.to_string()))
            .categories(categories)
            .build();

        let image = channel.image_url.as_ref().map(|url| {
            ImageBuilder::default()
                .url(url.clone())
                .title(sanitize_xml_text(&channel.title))
                .link(channel.link.clone())
                .build()
        });

        let rss_channel = ChannelBuilder::default()
            .title(sanitize_xml_text(&channel.title))
            .link(channel.link.clone())
            .description(sanitize_xml_text(&channel.description))
            .language(channel.language.clone())
            .image(image)
            .itunes_ext(itunes)
            .items(items)
            .build();

        let buffer = rss_channel.write_to(Vec::new())?;
        Ok(Bytes::from(buffer))
    }
}

fn rss_item(entry: &FeedEntry) -> rss::Item {
    let guid = GuidBuilder::default()
        .value(entry.guid.clone())
        .permalink(false)
        .build();

    let enclosure = EnclosureBuilder::default()
        .url(entry.enclosure_url.clone())
        .length("0".to_string())
        .mime_type(entry.enclosure_type.to_string())
        .build();

    let itunes = ITunesItemExtensionBuilder::default()
        .author(sanitize_xml_text(&entry.author))
        .summary(sanitize_xml_text(&entry.description))
        .image(entry.image_url.clone())
        .build();

    ItemBuilder::default()
        .title(sanitize_xml_text(&entry.title))
        .description(sanitize_xml_text(&entry.description))
        .guid(guid)
        .pub_date(entry.published_at.to_rfc2822())
        .enclosure(enclosure)
        .itunes_ext(itunes)
        .build()
}

/// Drop characters that are not allowed anywhere in an XML 1.0 document
pub fn sanitize_xml_text(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c,
                '\t' | '\n' | '\r'
                | '\u{20}'..='\u{D7FF}'
                | '\u{E000}'..='\u{FFFD}'
                | '\u{10000}'..='\u{10FFFF}')
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PodcastOverrides;
    use crate::test_support::{episode, playlist};

    fn links() -> Links {
        Links::new(vec!["https://pod.example.com".to_string()], None)
    }

    fn render_with(options: FeedOptions, links: &Links) -> (ChannelMetadata, Vec<FeedEntry>) {
        let identity = playlist("PL1");
        let episodes = vec![episode("a", 1), episode("b", 2)];
        let ctx = FeedRenderContext {
            playlist: &identity,
            episodes: &episodes,
            logo_url: "/thumbnail/PL1",
            options: &options,
            artwork_url: None,
        };
        build_feed(&ctx, links)
    }

    #[test]
    fn test_links_are_absolute_for_trusted_host() {
        let options = FeedOptions {
            host: "pod.example.com".to_string(),
            overrides: None,
        };
        let (channel, entries) = render_with(options, &links());

        assert_eq!(
            channel.image_url.as_deref(),
            Some("https://pod.example.com/thumbnail/PL1")
        );
        assert_eq!(
            entries[0].enclosure_url,
            "https://pod.example.com/media/youtube/a.m4a"
        );
        assert_eq!(entries[0].enclosure_type, "audio/mp4");
        assert_eq!(channel.link, "https://www.youtube.com/playlist?list=PL1");
    }

    #[test]
    fn test_untrusted_host_keeps_links_relative() {
        let options = FeedOptions {
            host: "evil.test".to_string(),
            overrides: None,
        };
        let (channel, entries) = render_with(options, &links());

        assert_eq!(channel.image_url.as_deref(), Some("/thumbnail/PL1"));
        assert_eq!(entries[1].enclosure_url, "/media/youtube/b.m4a");
    }

    #[test]
    fn test_decorated_links_change_enclosure_type() {
        let links = Links::new(vec![], Some("k".to_string()));
        let (_, entries) = render_with(FeedOptions::default(), &links);

        assert_eq!(entries[0].enclosure_url, "/media/youtube/a.m4a?key=k");
        assert_eq!(entries[0].enclosure_type, "audio/x-m4a");
    }

    #[test]
    fn test_description_precedence() {
        let options = FeedOptions {
            host: String::new(),
            overrides: Some(PodcastOverrides {
                description: Some("From overrides".to_string()),
                language: Some("en".to_string()),
                ..Default::default()
            }),
        };
        let (channel, _) = render_with(options, &links());
        assert_eq!(channel.description, "From overrides");
        assert_eq!(channel.language.as_deref(), Some("en"));

        let mut identity = playlist("PL2");
        identity.description = String::new();
        let options = FeedOptions::default();
        let ctx = FeedRenderContext {
            playlist: &identity,
            episodes: &[],
            logo_url: "https://yt3.ggpht.com/x.jpg",
            options: &options,
            artwork_url: None,
        };
        let (channel, entries) = build_feed(&ctx, &links());
        assert_eq!(channel.description, DEFAULT_DESCRIPTION);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_rss_document() {
        let options = FeedOptions {
            host: String::new(),
            overrides: Some(PodcastOverrides {
                explicit: Some(false),
                itunes_category: Some("Technology".to_string()),
                ..Default::default()
            }),
        };
        let (mut channel, entries) = render_with(options, &links());
        channel.itunes_image = Some("https://is1.mzstatic.com/600x600.jpg".to_string());

        let bytes = RssFeedWriter.render(&channel, &entries).unwrap();
        let parsed = rss::Channel::read_from(&bytes[..]).unwrap();

        assert_eq!(parsed.title(), "Playlist PL1");
        assert_eq!(parsed.items().len(), 2);

        let item = &parsed.items()[0];
        let guid = item.guid().unwrap();
        assert_eq!(guid.value(), "a");
        assert!(!guid.is_permalink());
        let enclosure = item.enclosure().unwrap();
        assert_eq!(enclosure.url(), "/media/youtube/a.m4a");
        assert_eq!(enclosure.length(), "0");
        assert_eq!(item.pub_date(), Some(entries[0].published_at.to_rfc2822().as_str()));

        let itunes = parsed.itunes_ext().unwrap();
        assert_eq!(itunes.explicit(), Some("no"));
        assert_eq!(itunes.image(), Some("https://is1.mzstatic.com/600x600.jpg"));
        assert_eq!(itunes.categories()[0].text(), "Technology");
    }

    #[test]
    fn test_sanitize_xml_text() {
        assert_eq!(sanitize_xml_text("a\u{0}b\u{1b}c\td"), "abc\td");
        assert_eq!(sanitize_xml_text("émoji 🎙"), "émoji 🎙");
        assert_eq!(sanitize_xml_text("\u{FFFE}"), "");
    }
}
