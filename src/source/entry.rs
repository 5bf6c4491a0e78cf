//! Raw Blogger feed entries.
//!
//! These types mirror the GData JSON the Blogger feed returns
//! (`?alt=json`), where text nodes are objects with a `$t` member and
//! namespaced elements use `$` in place of `:` (`gd$image`,
//! `media$thumbnail`).
//!
//! Nothing in the feed is guaranteed to be present, so every field is an
//! `Option`.  Entries are parsed once and never mutated; the sanitizer reads
//! them through the accessor methods below, which all fall back to `""`.

use serde::Deserialize;

/// A GData text node: `{"$t": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Text {
    #[serde(rename = "$t", default)]
    pub t: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub rel: Option<String>,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Image {
    pub src: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub name: Option<Text>,
    pub uri: Option<Text>,
    #[serde(rename = "gd$image")]
    pub image: Option<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Thumbnail {
    pub url: Option<String>,
}

/// One post as returned by the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Entry {
    pub id: Option<Text>,
    pub title: Option<Text>,
    pub published: Option<Text>,
    pub content: Option<Text>,
    pub summary: Option<Text>,
    pub link: Option<Vec<Link>>,
    pub author: Option<Vec<Author>>,
    #[serde(rename = "media$thumbnail")]
    pub thumbnail: Option<Thumbnail>,
}

fn text(node: &Option<Text>) -> &str {
    node.as_ref()
        .and_then(|n| n.t.as_deref())
        .unwrap_or_default()
}

impl Entry {
    /// Post id: the part of `tag:blogger.com,1999:blog-1.post-2` after
    /// `.post-`, or `""`.
    pub fn post_id(&self) -> &str {
        text(&self.id)
            .split_once(".post-")
            .map(|(_, id)| id)
            .unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        text(&self.title)
    }

    pub fn published(&self) -> &str {
        text(&self.published)
    }

    /// Full content if present, else the summary, else `""`.
    pub fn body(&self) -> &str {
        let content = text(&self.content);
        if !content.is_empty() {
            return content;
        }
        text(&self.summary)
    }

    /// `href` of the first `rel="alternate"` link.
    pub fn alternate_link(&self) -> Option<&str> {
        self.link
            .iter()
            .flatten()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .and_then(|l| l.href.as_deref())
    }

    pub fn first_author(&self) -> Option<&Author> {
        self.author.as_ref().and_then(|a| a.first())
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail
            .as_ref()
            .and_then(|t| t.url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

impl Author {
    pub fn name(&self) -> &str {
        text(&self.name)
    }

    pub fn uri(&self) -> &str {
        text(&self.uri)
    }

    pub fn image_src(&self) -> &str {
        self.image
            .as_ref()
            .and_then(|i| i.src.as_deref())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
