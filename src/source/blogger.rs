//! Blogger JSON feed client.
//!
//! Builds the `/feeds/posts/{directory}` query for a configuration, performs
//! one GET through a [`Transport`], and returns the raw entries.  There is no
//! retry; any failure goes straight back to the caller.

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::{Entry, Transport};
use crate::config::Config;
use crate::error::{Error, Result};

/// Titles words must be longer than this to be used in a title query.
const MIN_TITLE_WORD: usize = 4;

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    feed: Option<Feed>,
}

#[derive(Debug, Default, Deserialize)]
struct Feed {
    entry: Option<Vec<Entry>>,
}

/// The Blogger feed of one blog, fetched through `T`.
pub struct BloggerFeed<T> {
    transport: T,
}

impl<T: Transport> BloggerFeed<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetch up to `max_results + shuffle_level` entries matching `config`.
    ///
    /// An empty feed is `Ok(vec![])`.
    pub async fn fetch_posts(&self, config: &Config) -> Result<Vec<Entry>> {
        let url = feed_url(config)?;
        debug!(%url, "requesting feed");
        let body = self.transport.fetch(&url).await?;
        let entries = parse_feed(&body)?;
        info!(count = entries.len(), "feed returned entries");
        Ok(entries)
    }
}

/// Build the feed request URL for `config`.
///
/// ```text
/// {home_url}/feeds/posts/{directory}?alt=json&max-results=N&orderby=O[&q=...]
/// ```
///
/// The `q` clause is a label OR-query when tags are configured, otherwise a
/// title-word OR-query when `query_by_title` is set, otherwise absent.
pub fn feed_url(config: &Config) -> Result<Url> {
    let root = format!(
        "{}/feeds/posts/{}",
        config.home_url.trim_end_matches('/'),
        config.directory.as_str()
    );
    let mut url = Url::parse(&root).map_err(|source| Error::Url {
        url: config.home_url.clone(),
        source,
    })?;

    let total = config.max_results.saturating_add(config.shuffle_level);
    let query = label_query(&config.tags.labels()?).or_else(|| {
        config
            .query_by_title
            .then(|| title_query(&config.title))
            .flatten()
    });

    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("alt", "json")
            .append_pair("max-results", &total.to_string())
            .append_pair("orderby", config.orderby.as_str());
        if let Some(q) = &query {
            pairs.append_pair("q", q);
        }
    }

    Ok(url)
}

/// `label:"a"|label:"b"`, or `None` for no labels.
fn label_query(labels: &[String]) -> Option<String> {
    if labels.is_empty() {
        return None;
    }
    Some(
        labels
            .iter()
            .map(|label| format!("label:\"{label}\""))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

/// OR-query of the distinct words of `title` longer than four characters.
pub fn title_query(title: &str) -> Option<String> {
    let mut words: Vec<String> = Vec::new();
    for word in title.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() <= MIN_TITLE_WORD {
            continue;
        }
        let word = word.to_lowercase();
        if !words.contains(&word) {
            words.push(word);
        }
    }
    (!words.is_empty()).then(|| words.join("|"))
}

/// Parse a feed response body into its entries.
pub fn parse_feed(body: &str) -> Result<Vec<Entry>> {
    let envelope: Envelope = serde_json::from_str(body)?;
    Ok(envelope
        .feed
        .and_then(|feed| feed.entry)
        .unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
