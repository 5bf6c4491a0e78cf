//! Widget configuration.
//!
//! A [`Config`] is assembled once per activation from three layers, lowest
//! precedence first:
//!
//! ```text
//! Config::default()          built-in defaults
//!   .merge(&overrides)       caller options (TOML file / struct literal)
//!   + home_url, lang         injected from the page
//!   .apply_attributes(..)    data-* attributes on the mount element
//! ```
//!
//! Attribute values arrive as strings and are decoded with
//! [`normalize_data`] before being coerced to the field they target.  A value
//! that does not fit its field is logged and ignored, never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

pub const DEFAULT_TEMPLATE: &str = r#"<a class="related-item" href="{postUrl}"><div class="related-image"><img class="related-image-src" src="{featuredImage}" alt="thumbnail"></div><div class="related-title">{title}</div></a>"#;

pub const DEFAULT_TEXT_ONLY_TEMPLATE: &str =
    r#"<a class="related-item" href="{postUrl}"><div class="related-title">{title}</div></a>"#;

// ---------------------------------------------------------------------------
// Attribute decoding
// ---------------------------------------------------------------------------

/// A `data-*` attribute value after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Decode an attribute string: `true`/`false`/`null` become their typed
/// values, numeric strings become numbers, an empty string is null, and
/// anything else is kept as (trimmed) text.
pub fn normalize_data(value: &str) -> AttrValue {
    let trimmed = value.trim();
    match trimmed {
        "true" => return AttrValue::Bool(true),
        "false" => return AttrValue::Bool(false),
        "null" | "" => return AttrValue::Null,
        _ => {}
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => AttrValue::Number(n),
        _ => AttrValue::Text(trimmed.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Enumerated options
// ---------------------------------------------------------------------------

/// Feed detail level, the `{directory}` path segment of the feed URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Directory {
    #[default]
    Summary,
    Default,
    Full,
}

impl Directory {
    /// Parse a directory name; anything unrecognised is `Summary`.
    pub fn lenient(name: &str) -> Self {
        match name.trim() {
            "default" => Directory::Default,
            "full" => Directory::Full,
            _ => Directory::Summary,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Directory::Summary => "summary",
            Directory::Default => "default",
            Directory::Full => "full",
        }
    }
}

impl From<String> for Directory {
    fn from(name: String) -> Self {
        Directory::lenient(&name)
    }
}

impl From<Directory> for String {
    fn from(dir: Directory) -> Self {
        dir.as_str().to_string()
    }
}

/// Feed ordering, the `orderby` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Relevance,
    Published,
    Updated,
}

impl OrderBy {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "relevance" => Some(OrderBy::Relevance),
            "published" => Some(OrderBy::Published),
            "updated" => Some(OrderBy::Updated),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderBy::Relevance => "relevance",
            OrderBy::Published => "published",
            OrderBy::Updated => "updated",
        }
    }
}

/// Labels used to filter the feed.
///
/// Callers pass a typed list.  A `data-tags` attribute carries the list as a
/// JSON string (`'["news","rust"]'`); that form is kept verbatim and only
/// decoded when the feed query is built, so a malformed value surfaces as an
/// [`Error::Tags`] from the fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tags {
    List(Vec<String>),
    Encoded(String),
}

impl Default for Tags {
    fn default() -> Self {
        Tags::List(Vec::new())
    }
}

impl Tags {
    pub fn labels(&self) -> Result<Vec<String>> {
        match self {
            Tags::List(list) => Ok(list.clone()),
            Tags::Encoded(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Tags::Encoded(raw) => serde_json::from_str(raw).map_err(|source| Error::Tags {
                raw: raw.clone(),
                source,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Fully resolved widget configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Selector of the mount element.
    pub related_selector: String,
    /// Template used when a post has a featured image.
    pub template: String,
    /// Template used when it does not.
    pub text_only_template: String,
    /// Image used when a post has neither a thumbnail nor an inline `<img>`.
    pub default_image: String,
    pub directory: Directory,
    /// Blogger image size parameter, e.g. `w300-h225-p-k-no-nu`.
    pub image_params: String,
    /// Number of posts to render.  Always at least 1.
    pub max_results: usize,
    /// Whether the host should wait for the mount element to become visible.
    pub observer: bool,
    pub orderby: OrderBy,
    /// Id of the post the widget is shown on.
    pub post_id: String,
    /// Margin handed to the host's visibility observer.
    pub root_margin: String,
    /// Extra entries fetched so the current post can be dropped and the rest
    /// shuffled.  Zero disables both.
    pub shuffle_level: usize,
    /// Summary length in characters; zero or negative yields no summary.
    pub summary_length: i64,
    pub tags: Tags,
    /// YouTube thumbnail name, e.g. `mqdefault`.
    pub yt_thumbnail: String,
    /// Query by words of [`Config::title`] when no tags are configured.
    pub query_by_title: bool,
    /// Title of the post the widget is shown on.
    pub title: String,
    /// Blog origin the feed is requested from.
    pub home_url: String,
    /// Document language, used to format dates.
    pub lang: String,
    /// Attributes with no matching option, kept as decoded.
    pub extra: BTreeMap<String, AttrValue>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            related_selector: "#blog-related".into(),
            template: DEFAULT_TEMPLATE.into(),
            text_only_template: DEFAULT_TEXT_ONLY_TEMPLATE.into(),
            default_image: String::new(),
            directory: Directory::Summary,
            image_params: "w300-h225-p-k-no-nu-rw-l80-e30".into(),
            max_results: 5,
            observer: true,
            orderby: OrderBy::Relevance,
            post_id: String::new(),
            root_margin: "200px".into(),
            shuffle_level: 5,
            summary_length: 120,
            tags: Tags::default(),
            yt_thumbnail: "mqdefault".into(),
            query_by_title: false,
            title: String::new(),
            home_url: String::new(),
            lang: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// Caller-supplied options.  Every field is optional; `None` keeps the
/// default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Overrides {
    pub related_selector: Option<String>,
    pub template: Option<String>,
    pub text_only_template: Option<String>,
    pub default_image: Option<String>,
    pub directory: Option<Directory>,
    pub image_params: Option<String>,
    pub max_results: Option<usize>,
    pub observer: Option<bool>,
    pub orderby: Option<OrderBy>,
    pub post_id: Option<String>,
    pub root_margin: Option<String>,
    pub shuffle_level: Option<usize>,
    pub summary_length: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub yt_thumbnail: Option<String>,
    pub query_by_title: Option<bool>,
    pub title: Option<String>,
}

impl Overrides {
    /// Parse caller options from a TOML document.
    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

impl Config {
    /// Resolve the final configuration for one activation.
    pub fn resolve(
        overrides: &Overrides,
        attributes: &BTreeMap<String, String>,
        home_url: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        let mut config = Config::default().merge(overrides);
        config.home_url = home_url.into();
        config.lang = lang.into();
        config.apply_attributes(attributes);
        config
    }

    /// Layer caller options over `self`.
    pub fn merge(mut self, o: &Overrides) -> Self {
        fn set<T: Clone>(field: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *field = v.clone();
            }
        }

        set(&mut self.related_selector, &o.related_selector);
        set(&mut self.template, &o.template);
        set(&mut self.text_only_template, &o.text_only_template);
        set(&mut self.default_image, &o.default_image);
        set(&mut self.directory, &o.directory);
        set(&mut self.image_params, &o.image_params);
        set(&mut self.max_results, &o.max_results);
        set(&mut self.observer, &o.observer);
        set(&mut self.orderby, &o.orderby);
        set(&mut self.post_id, &o.post_id);
        set(&mut self.root_margin, &o.root_margin);
        set(&mut self.shuffle_level, &o.shuffle_level);
        set(&mut self.summary_length, &o.summary_length);
        set(&mut self.yt_thumbnail, &o.yt_thumbnail);
        set(&mut self.query_by_title, &o.query_by_title);
        set(&mut self.title, &o.title);
        if let Some(tags) = &o.tags {
            self.tags = Tags::List(tags.clone());
        }
        self.max_results = self.max_results.max(1);
        self
    }

    /// Layer `data-*` attributes (dataset-keyed) over `self`.
    pub fn apply_attributes(&mut self, attributes: &BTreeMap<String, String>) {
        for (key, raw) in attributes {
            self.apply_attribute(key, raw);
        }
        self.max_results = self.max_results.max(1);
    }

    fn apply_attribute(&mut self, key: &str, raw: &str) {
        let value = normalize_data(raw);
        // String options take the raw text so that numeric-looking values
        // (long post ids in particular) are not rounded through f64.
        let text = match value {
            AttrValue::Null => String::new(),
            _ => raw.trim().to_string(),
        };

        match key {
            "relatedSelector" => self.related_selector = text,
            "template" => self.template = text,
            "textOnlyTemplate" => self.text_only_template = text,
            "defaultImage" => self.default_image = text,
            "imageParams" => self.image_params = text,
            "postId" => self.post_id = text,
            "rootMargin" => self.root_margin = text,
            "ytThumbnail" => self.yt_thumbnail = text,
            "title" => self.title = text,
            "homeUrl" => self.home_url = text,
            "lang" => self.lang = text,
            "directory" => self.directory = Directory::lenient(&text),
            "orderby" => match OrderBy::parse(&text) {
                Some(order) => self.orderby = order,
                None => warn!(value = %text, "ignoring unsupported orderby attribute"),
            },
            "tags" => {
                self.tags = match value {
                    AttrValue::Null => Tags::default(),
                    _ => Tags::Encoded(text),
                }
            }
            "maxResults" => match as_count(&value) {
                Some(n) => self.max_results = n,
                None => warn!(value = %raw, "ignoring non-numeric maxResults attribute"),
            },
            "shuffleLevel" => match as_count(&value) {
                Some(n) => self.shuffle_level = n,
                None => warn!(value = %raw, "ignoring non-numeric shuffleLevel attribute"),
            },
            "summaryLength" => match value {
                AttrValue::Number(n) => self.summary_length = n as i64,
                AttrValue::Null | AttrValue::Bool(false) => self.summary_length = 0,
                _ => warn!(value = %raw, "ignoring non-numeric summaryLength attribute"),
            },
            "observer" => match as_flag(&value) {
                Some(b) => self.observer = b,
                None => warn!(value = %raw, "ignoring non-boolean observer attribute"),
            },
            "queryByTitle" => match as_flag(&value) {
                Some(b) => self.query_by_title = b,
                None => warn!(value = %raw, "ignoring non-boolean queryByTitle attribute"),
            },
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }
}

fn as_count(value: &AttrValue) -> Option<usize> {
    match value {
        AttrValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
        AttrValue::Null | AttrValue::Bool(false) => Some(0),
        _ => None,
    }
}

fn as_flag(value: &AttrValue) -> Option<bool> {
    match value {
        AttrValue::Bool(b) => Some(*b),
        AttrValue::Number(n) => Some(*n != 0.0),
        AttrValue::Null => Some(false),
        AttrValue::Text(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
