//! Entry sanitizer: raw feed [`Entry`] → flat [`Post`].
//!
//! Every field is extracted independently and degrades to an empty string,
//! so one malformed part of an entry never hides the rest of it.

use std::sync::LazyLock;

use chrono::{DateTime, Locale};
use regex::Regex;
use serde::Serialize;

use crate::config::Config;
use crate::image::{resize, ResizeParams};
use crate::page::Page;
use crate::source::Entry;

/// Blogger's stand-in avatars for authors without a profile picture.
const PLACEHOLDER_AVATARS: [&str; 2] = ["g/blank.gif", "g/b16-rounded.gif"];

/// Author name Blogger reports for deleted or anonymous profiles.
const UNKNOWN_AUTHOR: &str = "Unknown";

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>?").expect("valid regex"));

/// A sanitized post, ready for templating.
///
/// Field names in templates are the camelCase forms: `{postId}`, `{title}`,
/// `{published}`, `{summary}`, `{postUrl}`, `{authorImage}`, `{authorName}`,
/// `{authorUrl}`, `{featuredImage}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: String,
    pub title: String,
    pub published: String,
    pub summary: String,
    pub post_url: String,
    pub author_image: String,
    pub author_name: String,
    pub author_url: String,
    pub featured_image: String,
}

impl Post {
    /// Look up a field by its template name.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "postId" => &self.post_id,
            "title" => &self.title,
            "published" => &self.published,
            "summary" => &self.summary,
            "postUrl" => &self.post_url,
            "authorImage" => &self.author_image,
            "authorName" => &self.author_name,
            "authorUrl" => &self.author_url,
            "featuredImage" => &self.featured_image,
            _ => return None,
        };
        Some(value)
    }
}

/// Flatten one feed entry.
pub fn sanitize<P: Page>(entry: &Entry, config: &Config, page: &P) -> Post {
    let body = entry.body();
    let author = entry.first_author();

    let image = entry
        .thumbnail_url()
        .map(str::to_string)
        .or_else(|| page.first_image(body))
        .unwrap_or_else(|| config.default_image.clone());

    Post {
        post_id: entry.post_id().to_string(),
        title: entry.title().to_string(),
        published: format_date(entry.published(), &config.lang),
        summary: truncate(&strip_tags(body), config.summary_length),
        post_url: entry.alternate_link().unwrap_or_default().to_string(),
        author_image: author
            .map(|a| avatar(a.image_src()))
            .unwrap_or_default()
            .to_string(),
        author_name: author
            .map(|a| a.name())
            .filter(|name| *name != UNKNOWN_AUTHOR)
            .unwrap_or_default()
            .to_string(),
        author_url: author.map(|a| a.uri()).unwrap_or_default().to_string(),
        featured_image: resize(
            &image,
            ResizeParams::new(&config.image_params, &config.yt_thumbnail),
        ),
    }
}

fn avatar(src: &str) -> &str {
    if PLACEHOLDER_AVATARS.iter().any(|p| src.contains(p)) {
        ""
    } else {
        src
    }
}

/// Remove anything that looks like an HTML tag.  Not a parser: entities are
/// left as they are and an unclosed `<` swallows the rest of the text.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// Cut `text` to `length` characters, appending `...` only when something
/// was cut.  A non-positive length yields an empty string.
pub fn truncate(text: &str, length: i64) -> String {
    if length <= 0 {
        return String::new();
    }
    let length = length as usize;
    match text.char_indices().nth(length) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Format an RFC 3339 timestamp as a long date in `lang`, e.g.
/// `January 05, 2024` for US English, `09 de marzo de 2024` for Spanish and
/// `09. März 2024` for German.  Languages without a pattern of their own use
/// day-month-year order with localized month names, which approximates
/// rather than reproduces each locale's long date.  Unparseable input yields
/// `""`.
pub fn format_date(timestamp: &str, lang: &str) -> String {
    let Ok(date) = DateTime::parse_from_rfc3339(timestamp.trim()) else {
        return String::new();
    };
    let (language, region) = split_lang(lang);
    let (locale, pattern) = match locale_for(&language, region.as_deref()) {
        Some(locale) => (locale, date_pattern(&language, region.as_deref())),
        None => (Locale::en_US, "%B %d, %Y"),
    };
    date.format_localized(pattern, locale).to_string()
}

/// Long-date layout per language; month-first only for US English.
fn date_pattern(language: &str, region: Option<&str>) -> &'static str {
    match (language, region) {
        ("en", None | Some("US")) => "%B %d, %Y",
        ("en", Some(_)) => "%d %B %Y",
        ("es" | "pt" | "ca" | "gl", _) => "%d de %B de %Y",
        ("de" | "da" | "nb" | "no" | "fi" | "cs" | "sk", _) => "%d. %B %Y",
        ("nl" | "fr" | "it" | "ro" | "el" | "id", _) => "%d %B %Y",
        ("ja" | "zh", _) => "%Y年%-m月%-d日",
        ("ko", _) => "%Y년 %B %-d일",
        _ => "%d %B %Y",
    }
}

/// `pt-BR` → (`pt`, `Some("BR")`); an empty tag is English.
fn split_lang(lang: &str) -> (String, Option<String>) {
    let tag = lang.trim().replace('-', "_");
    let mut parts = tag.splitn(2, '_');
    let language = match parts.next().unwrap_or_default() {
        "" => "en".to_string(),
        code => code.to_ascii_lowercase(),
    };
    let region = parts.next().map(str::to_ascii_uppercase);
    (language, region)
}

fn locale_for(language: &str, region: Option<&str>) -> Option<Locale> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(region) = region {
        candidates.push(format!("{language}_{region}"));
    }
    candidates.push(match language {
        "en" => "en_US".to_string(),
        "ja" => "ja_JP".to_string(),
        "ko" => "ko_KR".to_string(),
        "zh" => "zh_CN".to_string(),
        "vi" => "vi_VN".to_string(),
        "sv" => "sv_SE".to_string(),
        "da" => "da_DK".to_string(),
        "cs" => "cs_CZ".to_string(),
        "el" => "el_GR".to_string(),
        "uk" => "uk_UA".to_string(),
        other => format!("{other}_{}", other.to_ascii_uppercase()),
    });
    candidates
        .iter()
        .find_map(|name| Locale::try_from(name.as_str()).ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
