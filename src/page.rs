//! Page environment abstraction.
//!
//! The widget was written against a browser page: it reads the current URL
//! and document language, looks up its mount element by selector, and asks
//! the HTML parser for the first `<img>` in a post body.  Those four
//! capabilities are the [`Page`] trait here, so the pipeline runs the same
//! way against a real host, the CLI's [`StaticPage`], or a test fixture.
//!
//! ## For contributors — embedding in a new host
//!
//! 1. Implement [`Container`] for whatever handle your host uses for the
//!    mount element.
//! 2. Implement [`Page`] and return that handle from [`Page::query`].
//! 3. Override [`Page::first_image`] only if the host has a real HTML
//!    parser; the default regex lookup matches what the feed produces.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Class added to the mount element once posts have been rendered.
pub const LOADED_CLASS: &str = "related-loaded";

/// The mount element the rendered posts are written into.
pub trait Container {
    /// `data-*` attributes keyed by their dataset (camelCase) name, e.g.
    /// `data-max-results="3"` appears as `maxResults => "3"`.
    fn dataset(&self) -> BTreeMap<String, String>;

    /// Replace the element's content wholesale.
    fn set_inner_html(&mut self, html: String);

    fn add_class(&mut self, class: &str);
}

/// Everything the widget needs from the page hosting it.
pub trait Page {
    type Container: Container;

    /// Address of the page the widget runs on.
    fn url(&self) -> &Url;

    /// Declared document language (`<html lang="...">`), possibly empty.
    fn lang(&self) -> &str;

    /// Find the mount element matching `selector`.
    fn query(&self, selector: &str) -> Option<Self::Container>;

    /// Scheme, host and port of [`Page::url`], without a trailing slash.
    fn origin(&self) -> String {
        self.url().origin().ascii_serialization()
    }

    /// `src` of the first `<img>` in `html`, resolved against the page URL
    /// the way a DOM `img.src` property would be.
    fn first_image(&self, html: &str) -> Option<String> {
        let src = first_img_src(html)?;
        Some(
            self.url()
                .join(&src)
                .map(String::from)
                .unwrap_or(src),
        )
    }
}

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b(?:[^>]*?\s)?src\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

/// Raw `src` attribute of the first `<img>` tag, entity-decoded.
///
/// Empty `src` attributes count as "no image", matching a DOM lookup whose
/// `src` would be falsy.
pub fn first_img_src(html: &str) -> Option<String> {
    let caps = IMG_SRC.captures(html)?;
    let src = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    if src.is_empty() {
        return None;
    }
    Some(src.replace("&amp;", "&"))
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// A detached mount element: an id, a class list, `data-*` attributes and
/// its inner HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub id: String,
    pub classes: Vec<String>,
    pub dataset: BTreeMap<String, String>,
    pub inner_html: String,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Add a `data-*` attribute.  `key` may be given in either the
    /// attribute form (`max-results`) or the dataset form (`maxResults`).
    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.dataset.insert(dataset_key(key), value.into());
        self
    }

    /// Whether this element matches a simple `#id` or `.class` selector.
    pub fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            id == self.id
        } else if let Some(class) = selector.strip_prefix('.') {
            self.classes.iter().any(|c| c == class)
        } else {
            false
        }
    }

    /// Serialise the element back to markup, as `outerHTML` would.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div");
        if !self.id.is_empty() {
            html.push_str(&format!(" id=\"{}\"", self.id));
        }
        if !self.classes.is_empty() {
            html.push_str(&format!(" class=\"{}\"", self.classes.join(" ")));
        }
        for (key, value) in &self.dataset {
            html.push_str(&format!(
                " data-{}=\"{}\"",
                attribute_key(key),
                value.replace('"', "&quot;")
            ));
        }
        html.push('>');
        html.push_str(&self.inner_html);
        html.push_str("</div>");
        html
    }
}

impl Container for Element {
    fn dataset(&self) -> BTreeMap<String, String> {
        self.dataset.clone()
    }

    fn set_inner_html(&mut self, html: String) {
        self.inner_html = html;
    }

    fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }
}

/// A page with a known URL, language and a single mount element.
#[derive(Debug, Clone)]
pub struct StaticPage {
    pub url: Url,
    pub lang: String,
    pub element: Option<Element>,
}

impl StaticPage {
    pub fn new(url: Url, lang: impl Into<String>) -> Self {
        Self {
            url,
            lang: lang.into(),
            element: None,
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }
}

impl Page for StaticPage {
    type Container = Element;

    fn url(&self) -> &Url {
        &self.url
    }

    fn lang(&self) -> &str {
        &self.lang
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.element
            .as_ref()
            .filter(|el| el.matches(selector))
            .cloned()
    }
}

/// `max-results` → `maxResults`, the DOMStringMap naming rule.
pub fn dataset_key(attr: &str) -> String {
    let mut out = String::with_capacity(attr.len());
    let mut upper = false;
    for c in attr.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `maxResults` → `max-results`.
fn attribute_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> StaticPage {
        StaticPage::new(
            Url::parse("https://example.blogspot.com/2024/01/post.html").unwrap(),
            "en",
        )
    }

    #[test]
    fn first_img_src_finds_first_image() {
        let html = r#"<p>text</p><img class="a" src="https://x/1.jpg"><img src="https://x/2.jpg">"#;
        assert_eq!(first_img_src(html).as_deref(), Some("https://x/1.jpg"));
    }

    #[test]
    fn first_img_src_ignores_lazy_load_data_src() {
        let html = r#"<img data-src="https://x/lazy.gif" src="https://x/real.jpg">"#;
        assert_eq!(first_img_src(html).as_deref(), Some("https://x/real.jpg"));
    }

    #[test]
    fn first_img_src_handles_single_quotes_and_entities() {
        let html = "<IMG alt='' SRC='https://x/a.jpg?w=1&amp;h=2'>";
        assert_eq!(first_img_src(html).as_deref(), Some("https://x/a.jpg?w=1&h=2"));
    }

    #[test]
    fn first_img_src_none_without_image() {
        assert_eq!(first_img_src("<p>no pictures</p>"), None);
        assert_eq!(first_img_src(r#"<img src="">"#), None);
    }

    #[test]
    fn first_image_resolves_relative_src() {
        let src = page().first_image(r#"<img src="/images/a.png">"#);
        assert_eq!(src.as_deref(), Some("https://example.blogspot.com/images/a.png"));
    }

    #[test]
    fn origin_strips_path() {
        assert_eq!(page().origin(), "https://example.blogspot.com");
    }

    #[test]
    fn query_matches_id_and_class() {
        let mut el = Element::new("blog-related");
        el.classes.push("widget".into());
        let page = page().with_element(el);

        assert!(page.query("#blog-related").is_some());
        assert!(page.query(".widget").is_some());
        assert!(page.query("#other").is_none());
    }

    #[test]
    fn dataset_keys_round_trip_through_markup() {
        let el = Element::new("r").with_data("max-results", "3");
        assert_eq!(el.dataset.get("maxResults").map(String::as_str), Some("3"));
        assert_eq!(el.to_html(), r#"<div id="r" data-max-results="3"></div>"#);
    }

    #[test]
    fn add_class_is_idempotent() {
        let mut el = Element::new("r");
        el.add_class(LOADED_CLASS);
        el.add_class(LOADED_CLASS);
        assert_eq!(el.classes, vec![LOADED_CLASS.to_string()]);
    }
}
