//! The related-posts widget: construct with options, then activate once.
//!
//! ```ignore
//! let mut widget = RelatedPosts::new(options, page, reqwest::Client::new());
//! widget.init().await?;
//! ```
//!
//! [`RelatedPosts::new`] merges the caller's options over the defaults,
//! records the page origin as the feed root and looks up the mount element.
//! [`RelatedPosts::init`] layers the element's `data-*` attributes on top,
//! fetches the feed and renders.  A missing mount element or an empty feed
//! makes `init` a no-op; feed failures are returned.
//!
//! Hosts that honour `observer` should call `init` once the mount element
//! scrolls within `root_margin` of the viewport; this type does not watch
//! visibility itself.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::{Config, Overrides};
use crate::error::Result;
use crate::page::{Container, Page};
use crate::render::render;
use crate::source::{BloggerFeed, Transport};

pub struct RelatedPosts<P: Page, T> {
    config: Config,
    page: P,
    feed: BloggerFeed<T>,
    container: Option<P::Container>,
    rng: StdRng,
}

impl<P: Page, T: Transport> RelatedPosts<P, T> {
    pub fn new(options: Overrides, page: P, transport: T) -> Self {
        let mut config = Config::default().merge(&options);
        config.home_url = page.origin();
        config.lang = page.lang().to_string();
        let container = page.query(&config.related_selector);

        Self {
            config,
            page,
            feed: BloggerFeed::new(transport),
            container,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed shuffle seed, for reproducible output.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Configuration before the mount element's attributes are applied.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The mount element, if the selector matched one.
    pub fn container(&self) -> Option<&P::Container> {
        self.container.as_ref()
    }

    /// Fetch and render the related posts into the mount element.
    pub async fn init(&mut self) -> Result<()> {
        let Some(container) = self.container.as_mut() else {
            debug!(selector = %self.config.related_selector, "mount element not found");
            return Ok(());
        };

        let mut config = self.config.clone();
        config.apply_attributes(&container.dataset());

        create(&config, &self.feed, container, &self.page, &mut self.rng).await
    }
}

async fn create<P: Page, T: Transport>(
    config: &Config,
    feed: &BloggerFeed<T>,
    container: &mut P::Container,
    page: &P,
    rng: &mut StdRng,
) -> Result<()> {
    let entries = feed.fetch_posts(config).await?;
    if entries.is_empty() {
        debug!("feed returned no entries");
        return Ok(());
    }

    let rendered = render(&entries, config, container, page, rng);
    info!(rendered, "related posts rendered");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::future::{ready, Future};
    use std::sync::Mutex;

    use url::Url;

    use super::*;
    use crate::error::Error;
    use crate::page::{Element, StaticPage, LOADED_CLASS};

    /// Serves one canned body and records every requested URL.
    #[derive(Default)]
    struct FakeFeed {
        body: String,
        requests: Mutex<Vec<String>>,
    }

    impl FakeFeed {
        fn new(body: impl Into<String>) -> Self {
            Self {
                body: body.into(),
                ..Self::default()
            }
        }
    }

    impl Transport for &FakeFeed {
        fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send {
            self.requests.lock().unwrap().push(url.to_string());
            ready(Ok(self.body.clone()))
        }
    }

    fn feed_json(ids: &[&str]) -> String {
        let entries: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{
                    "id": {{"$t": "tag:blogger.com,1999:blog-1.post-{id}"}},
                    "title": {{"$t": "Post {id}"}},
                    "published": {{"$t": "2024-01-05T10:00:00.000-08:00"}},
                    "link": [{{"rel": "alternate", "href": "https://blog.example.com/{id}.html"}}],
                    "media$thumbnail": {{"url": "https://1.bp.blogspot.com/-a/b/c/d/s72-c/{id}.jpg"}}
                }}"#
                )
            })
            .collect();
        format!(r#"{{"feed": {{"entry": [{}]}}}}"#, entries.join(","))
    }

    fn page(element: Option<Element>) -> StaticPage {
        let page = StaticPage::new(
            Url::parse("https://blog.example.com/2024/01/current.html").unwrap(),
            "en",
        );
        match element {
            Some(el) => page.with_element(el),
            None => page,
        }
    }

    #[tokio::test]
    async fn renders_five_of_seven_without_current_post() {
        let fake = FakeFeed::new(feed_json(&["1", "2", "3", "4", "5", "6", "7"]));
        let el = Element::new("blog-related").with_data("post-id", "6");
        let mut widget = RelatedPosts::new(Overrides::default(), page(Some(el)), &fake).with_seed(3);

        widget.init().await.unwrap();

        let el = widget.container().unwrap();
        assert_eq!(el.inner_html.matches(r#"class="related-item""#).count(), 5);
        assert!(!el.inner_html.contains("/6.html"));
        assert!(el.classes.iter().any(|c| c == LOADED_CLASS));
        assert!(el.inner_html.contains("/w300-h225-p-k-no-nu-rw-l80-e30/"));

        let requests = fake.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("https://blog.example.com/feeds/posts/summary?alt=json"));
        assert!(requests[0].contains("max-results=10"));
    }

    #[tokio::test]
    async fn missing_mount_element_is_a_no_op() {
        let fake = FakeFeed::new(feed_json(&["1"]));
        let mut widget = RelatedPosts::new(Overrides::default(), page(None), &fake);

        widget.init().await.unwrap();

        assert!(widget.container().is_none());
        assert!(fake.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_feed_leaves_container_unchanged() {
        let fake = FakeFeed::new(r#"{"feed": {}}"#);
        let mut el = Element::new("blog-related");
        el.inner_html = "loading".into();
        let mut widget = RelatedPosts::new(Overrides::default(), page(Some(el)), &fake);

        widget.init().await.unwrap();

        let el = widget.container().unwrap();
        assert_eq!(el.inner_html, "loading");
        assert!(el.classes.is_empty());
    }

    #[tokio::test]
    async fn attributes_override_caller_options() {
        let fake = FakeFeed::new(feed_json(&["1", "2", "3"]));
        let options = Overrides {
            max_results: Some(3),
            directory: Some(crate::config::Directory::Full),
            ..Overrides::default()
        };
        let el = Element::new("blog-related")
            .with_data("max-results", "1")
            .with_data("shuffle-level", "0");
        let mut widget = RelatedPosts::new(options, page(Some(el)), &fake);

        widget.init().await.unwrap();

        let requests = fake.requests.lock().unwrap();
        assert!(requests[0].contains("/feeds/posts/full?"));
        assert!(requests[0].contains("max-results=1&"));
        // No shuffling: every fetched entry is rendered in feed order.
        let html = &widget.container().unwrap().inner_html;
        assert_eq!(html.matches("related-item").count(), 3);
        assert!(html.find("/1.html").unwrap() < html.find("/3.html").unwrap());
    }

    #[tokio::test]
    async fn custom_selector_from_options() {
        let fake = FakeFeed::new(feed_json(&["1", "2"]));
        let options = Overrides {
            related_selector: Some("#more".into()),
            ..Overrides::default()
        };
        let mut widget = RelatedPosts::new(options, page(Some(Element::new("more"))), &fake);

        widget.init().await.unwrap();

        assert!(widget.container().unwrap().classes.iter().any(|c| c == LOADED_CLASS));
    }

    #[tokio::test]
    async fn malformed_tag_attribute_is_an_error() {
        let fake = FakeFeed::new(feed_json(&["1"]));
        let el = Element::new("blog-related").with_data("tags", "[broken");
        let mut widget = RelatedPosts::new(Overrides::default(), page(Some(el)), &fake);

        let err = widget.init().await.unwrap_err();
        assert!(matches!(err, Error::Tags { .. }));
        assert!(fake.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_json_propagates() {
        let fake = FakeFeed::new("<html>not json</html>");
        let mut widget =
            RelatedPosts::new(Overrides::default(), page(Some(Element::new("blog-related"))), &fake);

        assert!(matches!(widget.init().await, Err(Error::Json(_))));
    }

    #[test]
    fn new_injects_page_origin_and_language() {
        let fake = FakeFeed::new("{}");
        let widget = RelatedPosts::new(Overrides::default(), page(None), &fake);
        assert_eq!(widget.config().home_url, "https://blog.example.com");
        assert_eq!(widget.config().lang, "en");
    }
}
