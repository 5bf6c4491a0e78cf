//! Feed access layer.
//!
//! This module defines the [`Transport`] trait, the raw [`Entry`] type the
//! Blogger feed returns, and the [`BloggerFeed`] client that builds the feed
//! query and parses the response.
//!
//! ## For contributors — swapping the HTTP layer
//!
//! 1. Implement [`Transport`] for your client (a proxy, a cache, a fixture).
//! 2. Pass it to [`BloggerFeed::new`] or [`crate::widget::RelatedPosts::new`].
//!
//! URL building ([`feed_url`]) and parsing ([`parse_feed`]) are pure
//! functions, so they are tested without any transport at all.

mod blogger;
mod entry;

pub use blogger::{feed_url, parse_feed, title_query, BloggerFeed};
pub use entry::{Author, Entry, Image, Link, Text, Thumbnail};

use std::future::Future;

use url::Url;

use crate::error::{Error, Result};

/// Performs the single GET the widget needs.
///
/// Returns the response body as text.  Implementations must report
/// non-success statuses as errors.
pub trait Transport {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

impl Transport for reqwest::Client {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send {
        let request = reqwest::Client::get(self, url.clone());
        let url = url.to_string();
        async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::Status {
                    url,
                    status: status.as_u16(),
                });
            }
            Ok(response.text().await?)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::Config;

    fn feed_config(server: &MockServer) -> Config {
        Config {
            home_url: server.uri(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn reqwest_transport_returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/posts/summary"))
            .and(query_param("alt", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"feed": {}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let url = feed_url(&feed_config(&server)).unwrap();
        let body = reqwest::Client::new().fetch(&url).await.unwrap();
        assert_eq!(body, r#"{"feed": {}}"#);
    }

    #[tokio::test]
    async fn reqwest_transport_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = feed_url(&feed_config(&server)).unwrap();
        let err = reqwest::Client::new().fetch(&url).await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn blogger_feed_parses_served_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/posts/summary"))
            .and(query_param("max-results", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "feed": {"entry": [
                    {"id": {"$t": "tag:blogger.com,1999:blog-1.post-7"}},
                    {"id": {"$t": "tag:blogger.com,1999:blog-1.post-8"}}
                ]}
            })))
            .mount(&server)
            .await;

        let feed = BloggerFeed::new(reqwest::Client::new());
        let entries = feed.fetch_posts(&feed_config(&server)).await.unwrap();
        let ids: Vec<&str> = entries.iter().map(Entry::post_id).collect();
        assert_eq!(ids, vec!["7", "8"]);
    }
}
