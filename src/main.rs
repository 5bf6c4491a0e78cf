//! blogger-related — render a blog's related-posts block from the command line.
//!
//! Runs the widget against a live Blogger blog and prints the mount element
//! as it would look on the page after activation:
//!
//! ```text
//! blogger-related https://example.blogspot.com/2024/01/post.html \
//!     --data post-id=6273469587216938221 --data tags='["rust"]'
//! ```
//!
//! * `--config FILE` — TOML file of caller options (`max_results = 3`, ...).
//! * `--data KEY=VALUE` — `data-*` attributes on the mount element.
//! * `--seed N` — fixed shuffle seed.
//!
//! Logs go to stderr; set `RUST_LOG=blogger_related=debug` to see the feed
//! request.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use blogger_related::page::Element;
use blogger_related::{Overrides, RelatedPosts, StaticPage};

#[derive(Debug, Parser)]
#[command(version, about = "Render a Blogger related-posts block")]
struct Args {
    /// URL of the post page the block is shown on; its origin is the feed root.
    page_url: Url,

    /// TOML file with widget options.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document language used for dates.
    #[arg(long, default_value = "en")]
    lang: String,

    /// A data-* attribute on the mount element, as KEY=VALUE.
    #[arg(short, long = "data", value_name = "KEY=VALUE", value_parser = parse_data)]
    data: Vec<(String, String)>,

    /// Shuffle seed, for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_data(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

/// Build the mount element the configured selector will find.
fn mount_element(selector: &str, data: &[(String, String)]) -> Element {
    let mut element = match selector.trim().strip_prefix('.') {
        Some(class) => {
            let mut el = Element::new("");
            el.classes.push(class.to_string());
            el
        }
        None => Element::new(selector.trim().trim_start_matches('#')),
    };
    for (key, value) in data {
        element = element.with_data(key, value.clone());
    }
    element
}

fn load_overrides(path: Option<&PathBuf>) -> Result<Overrides> {
    let Some(path) = path else {
        return Ok(Overrides::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Overrides::from_toml(&text).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let overrides = load_overrides(args.config.as_ref())?;

    let selector = overrides
        .related_selector
        .clone()
        .unwrap_or_else(|| blogger_related::Config::default().related_selector);
    let page = StaticPage::new(args.page_url, args.lang)
        .with_element(mount_element(&selector, &args.data));

    let mut widget = RelatedPosts::new(overrides, page, reqwest::Client::new());
    if let Some(seed) = args.seed {
        widget = widget.with_seed(seed);
    }

    widget.init().await.context("fetching related posts")?;

    if let Some(element) = widget.container() {
        println!("{}", element.to_html());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_data_splits_on_first_equals() {
        assert_eq!(
            parse_data("template=<a href=\"{postUrl}\">").unwrap(),
            ("template".to_string(), "<a href=\"{postUrl}\">".to_string())
        );
        assert!(parse_data("novalue").is_err());
    }

    #[test]
    fn mount_element_matches_its_selector() {
        let el = mount_element("#blog-related", &[("post-id".into(), "9".into())]);
        assert!(el.matches("#blog-related"));
        assert_eq!(el.dataset.get("postId").map(String::as_str), Some("9"));

        let el = mount_element(".related", &[]);
        assert!(el.matches(".related"));
    }

    #[test]
    fn cli_parses_repeated_data() {
        let args = Args::try_parse_from([
            "blogger-related",
            "https://b.example.com/p.html",
            "-d",
            "max-results=3",
            "--data",
            "shuffle-level=0",
        ])
        .unwrap();
        assert_eq!(args.data.len(), 2);
        assert_eq!(args.page_url.host_str(), Some("b.example.com"));
    }
}
