//! Selection and HTML rendering.
//!
//! Takes the entries the feed returned and turns them into the markup of the
//! mount element:
//!
//! 1. [`select`] drops the current post and samples `max_results` entries at
//!    random (only when `shuffle_level > 0`).
//! 2. Each survivor is [`sanitize`]d into a [`Post`].
//! 3. [`render_posts`] fills one of two templates per post.
//!
//! [`render`] runs the whole sequence and writes the result into a
//! [`Container`].

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Captures, Regex};
use tracing::debug;

use crate::config::Config;
use crate::page::{Container, Page, LOADED_CLASS};
use crate::sanitize::{sanitize, Post};
use crate::source::Entry;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z]+)\}").expect("valid regex"));

/// Pick the entries to render.
///
/// With `shuffle_level > 0` the entry whose id is `post_id` is removed (when
/// `post_id` is set), the rest are shuffled and the first `max_results`
/// kept.  With `shuffle_level == 0` the feed order is used as is and the
/// current post is *not* removed; the feed was asked for exactly
/// `max_results` entries in that case.
pub fn select<'a, R: Rng + ?Sized>(
    entries: &'a [Entry],
    config: &Config,
    rng: &mut R,
) -> Vec<&'a Entry> {
    let mut selected: Vec<&Entry> = entries.iter().collect();
    if config.shuffle_level == 0 {
        return selected;
    }

    if !config.post_id.is_empty() {
        selected.retain(|entry| entry.post_id() != config.post_id);
    }
    selected.shuffle(rng);
    selected.truncate(config.max_results);
    selected
}

/// Replace every `{name}` in `template` with the matching [`Post`] field.
/// Unknown names render as nothing.
pub fn templating(template: &str, post: &Post) -> String {
    PLACEHOLDER
        .replace_all(template, |c: &Captures| {
            post.field(&c[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}

/// Render each post with the image template when it has a featured image,
/// and the text-only template otherwise.
pub fn render_posts(posts: &[Post], config: &Config) -> String {
    posts
        .iter()
        .map(|post| {
            if post.featured_image.is_empty() {
                templating(&config.text_only_template, post)
            } else {
                templating(&config.template, post)
            }
        })
        .collect()
}

/// Select, sanitize and render `entries` into `container`.
///
/// Returns the number of posts written.  When nothing survives selection the
/// container is left untouched, including any loading placeholder in it.
pub fn render<C, P, R>(
    entries: &[Entry],
    config: &Config,
    container: &mut C,
    page: &P,
    rng: &mut R,
) -> usize
where
    C: Container + ?Sized,
    P: Page,
    R: Rng + ?Sized,
{
    let posts: Vec<Post> = select(entries, config, rng)
        .into_iter()
        .map(|entry| sanitize(entry, config, page))
        .collect();

    if posts.is_empty() {
        debug!("no related posts left after selection");
        return 0;
    }

    container.set_inner_html(render_posts(&posts, config));
    container.add_class(LOADED_CLASS);
    posts.len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
