//! blogger-related — related-post lists for Blogger blogs.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ Config ┌───────────┐ Vec<Entry> ┌───────────┐  Post  ┌───────────┐
//! │ config.rs │ ─────► │ source/   │ ─────────► │ render.rs │ ◄───── │sanitize.rs│
//! │ (merge)   │        │ (1 GET)   │            │ (select)  │        │ + image.rs│
//! └───────────┘        └───────────┘            └───────────┘        └───────────┘
//!       ▲                                             │ set_inner_html()
//!       │ dataset()                                   ▼
//!  ┌──────────────────────────── page.rs (Page / Container) ─────────────────────┐
//! ```
//!
//! * **`config`** — defaults, caller [`Overrides`], `data-*` attribute decoding.
//! * **`source/`** — the [`Transport`] seam, raw feed [`Entry`] types and the
//!   [`BloggerFeed`] client.
//! * **`sanitize`** — raw entry → flat [`Post`] (dates, summaries, authors).
//! * **`image`** — thumbnail-size rewriting for Blogger/Google/YouTube URLs.
//! * **`render`** — current-post exclusion, shuffling, `{field}` templates.
//! * **`page`** — what the widget needs from its host page, plus an
//!   in-memory implementation.
//! * **`widget`** — [`RelatedPosts`]: construct, then `init().await`.

pub mod config;
pub mod error;
pub mod image;
pub mod page;
pub mod render;
pub mod sanitize;
pub mod source;
pub mod widget;

pub use config::{Config, Overrides};
pub use error::{Error, Result};
pub use page::{Container, Element, Page, StaticPage};
pub use sanitize::Post;
pub use source::{BloggerFeed, Entry, Transport};
pub use widget::RelatedPosts;
