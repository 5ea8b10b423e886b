//! The library code for `datebook`, a tool for filing blog posts into a
//! date-bucketed directory tree. Filing a post is two distinct steps:
//!
//! 1. Copying the source document to `{prefix}/YYYY/MM/DD/` on disk
//!    ([`crate::filer`])
//! 2. Recording the post in the [`crate::index::BlogIndex`], a Year → Month →
//!    Day → Post tree persisted as `blog.json`
//!
//! The second step is the more involved. Each level of the tree is kept in
//! descending order (newest first), buckets are addressed by their label, and
//! re-filing a post with the same slug on the same day replaces it in place.
//! Post metadata comes only from the document's front matter
//! ([`crate::frontmatter`]); a field it lacks stays empty.
//!
//! The index can also be reconstructed from what is already on disk via
//! [`crate::filer::Filer::rebuild`]. [`crate::command`] ties these together
//! for the `datebook` binary.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod body;
pub mod command;
pub mod config;
pub mod date;
pub mod filer;
pub mod frontmatter;
pub mod index;
pub mod post;
