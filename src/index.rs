//! Defines the [`BlogIndex`], a Year → Month → Day → [`Post`] tree, along with
//! its persistence as JSON. Each level of the tree is sorted in descending
//! order of its labels (newest first) and holds at most one bucket per label.
//! Labels are compared as strings, so `"5"` and `"05"` are different buckets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::date::{self, Ymd};
use crate::frontmatter::Error as FrontMatterError;
use crate::post::Post;

/// The conventional file name for a persisted index.
pub const INDEX_FILE_NAME: &str = "blog.json";

/// The root of the index, plus blog-wide metadata.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BlogIndex {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub quip: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "url", skip_serializing_if = "String::is_empty")]
    pub base_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub copyright: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub license: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub started: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ended: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub index_tmpl: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub post_tmpl: String,

    /// The last day anything was filed, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated: String,

    pub years: Vec<Year>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Year {
    pub year: String,
    #[serde(default)]
    pub months: Vec<Month>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Month {
    pub month: String,
    #[serde(default)]
    pub days: Vec<Day>,
}

/// The posts filed on one day, most recently filed first.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Day {
    pub day: String,
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// A node of the tree that is addressed by its label.
trait Bucket {
    fn with_label(label: &str) -> Self;
    fn label(&self) -> &str;
}

impl Bucket for Year {
    fn with_label(label: &str) -> Self {
        Year {
            year: label.to_owned(),
            months: Vec::new(),
        }
    }

    fn label(&self) -> &str {
        &self.year
    }
}

impl Bucket for Month {
    fn with_label(label: &str) -> Self {
        Month {
            month: label.to_owned(),
            days: Vec::new(),
        }
    }

    fn label(&self) -> &str {
        &self.month
    }
}

impl Bucket for Day {
    fn with_label(label: &str) -> Self {
        Day {
            day: label.to_owned(),
            posts: Vec::new(),
        }
    }

    fn label(&self) -> &str {
        &self.day
    }
}

/// Finds the bucket for `label` in `buckets` (sorted descending), inserting an
/// empty one at its sorted position if there isn't one yet.
fn bucket<'a, B: Bucket>(buckets: &'a mut Vec<B>, label: &str) -> &'a mut B {
    // Reversing the comparison makes the binary search work on a descending
    // sequence.
    let i = match buckets.binary_search_by(|b| label.cmp(b.label())) {
        Ok(i) => i,
        Err(i) => {
            buckets.insert(i, B::with_label(label));
            i
        }
    };
    &mut buckets[i]
}

impl Day {
    /// Puts `post` into the day. A post with the same slug is replaced where
    /// it stands; otherwise `post` goes to the front. Returns the post's
    /// position.
    pub fn upsert(&mut self, post: Post) -> usize {
        match self.posts.iter().position(|p| p.slug == post.slug) {
            Some(i) => {
                self.posts[i] = post;
                i
            }
            None => {
                self.posts.insert(0, post);
                0
            }
        }
    }
}

impl BlogIndex {
    /// Files `post` under `ymd`, creating whichever of the year, month and day
    /// buckets are missing. Returns the post's position within its day.
    pub fn insert(&mut self, ymd: &Ymd, post: Post) -> usize {
        let year = bucket(&mut self.years, &ymd.year);
        let month = bucket(&mut year.months, &ymd.month);
        bucket(&mut month.days, &ymd.day).upsert(post)
    }

    /// Looks up a post by date and slug.
    pub fn post(&self, ymd: &Ymd, slug: &str) -> Option<&Post> {
        self.years
            .iter()
            .find(|y| y.year == ymd.year)?
            .months
            .iter()
            .find(|m| m.month == ymd.month)?
            .days
            .iter()
            .find(|d| d.day == ymd.day)?
            .posts
            .iter()
            .find(|p| p.slug == slug)
    }

    /// Iterates over every post, newest bucket first.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.years
            .iter()
            .flat_map(|y| y.months.iter())
            .flat_map(|m| m.days.iter())
            .flat_map(|d| d.posts.iter())
    }

    /// Copies every non-empty blog-wide setting onto the index.
    pub fn apply(&mut self, settings: &Settings) {
        let fields: [(&mut String, &Option<String>); 11] = [
            (&mut self.name, &settings.name),
            (&mut self.quip, &settings.quip),
            (&mut self.description, &settings.description),
            (&mut self.base_url, &settings.url),
            (&mut self.copyright, &settings.copyright),
            (&mut self.license, &settings.license),
            (&mut self.language, &settings.language),
            (&mut self.started, &settings.started),
            (&mut self.ended, &settings.ended),
            (&mut self.index_tmpl, &settings.index_tmpl),
            (&mut self.post_tmpl, &settings.post_tmpl),
        ];
        for (field, setting) in fields {
            if let Some(value) = setting.as_ref().filter(|v| !v.is_empty()) {
                *field = value.clone();
            }
        }
    }

    /// Writes the index to `path` as pretty-printed JSON, replacing whatever
    /// was there.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer).map_err(|err| Error::Encode {
            path: path.to_owned(),
            err,
        })?;
        std::fs::write(path, buf).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        tracing::info!(path = %path.display(), "saved blog index");
        Ok(())
    }

    /// Reads an index from `path`. A missing or empty file yields an empty
    /// index.
    pub fn load(path: &Path) -> Result<BlogIndex> {
        let src = match std::fs::read(path) {
            Ok(src) => src,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no blog index yet");
                return Ok(BlogIndex::default());
            }
            Err(err) => {
                return Err(Error::Io {
                    path: path.to_owned(),
                    err,
                })
            }
        };
        if src.iter().all(u8::is_ascii_whitespace) {
            return Ok(BlogIndex::default());
        }
        serde_json::from_slice(&src).map_err(|err| Error::Decode {
            path: path.to_owned(),
            err,
        })
    }
}

/// Represents the result of an index operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error filing into, rebuilding or persisting a [`BlogIndex`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a date doesn't split into year, month and day.
    MalformedDate(String),

    /// Returned when the document to file doesn't exist.
    SourceNotFound(PathBuf),

    /// Returned for other I/O problems, with the path involved.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when a document's front matter can't be parsed. The index is
    /// left untouched, but the document may already have been copied.
    FrontMatter {
        path: PathBuf,
        err: FrontMatterError,
    },

    /// Returned when the index can't be serialized.
    Encode {
        path: PathBuf,
        err: serde_json::Error,
    },

    /// Returned when a persisted index isn't valid.
    Decode {
        path: PathBuf,
        err: serde_json::Error,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedDate(s) => {
                write!(f, "malformed date `{}`, expected YYYY-MM-DD", s)
            }
            Error::SourceNotFound(path) => {
                write!(f, "'{}' not found", path.display())
            }
            Error::Io { path, err } => write!(f, "'{}': {}", path.display(), err),
            Error::FrontMatter { path, err } => {
                write!(f, "Parsing front matter of '{}': {}", path.display(), err)
            }
            Error::Encode { path, err } => {
                write!(f, "Marshaling '{}': {}", path.display(), err)
            }
            Error::Decode { path, err } => {
                write!(f, "Unmarshaling '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MalformedDate(_) => None,
            Error::SourceNotFound(_) => None,
            Error::Io { path: _, err } => Some(err),
            Error::FrontMatter { path: _, err } => Some(err),
            Error::Encode { path: _, err } => Some(err),
            Error::Decode { path: _, err } => Some(err),
        }
    }
}

impl From<date::Error> for Error {
    /// Converts a [`date::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator when parsing dates.
    fn from(err: date::Error) -> Error {
        match err {
            date::Error::Malformed(s) => Error::MalformedDate(s),
        }
    }
}
