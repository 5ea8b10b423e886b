//! Splits a document into its front matter and body, and parses the front
//! matter into [`Metadata`]. Three fencing styles are recognized:
//!
//! ```md
//! ---
//! title: YAML between dashes
//! ---
//! ```
//!
//! ```md
//! +++
//! title = "TOML between pluses (or `%%%`)"
//! +++
//! ```
//!
//! ```md
//! {
//!     "title": "JSON, starting on the first line"
//! }
//! ```
//!
//! A document that starts with none of these has no front matter.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use std::fmt;

use crate::post::Creator;

/// The serialization format of a front matter block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
            Format::Json => "JSON",
        })
    }
}

/// A raw front matter block, tagged with its format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrontMatter {
    pub format: Format,
    pub raw: String,
}

impl FrontMatter {
    /// Parses the block according to its [`Format`].
    pub fn parse(&self) -> Result<Metadata> {
        Ok(match self.format {
            Format::Yaml => {
                // An empty YAML document is `null`, not an empty mapping.
                if self.raw.trim().is_empty() {
                    Metadata::default()
                } else {
                    serde_yaml::from_str(&self.raw)?
                }
            }
            Format::Toml => toml::from_str(&self.raw)?,
            Format::Json => serde_json::from_str(&self.raw)?,
        })
    }
}

/// Splits `input` into its front matter (if any) and body. Line endings must
/// already be `\n`; see [`normalize_eol`].
pub fn split(input: &str) -> Result<(Option<FrontMatter>, &str)> {
    const FENCES: [(&str, Format); 3] = [
        ("---", Format::Yaml),
        ("+++", Format::Toml),
        ("%%%", Format::Toml),
    ];

    for (fence, format) in FENCES.iter() {
        if let Some(rest) = strip_line(input, fence) {
            let (raw, body) = until_line(rest, fence)
                .ok_or(Error::MissingEndFence(*format))?;
            let front_matter = FrontMatter {
                format: *format,
                raw: raw.to_owned(),
            };
            return Ok((Some(front_matter), body));
        }
    }

    if let Some(rest) = strip_line(input, "{") {
        let (raw, body) =
            until_line(rest, "}").ok_or(Error::MissingEndFence(Format::Json))?;
        let front_matter = FrontMatter {
            format: Format::Json,
            raw: format!("{{\n{}\n}}\n", raw),
        };
        return Ok((Some(front_matter), body));
    }

    Ok((None, input))
}

/// Converts `\r\n` line endings to `\n`.
pub fn normalize_eol(input: &str) -> Cow<'_, str> {
    if input.contains("\r\n") {
        input.replace("\r\n", "\n").into()
    } else {
        input.into()
    }
}

// Returns what follows `line` if `input` starts with it as a whole line.
fn strip_line<'a>(input: &'a str, line: &str) -> Option<&'a str> {
    let rest = input.strip_prefix(line)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('\n')
    }
}

// Splits `input` at the first line that is exactly `line`, returning the text
// before that line (without its trailing newline) and the text after it.
fn until_line<'a>(input: &'a str, line: &str) -> Option<(&'a str, &'a str)> {
    if let Some(rest) = strip_line(input, line) {
        return Some(("", rest));
    }
    let mut offset = 0;
    while let Some(i) = input[offset..].find('\n') {
        let start = offset + i + 1;
        if let Some(rest) = strip_line(&input[start..], line) {
            return Some((&input[..offset + i], rest));
        }
        offset = start;
    }
    None
}

/// Turns raw document text into [`Metadata`] plus the remaining body.
pub trait Extract {
    fn extract(&self, document: &str) -> Result<(Metadata, String)>;
}

/// The default [`Extract`]or: fenced YAML, TOML or JSON at the top of the
/// document. Documents without front matter get empty [`Metadata`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FencedExtractor;

impl Extract for FencedExtractor {
    fn extract(&self, document: &str) -> Result<(Metadata, String)> {
        let document = normalize_eol(document);
        let (front_matter, body) = split(&document)?;
        let metadata = match front_matter {
            Some(front_matter) => front_matter.parse()?,
            None => Metadata::default(),
        };
        Ok((metadata, body.to_owned()))
    }
}

/// The post metadata a front matter block may carry. Every field is optional
/// and a missing one stays empty; unknown keys are ignored.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Metadata {
    #[serde(deserialize_with = "scalar")]
    pub title: String,
    pub subtitle: String,
    #[serde(deserialize_with = "scalar")]
    pub byline: String,
    pub series: String,
    #[serde(deserialize_with = "scalar")]
    pub number: String,
    pub subject: String,

    /// A list of keywords, or a single one. Other shapes are ignored.
    #[serde(deserialize_with = "keywords")]
    pub keywords: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    pub description: String,
    pub category: String,
    pub lang: String,
    pub direction: String,
    pub draft: bool,
    #[serde(deserialize_with = "creators")]
    pub creators: Vec<Creator>,

    /// Overrides the filing date as the post's creation date.
    #[serde(deserialize_with = "optional_scalar")]
    pub date: Option<String>,

    /// Overrides "today" as the post's update date.
    #[serde(deserialize_with = "optional_scalar")]
    pub updated: Option<String>,
}

/// Scalars as they show up across the three formats: `number: 3` in YAML,
/// `date = 2020-05-01` in TOML, and so on.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(toml::value::Datetime),
}

impl From<Scalar> for String {
    fn from(s: Scalar) -> String {
        match s {
            Scalar::Text(s) => s,
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Date(d) => d.to_string(),
        }
    }
}

fn scalar<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_scalar(deserializer)?.unwrap_or_default())
}

fn optional_scalar<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

fn keywords<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Keywords {
        One(Scalar),
        Many(Vec<Scalar>),
        Other(IgnoredAny),
    }

    Ok(match Keywords::deserialize(deserializer)? {
        Keywords::One(keyword) => vec![keyword.into()],
        Keywords::Many(keywords) => keywords.into_iter().map(String::from).collect(),
        Keywords::Other(_) => Vec::new(),
    })
}

fn creators<'de, D>(deserializer: D) -> std::result::Result<Vec<Creator>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Name(String),
        Full {
            #[serde(default)]
            name: String,
            #[serde(default)]
            orcid: String,
        },
    }

    Ok(Vec::<Entry>::deserialize(deserializer)?
        .into_iter()
        .map(|entry| match entry {
            Entry::Name(name) => Creator {
                name,
                orcid: String::new(),
            },
            Entry::Full { name, orcid } => Creator { name, orcid },
        })
        .collect())
}

/// Represents the result of a front matter operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error splitting or parsing front matter.
#[derive(Debug)]
pub enum Error {
    /// Returned when the opening fence was found but the closing one wasn't.
    MissingEndFence(Format),

    /// Returned when there was an error parsing YAML front matter.
    Yaml(serde_yaml::Error),

    /// Returned when there was an error parsing TOML front matter.
    Toml(toml::de::Error),

    /// Returned when there was an error parsing JSON front matter.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingEndFence(format) => {
                write!(f, "{} front matter is missing its closing fence", format)
            }
            Error::Yaml(err) => write!(f, "YAML front matter: {}", err),
            Error::Toml(err) => write!(f, "TOML front matter: {}", err),
            Error::Json(err) => write!(f, "JSON front matter: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingEndFence(_) => None,
            Error::Yaml(err) => Some(err),
            Error::Toml(err) => Some(err),
            Error::Json(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Error {
        Error::Toml(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_yaml() -> Result<()> {
        let (fm, body) = split("---\ntitle: Hi\n---\n# Body\n")?;
        assert_eq!(
            Some(FrontMatter {
                format: Format::Yaml,
                raw: "title: Hi".to_owned(),
            }),
            fm
        );
        assert_eq!("# Body\n", body);
        Ok(())
    }

    #[test]
    fn test_split_toml_fences() -> Result<()> {
        for fence in &["+++", "%%%"] {
            let input = format!("{0}\ntitle = \"Hi\"\n{0}\nbody", fence);
            let (fm, body) = split(&input)?;
            let fm = fm.expect("front matter");
            assert_eq!(Format::Toml, fm.format);
            assert_eq!("title = \"Hi\"", fm.raw);
            assert_eq!("body", body);
        }
        Ok(())
    }

    #[test]
    fn test_split_json() -> Result<()> {
        let (fm, body) = split("{\n\t\"title\": \"Hi\"\n}\n\n# Hello\n")?;
        let fm = fm.expect("front matter");
        assert_eq!(Format::Json, fm.format);
        assert_eq!("{\n\t\"title\": \"Hi\"\n}\n", fm.raw);
        assert_eq!("\n# Hello\n", body);
        Ok(())
    }

    #[test]
    fn test_split_none() -> Result<()> {
        let (fm, body) = split("# Just a heading\n---\n")?;
        assert_eq!(None, fm);
        assert_eq!("# Just a heading\n", body);
        Ok(())
    }

    #[test]
    fn test_split_missing_end_fence() {
        match split("---\ntitle: Hi\n# Body\n") {
            Err(Error::MissingEndFence(Format::Yaml)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_split_dashes_inside_line_are_not_a_fence() -> Result<()> {
        let (fm, body) = split("---\ntitle: a---b\n---\nbody")?;
        assert_eq!("title: a---b", fm.expect("front matter").raw);
        assert_eq!("body", body);
        Ok(())
    }

    #[test]
    fn test_parse_yaml_metadata() -> Result<()> {
        let fm = FrontMatter {
            format: Format::Yaml,
            raw: [
                "title: Hello",
                "number: 3",
                "draft: true",
                "keywords: [a, b]",
                "abstract: Short",
                "creators:",
                "  - R. S. Doiel",
                "  - name: Jane",
                "    orcid: 0000-0001",
                "unknown: ignored",
            ]
            .join("\n"),
        };
        let metadata = fm.parse()?;
        assert_eq!("Hello", metadata.title);
        assert_eq!("3", metadata.number);
        assert!(metadata.draft);
        assert_eq!(vec!["a".to_owned(), "b".to_owned()], metadata.keywords);
        assert_eq!("Short", metadata.abstract_);
        assert_eq!(
            vec![
                Creator {
                    name: "R. S. Doiel".to_owned(),
                    orcid: String::new(),
                },
                Creator {
                    name: "Jane".to_owned(),
                    orcid: "0000-0001".to_owned(),
                },
            ],
            metadata.creators
        );
        assert_eq!(None, metadata.date);
        Ok(())
    }

    #[test]
    fn test_parse_toml_date() -> Result<()> {
        let fm = FrontMatter {
            format: Format::Toml,
            raw: "title = \"T\"\ndate = 2020-05-01\n".to_owned(),
        };
        let metadata = fm.parse()?;
        assert_eq!(Some("2020-05-01".to_owned()), metadata.date);
        Ok(())
    }

    #[test]
    fn test_parse_missing_title_and_byline_stay_empty() -> Result<()> {
        let fm = FrontMatter {
            format: Format::Yaml,
            raw: "subject: x".to_owned(),
        };
        let metadata = fm.parse()?;
        assert_eq!("", metadata.title);
        assert_eq!("", metadata.byline);
        assert_eq!("x", metadata.subject);
        Ok(())
    }

    #[test]
    fn test_parse_single_keyword() -> Result<()> {
        let fm = FrontMatter {
            format: Format::Yaml,
            raw: "keywords: rust".to_owned(),
        };
        assert_eq!(vec!["rust".to_owned()], fm.parse()?.keywords);
        Ok(())
    }

    #[test]
    fn test_parse_unrecognized_keywords_are_skipped() -> Result<()> {
        let fm = FrontMatter {
            format: Format::Json,
            raw: "{\n\"keywords\": {\"a\": 1},\n\"title\": \"T\"\n}\n".to_owned(),
        };
        let metadata = fm.parse()?;
        assert!(metadata.keywords.is_empty());
        assert_eq!("T", metadata.title);
        Ok(())
    }

    #[test]
    fn test_parse_numeric_json_title() -> Result<()> {
        let fm = FrontMatter {
            format: Format::Json,
            raw: "{\n\"title\": 1984,\n\"keywords\": [\"a\", 2]\n}\n".to_owned(),
        };
        let metadata = fm.parse()?;
        assert_eq!("1984", metadata.title);
        assert_eq!(vec!["a".to_owned(), "2".to_owned()], metadata.keywords);
        Ok(())
    }

    #[test]
    fn test_normalize_eol_borrows_when_unchanged() {
        assert!(matches!(normalize_eol("a\nb\n"), Cow::Borrowed("a\nb\n")));
        assert_eq!("a\nb\n", normalize_eol("a\r\nb\r\n"));
    }

    #[test]
    fn test_parse_empty_yaml() -> Result<()> {
        let fm = FrontMatter {
            format: Format::Yaml,
            raw: String::new(),
        };
        assert_eq!(Metadata::default(), fm.parse()?);
        Ok(())
    }

    #[test]
    fn test_parse_invalid_json() {
        let fm = FrontMatter {
            format: Format::Json,
            raw: "{\n\"title\": \n}\n".to_owned(),
        };
        assert!(matches!(fm.parse(), Err(Error::Json(_))));
    }

    #[test]
    fn test_extract_crlf() -> Result<()> {
        let (metadata, body) =
            FencedExtractor.extract("---\r\ntitle: Hi\r\n---\r\nbody\r\n")?;
        assert_eq!("Hi", metadata.title);
        assert_eq!("body\n", body);
        Ok(())
    }
}
