//! Defines the [`Post`] type, the leaf of the blog index, and the logic for
//! building one from a filed document's [`Metadata`].

use serde::{Deserialize, Serialize};

use crate::date::Ymd;
use crate::frontmatter::Metadata;

/// A person credited on a post.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Creator {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub orcid: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// One published document. Only `slug` and `document` are always present in
/// the JSON; every other field is omitted when empty.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Post {
    /// The document's file name less its extension. Unique within a day.
    pub slug: String,

    /// Where the filed copy of the document lives.
    pub document: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(rename = "subtitle", skip_serializing_if = "String::is_empty")]
    pub sub_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub byline: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub series: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(rename = "abstract", skip_serializing_if = "String::is_empty")]
    pub abstract_: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lang: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub direction: String,
    #[serde(skip_serializing_if = "is_false")]
    pub draft: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<Creator>,

    /// The post's creation date, `YYYY-MM-DD`.
    #[serde(rename = "date", skip_serializing_if = "String::is_empty")]
    pub created: String,

    /// The date the post was last filed, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Post {
    /// Builds a post from a filed document.
    ///
    /// * `slug` and `document` identify the filed copy.
    /// * `metadata` comes from the document's front matter. Fields it lacks
    ///   stay empty; the document body is never consulted.
    /// * `ymd` is the date the document was filed under. It becomes the
    ///   creation date unless the metadata has a `date`.
    /// * `today` becomes the update date unless the metadata has `updated`.
    pub fn from_metadata(
        slug: String,
        document: String,
        metadata: Metadata,
        ymd: &Ymd,
        today: &str,
    ) -> Post {
        Post {
            slug,
            document,
            title: metadata.title,
            sub_title: metadata.subtitle,
            byline: metadata.byline,
            series: metadata.series,
            number: metadata.number,
            subject: metadata.subject,
            keywords: metadata.keywords,
            abstract_: metadata.abstract_,
            description: metadata.description,
            category: metadata.category,
            lang: metadata.lang,
            direction: metadata.direction,
            draft: metadata.draft,
            creators: metadata.creators,
            created: metadata.date.unwrap_or_else(|| ymd.to_string()),
            updated: metadata.updated.unwrap_or_else(|| today.to_owned()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd() -> Ymd {
        Ymd::new("2020", "05", "01")
    }

    #[test]
    fn test_from_metadata_defaults() {
        let post = Post::from_metadata(
            "hello".to_owned(),
            "blog/2020/05/01/hello.md".to_owned(),
            Metadata::default(),
            &ymd(),
            "2021-01-02",
        );
        assert_eq!(
            Post {
                slug: "hello".to_owned(),
                document: "blog/2020/05/01/hello.md".to_owned(),
                created: "2020-05-01".to_owned(),
                updated: "2021-01-02".to_owned(),
                ..Post::default()
            },
            post
        );
    }

    #[test]
    fn test_from_metadata_overrides() {
        let metadata = Metadata {
            title: "From front matter".to_owned(),
            byline: "By Someone".to_owned(),
            draft: true,
            date: Some("2019-12-31".to_owned()),
            updated: Some("2020-01-01".to_owned()),
            ..Metadata::default()
        };
        let post = Post::from_metadata(
            "x".to_owned(),
            "x.md".to_owned(),
            metadata,
            &ymd(),
            "2021-01-02",
        );
        assert_eq!("From front matter", post.title);
        assert_eq!("By Someone", post.byline);
        assert!(post.draft);
        assert_eq!("2019-12-31", post.created);
        assert_eq!("2020-01-01", post.updated);
    }

    #[test]
    fn test_serialize_sparse() {
        let post = Post {
            slug: "s".to_owned(),
            document: "d".to_owned(),
            title: "T".to_owned(),
            ..Post::default()
        };
        assert_eq!(
            r#"{"slug":"s","document":"d","title":"T"}"#,
            serde_json::to_string(&post).unwrap()
        );
    }
}
