//! Finds a title and a byline in a document's body. Filing never uses these;
//! they back the `--title` and `--byline` lookups of the command line.

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;

/// The default byline pattern: a line starting with `By` (or `by`) and ending
/// in a `YYYY-MM-DD` date, e.g. `By R. S. Doiel, 2020-05-01`.
pub const BYLINE_PATTERN: &str =
    r"^[Bb]y\s+.+[0-9][0-9][0-9][0-9]-[0-1][0-9]-[0-3][0-9]$";

static BYLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(BYLINE_PATTERN).expect("valid byline regex"));

/// Returns the first line of `text` that looks like a byline.
pub fn byline(text: &str) -> Option<&str> {
    byline_matching(&BYLINE_RE, text)
}

/// Like [`byline`] but with a caller-supplied pattern, which is matched
/// against one line at a time.
pub fn byline_matching<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    text.lines()
        .find_map(|line| re.find(line.trim_end()).map(|m| m.as_str()))
}

/// Returns the text of the first level-one heading in `markdown`.
pub fn title(markdown: &str) -> Option<String> {
    let mut in_heading = false;
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading(1)) => in_heading = true,
            Event::End(Tag::Heading(1)) => {
                let title = text.trim();
                if !title.is_empty() {
                    return Some(title.to_owned());
                }
                in_heading = false;
                text.clear();
            }
            Event::Text(s) | Event::Code(s) if in_heading => text.push_str(&s),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_byline() {
        let text = "# Hello\n\nBy R. S. Doiel, 2020-05-01\n\nBody text.\n";
        assert_eq!(Some("By R. S. Doiel, 2020-05-01"), byline(text));
    }

    #[test]
    fn test_byline_static_pattern() {
        assert_eq!(BYLINE_PATTERN, BYLINE_RE.as_str());
        assert_eq!(Some("By A 2020-01-01"), byline("By A 2020-01-01"));
        assert_eq!(Some("By B 2020-01-02"), byline("x\nBy B 2020-01-02"));
    }

    #[test]
    fn test_byline_requires_date() {
        assert_eq!(None, byline("By R. S. Doiel\n\nBody.\n"));
        assert_eq!(None, byline("Standing by 2020-05-01\n"));
    }

    #[test]
    fn test_byline_crlf() {
        assert_eq!(
            Some("by Jane 2021-12-31"),
            byline("intro\r\nby Jane 2021-12-31\r\n")
        );
    }

    #[test]
    fn test_byline_matching_custom_pattern() {
        let re = Regex::new(r"^Author: .+$").unwrap();
        assert_eq!(
            Some("Author: Jane"),
            byline_matching(&re, "x\nAuthor: Jane\n")
        );
    }

    #[test]
    fn test_title() {
        assert_eq!(
            Some("Hello World!".to_owned()),
            title("Intro\n\n## Not this\n\n# Hello `World`!\n\n# Later\n")
        );
    }

    #[test]
    fn test_title_missing() {
        assert_eq!(None, title("## Only level two\n\ntext\n"));
        assert_eq!(None, title(""));
    }
}
