//! The operations behind the `datebook` command line. Argument parsing stays
//! in the binary; everything it decides ends up as an [`Invocation`] handed to
//! [`run`].

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

use crate::body;
use crate::config::Settings;
use crate::date;
use crate::filer::Filer;
use crate::frontmatter::{Extract, FencedExtractor};
use crate::index::{BlogIndex, INDEX_FILE_NAME};

/// What to do with an invocation's document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// File it as a post and record it in `blog.json`.
    Post,

    /// Copy it into the dated directory without indexing it.
    Asset,

    /// Print the first byline found in its body.
    Byline,

    /// Print the first level-one heading of its body.
    Title,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Post
    }
}

/// One run of the command line, already parsed.
#[derive(Clone, Debug, Default)]
pub struct Invocation {
    /// Blog settings given as flags. Each one wins over the project file.
    pub flags: Settings,

    pub document: Option<PathBuf>,

    /// The `YYYY-MM-DD` date to file under. Defaults to today.
    pub date: Option<String>,

    /// A comma-separated list of years to rebuild from disk.
    pub refresh: Option<String>,

    pub mode: Mode,
}

/// What [`run`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Refreshed {
        blog_json: PathBuf,
        years: Vec<String>,
        recorded: usize,
    },
    Updated {
        blog_json: PathBuf,
    },
    Filed {
        blog_json: PathBuf,
        date: String,
    },
    Asset {
        target: PathBuf,
    },
    Found(Option<String>),
}

/// Carries out `invocation`. `project` holds the settings from the project
/// file, if any; the invocation's flags are layered over them. `blog.json` is
/// loaded from the resulting prefix and saved again after every command that
/// changes it.
pub fn run(filer: &Filer, project: Settings, invocation: Invocation) -> Result<Outcome> {
    let Invocation {
        flags,
        document,
        date,
        refresh,
        mode,
    } = invocation;

    if matches!(mode, Mode::Byline | Mode::Title) {
        let document =
            document.ok_or_else(|| anyhow!("--byline and --title need a DOCUMENT"))?;
        return lookup(&document, mode).map(Outcome::Found);
    }

    let flags_given = flags != Settings::default();
    let settings = flags.or(project);
    settings.validate()?;

    let prefix = settings.prefix();
    let blog_json = prefix.join(INDEX_FILE_NAME);
    let mut index = BlogIndex::load(&blog_json)?;
    index.apply(&settings);

    if let Some(years) = refresh {
        let years: Vec<String> = years
            .split(',')
            .map(str::trim)
            .filter(|year| !year.is_empty())
            .map(str::to_owned)
            .collect();
        let mut recorded = 0;
        for (i, year) in years.iter().enumerate() {
            tracing::info!(
                year = year.as_str(),
                step = i + 1,
                of = years.len(),
                "refreshing"
            );
            recorded += filer.rebuild(&mut index, prefix, year)?;
        }
        index.save(&blog_json)?;
        return Ok(Outcome::Refreshed {
            blog_json,
            years,
            recorded,
        });
    }

    let document = match document {
        Some(document) => document,
        None => {
            if !flags_given {
                return Err(anyhow!("No DOCUMENT given; see --help for usage"));
            }
            index.save(&blog_json)?;
            return Ok(Outcome::Updated { blog_json });
        }
    };

    let date = match date {
        Some(date) => {
            date::validate(&date).with_context(|| format!("Date error `{}`", date))?;
            date
        }
        None => filer.today(),
    };

    if mode == Mode::Asset {
        let target = filer.file_asset(prefix, &document, &date)?;
        return Ok(Outcome::Asset { target });
    }

    filer.file(&mut index, prefix, &document, &date)?;
    index.save(&blog_json)?;
    Ok(Outcome::Filed { blog_json, date })
}

fn lookup(document: &Path, mode: Mode) -> Result<Option<String>> {
    let contents = std::fs::read(document)
        .with_context(|| format!("Reading `{}`", document.display()))?;
    let (_, body) = FencedExtractor.extract(&String::from_utf8_lossy(&contents))?;
    Ok(match mode {
        Mode::Title => body::title(&body),
        _ => body::byline(&body).map(str::to_owned),
    })
}
