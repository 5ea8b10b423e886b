//! Loads [`Settings`] from a `datebook.yaml` project file. The file is looked
//! up in the starting directory and then in each of its parents, so the tool
//! can be run from anywhere inside a blog's tree.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The project file's name.
pub const PROJECT_FILE_NAME: &str = "datebook.yaml";

/// Blog-wide settings. Every field is optional so that settings from several
/// sources can be layered with [`Settings::or`].
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// The directory that holds `YYYY/MM/DD` and `blog.json`.
    pub prefix: Option<PathBuf>,

    pub name: Option<String>,
    pub quip: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub copyright: Option<String>,
    pub license: Option<String>,
    pub language: Option<String>,
    pub started: Option<String>,
    pub ended: Option<String>,
    pub index_tmpl: Option<String>,
    pub post_tmpl: Option<String>,
}

impl Settings {
    /// Searches `dir` and its ancestors for a project file and loads the first
    /// one found. A relative `prefix` in the file is resolved against the
    /// file's directory. Returns empty settings if there is no project file.
    pub fn from_directory(dir: &Path) -> Result<Settings> {
        for dir in dir.ancestors() {
            let path = dir.join(PROJECT_FILE_NAME);
            if path.is_file() {
                return Settings::from_project_file(&path)
                    .map_err(|e| anyhow!("Loading configuration: {:#}", e));
            }
        }
        Ok(Settings::default())
    }

    /// Loads settings from the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Settings> {
        let mut settings: Settings = serde_yaml::from_reader(open(path, "project")?)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        settings.prefix = Some(match settings.prefix {
            Some(prefix) => project_root.join(prefix),
            None => project_root.to_owned(),
        });
        settings.validate()?;
        Ok(settings)
    }

    /// Layers `self` over `fallback`: every field set in `self` wins.
    pub fn or(self, fallback: Settings) -> Settings {
        Settings {
            prefix: self.prefix.or(fallback.prefix),
            name: self.name.or(fallback.name),
            quip: self.quip.or(fallback.quip),
            description: self.description.or(fallback.description),
            url: self.url.or(fallback.url),
            copyright: self.copyright.or(fallback.copyright),
            license: self.license.or(fallback.license),
            language: self.language.or(fallback.language),
            started: self.started.or(fallback.started),
            ended: self.ended.or(fallback.ended),
            index_tmpl: self.index_tmpl.or(fallback.index_tmpl),
            post_tmpl: self.post_tmpl.or(fallback.post_tmpl),
        }
    }

    /// The blog's root directory, defaulting to the working directory.
    pub fn prefix(&self) -> &Path {
        self.prefix.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Checks that `url`, when given, is an absolute URL.
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            url::Url::parse(url).map_err(|e| anyhow!("Invalid blog url `{}`: {}", url, e))?;
        }
        Ok(())
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).map_err(|e| anyhow!("Opening {} file `{}`: {}", kind, path.display(), e))
}
