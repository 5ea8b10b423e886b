//! Files documents into a blog's `{prefix}/YYYY/MM/DD/` tree and records them
//! in a [`BlogIndex`]. See [`Filer::file`] for adding one post and
//! [`Filer::rebuild`] for reconstructing a year of the index from disk.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::date::{Clock, SystemClock, Ymd};
use crate::frontmatter::{Extract, FencedExtractor};
use crate::index::{BlogIndex, Error, Result};
use crate::post::Post;

/// File extensions that [`Filer::rebuild`] treats as posts.
pub const POST_EXTENSIONS: [&str; 5] = ["md", "rst", "textile", "jira", "txt"];

/// Days per month scanned by [`Filer::rebuild`]. February always gets 29;
/// day directories that don't exist are skipped anyway.
const MONTH_DAYS: [(&str, u32); 12] = [
    ("01", 31),
    ("02", 29),
    ("03", 31),
    ("04", 30),
    ("05", 31),
    ("06", 30),
    ("07", 31),
    ("08", 31),
    ("09", 30),
    ("10", 31),
    ("11", 30),
    ("12", 31),
];

/// Files documents into a blog. Holds the collaborators that filing needs:
/// a [`Clock`] for "today" and an [`Extract`]or for front matter.
#[derive(Clone, Copy)]
pub struct Filer<'a> {
    clock: &'a dyn Clock,
    extractor: &'a dyn Extract,
}

impl Default for Filer<'static> {
    /// A filer using the system clock and fenced front matter.
    fn default() -> Self {
        Filer::new(&SystemClock, &FencedExtractor)
    }
}

impl<'a> Filer<'a> {
    /// Constructs a new filer. See fields on [`Filer`] for argument
    /// descriptions.
    pub fn new(clock: &'a dyn Clock, extractor: &'a dyn Extract) -> Filer<'a> {
        Filer { clock, extractor }
    }

    /// Copies the document at `source` to `{prefix}/YYYY/MM/DD/` and adds it to
    /// `index` (or updates it, if a post with the same slug was already filed
    /// on that day). `date` is `YYYY-MM-DD`.
    ///
    /// The copy and the index update are not atomic: if the document's front
    /// matter can't be parsed, the copy stays on disk and `index` is left as it
    /// was.
    pub fn file(
        &self,
        index: &mut BlogIndex,
        prefix: &Path,
        source: &Path,
        date: &str,
    ) -> Result<()> {
        let ymd: Ymd = date.parse()?;
        let target = copy_into(&ymd.dir(prefix), source)?;
        self.record(index, &ymd, &target)
    }

    /// Copies a non-post file (an image, an audio file, ...) into
    /// `{prefix}/YYYY/MM/DD/` without touching the index. Returns the path of
    /// the copy.
    pub fn file_asset(&self, prefix: &Path, source: &Path, date: &str) -> Result<PathBuf> {
        let ymd: Ymd = date.parse()?;
        let target = copy_into(&ymd.dir(prefix), source)?;
        tracing::debug!(asset = %target.display(), "filed asset");
        Ok(target)
    }

    /// "Today" according to this filer's clock.
    pub fn today(&self) -> String {
        self.clock.today()
    }

    /// Scans `{prefix}/{year}/MM/DD/` for every month and day of `year` and
    /// records every post found there (see [`POST_EXTENSIONS`]), as if each
    /// had just been filed. Missing directories are skipped. Entries for
    /// documents that no longer exist are not removed. Stops at the first
    /// document that fails to parse. Returns the number of posts recorded.
    pub fn rebuild(&self, index: &mut BlogIndex, prefix: &Path, year: &str) -> Result<usize> {
        let mut recorded = 0;
        for (month, days) in MONTH_DAYS.iter() {
            for day in 1..=*days {
                let ymd = Ymd::new(year, month, &format!("{:02}", day));
                for document in post_files(&ymd.dir(prefix))? {
                    self.record(index, &ymd, &document)?;
                    recorded += 1;
                }
            }
        }
        tracing::info!(year, recorded, prefix = %prefix.display(), "rebuilt blog index");
        Ok(recorded)
    }

    // Parses the filed document at `document` and puts it into `index` under
    // `ymd`.
    fn record(&self, index: &mut BlogIndex, ymd: &Ymd, document: &Path) -> Result<()> {
        let contents = std::fs::read(document).map_err(io_error(document))?;
        let (metadata, _) = self
            .extractor
            .extract(&String::from_utf8_lossy(&contents))
            .map_err(|err| Error::FrontMatter {
                path: document.to_owned(),
                err,
            })?;

        let slug = document
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let today = self.clock.today();
        let post = Post::from_metadata(
            slug,
            document.to_string_lossy().into_owned(),
            metadata,
            ymd,
            &today,
        );

        let position = index.insert(ymd, post);
        index.updated = today;
        tracing::debug!(
            document = %document.display(),
            date = %ymd,
            position,
            "recorded post"
        );
        Ok(())
    }
}

impl BlogIndex {
    /// [`Filer::file`] with the system clock and fenced front matter.
    pub fn file(&mut self, prefix: &Path, source: &Path, date: &str) -> Result<()> {
        Filer::default().file(self, prefix, source, date)
    }

    /// [`Filer::rebuild`] with the system clock and fenced front matter.
    pub fn rebuild(&mut self, prefix: &Path, year: &str) -> Result<usize> {
        Filer::default().rebuild(self, prefix, year)
    }
}

// Copies `source` into `dir` (creating it if needed) under its own file name,
// overwriting any file already there.
fn copy_into(dir: &Path, source: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| Error::SourceNotFound(source.to_owned()))?;
    let mut input = File::open(source).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::SourceNotFound(source.to_owned()),
        _ => Error::Io {
            path: source.to_owned(),
            err,
        },
    })?;

    std::fs::create_dir_all(dir).map_err(io_error(dir))?;
    let target = dir.join(file_name);

    // Re-filing the already filed copy; truncating it would lose the document.
    if same_file(source, &target) {
        return Ok(target);
    }

    let mut output = File::create(&target).map_err(io_error(&target))?;
    io::copy(&mut input, &mut output).map_err(io_error(&target))?;
    Ok(target)
}

// Annotates an I/O error with the path involved.
fn io_error(path: &Path) -> impl FnOnce(io::Error) -> Error {
    let path = path.to_owned();
    move |err| Error::Io { path, err }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// Lists the post documents directly inside `dir`, sorted by name. A missing
// `dir` has no posts.
fn post_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(io_error(dir)(err)),
    };

    let mut files = Vec::new();
    for result in entries {
        let entry = result.map_err(io_error(dir))?;
        let path = entry.path();
        let is_post = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| POST_EXTENSIONS.contains(&ext));
        if !is_post {
            continue;
        }
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}
