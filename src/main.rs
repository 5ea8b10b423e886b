use anyhow::Result;
use clap::{App, Arg, ArgMatches};
use datebook::command::{self, Invocation, Mode, Outcome};
use datebook::config::Settings;
use datebook::filer::Filer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const ABOUT: &str = "Adds or replaces a blog post in a date-oriented directory tree \
(PREFIX/YYYY/MM/DD) and keeps PREFIX/blog.json up to date.";

const EXAMPLES: &str = "EXAMPLES:
    File my-vacation-day.md under July 1, 2020:
        datebook my-vacation-day.md 2020-07-01

    File an audio file next to it, without indexing it:
        datebook --prefix podcast --asset my-vacation.wav 2020-07-01

    Rebuild blog.json from what is on disk for 2019 and 2020:
        datebook --prefix blog --refresh 2019,2020

    Show the byline in the body of a draft:
        datebook --byline draft.md";

// Blog-wide settings that can be given as flags: (name, short, help).
static SETTING_FLAGS: [(&str, &str, &str); 11] = [
    ("name", "N", "Set the blog name"),
    ("quip", "Q", "Set the blog quip"),
    ("description", "D", "Set the blog description"),
    ("url", "U", "Set the blog's URL"),
    ("copyright", "C", "Set the blog copyright notice"),
    ("license", "", "Set the blog license"),
    ("language", "L", "Set the blog language"),
    ("started", "S", "Set the blog started date"),
    ("ended", "E", "Set the blog ended date"),
    ("index-tmpl", "", "Set the blog index template"),
    ("post-tmpl", "", "Set the blog post template"),
];

fn main() {
    let matches = app().get_matches();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if matches.is_present("verbose") {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(&matches) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn app() -> App<'static, 'static> {
    let mut app = App::new("datebook")
        .version(clap::crate_version!())
        .about(ABOUT)
        .after_help(EXAMPLES)
        .arg(
            Arg::with_name("DOCUMENT")
                .help("The document to file")
                .index(1),
        )
        .arg(
            Arg::with_name("DATE")
                .help("The date to file the document under (YYYY-MM-DD); defaults to today")
                .index(2),
        )
        .arg(
            Arg::with_name("prefix")
                .short("P")
                .long("prefix")
                .value_name("DIR")
                .takes_value(true)
                .help("Set the prefix path before YYYY/MM/DD"),
        )
        .arg(
            Arg::with_name("refresh")
                .short("R")
                .long("refresh")
                .value_name("YEARS")
                .takes_value(true)
                .conflicts_with("DOCUMENT")
                .help("Rebuild blog.json for a comma-separated list of years"),
        )
        .arg(
            Arg::with_name("asset")
                .short("a")
                .long("asset")
                .requires("DOCUMENT")
                .help("Copy DOCUMENT into the dated directory without indexing it"),
        )
        .arg(
            Arg::with_name("byline")
                .long("byline")
                .requires("DOCUMENT")
                .conflicts_with_all(&["asset", "title"])
                .help("Print the first byline found in DOCUMENT's body"),
        )
        .arg(
            Arg::with_name("title")
                .long("title")
                .requires("DOCUMENT")
                .conflicts_with("asset")
                .help("Print the first level-one heading in DOCUMENT's body"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("V")
                .long("verbose")
                .help("Verbose output"),
        );

    for &(name, short, help) in SETTING_FLAGS.iter() {
        let mut arg = Arg::with_name(name)
            .long(name)
            .value_name("VALUE")
            .takes_value(true)
            .help(help);
        if !short.is_empty() {
            arg = arg.short(short);
        }
        app = app.arg(arg);
    }
    app
}

fn settings_from_flags(matches: &ArgMatches) -> Settings {
    let value = |name: &str| matches.value_of(name).map(str::to_owned);
    Settings {
        prefix: matches.value_of("prefix").map(PathBuf::from),
        name: value("name"),
        quip: value("quip"),
        description: value("description"),
        url: value("url"),
        copyright: value("copyright"),
        license: value("license"),
        language: value("language"),
        started: value("started"),
        ended: value("ended"),
        index_tmpl: value("index-tmpl"),
        post_tmpl: value("post-tmpl"),
    }
}

fn invocation(matches: &ArgMatches) -> Invocation {
    let mode = if matches.is_present("asset") {
        Mode::Asset
    } else if matches.is_present("byline") {
        Mode::Byline
    } else if matches.is_present("title") {
        Mode::Title
    } else {
        Mode::Post
    };
    Invocation {
        flags: settings_from_flags(matches),
        document: matches.value_of("DOCUMENT").map(PathBuf::from),
        date: matches.value_of("DATE").map(str::to_owned),
        refresh: matches.value_of("refresh").map(str::to_owned),
        mode,
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let project = Settings::from_directory(&std::env::current_dir()?)?;
    match command::run(&Filer::default(), project, invocation(matches))? {
        Outcome::Refreshed {
            blog_json,
            years,
            recorded,
        } => println!(
            "Refreshed {} from {} ({} posts).",
            blog_json.display(),
            years.join(", "),
            recorded
        ),
        Outcome::Updated { blog_json } => println!("Updated {}.", blog_json.display()),
        Outcome::Filed { blog_json, date } => {
            println!("Filed under {}, updated {}.", date, blog_json.display())
        }
        Outcome::Asset { target } => println!("Added asset {}", target.display()),
        Outcome::Found(Some(text)) => println!("{}", text),
        Outcome::Found(None) => {}
    }
    Ok(())
}
