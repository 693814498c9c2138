use chrono::prelude::*;
use std::error::Error;
use std::sync::Arc;
use std::{
    io::Write,
    time::{Instant, SystemTime},
};

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use packspell::compress::DictionaryStats;
use packspell::loader::{FileLoader, WordSource};
use packspell::metrics::{LevenshteinDistance, Metrics};
use packspell::speller::suggestion::Suggestion;
use packspell::speller::{EngineConfig, LoadMode, SpellCheckEngine, Speller};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use structopt::clap::{App, AppSettings, Arg};

static CFG: EngineConfig = EngineConfig {
    n_best: 10,
    quality: 2,
    min_word_length: 3,
    case_restoration: true,
    load_mode: LoadMode::Blocking,
};

fn load_words(
    path: &str,
    max_words: Option<usize>,
) -> Result<Vec<(String, String)>, Box<dyn Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    Ok(rdr
        .records()
        .filter_map(Result::ok)
        .filter_map(|r| {
            r.get(0)
                .and_then(|x| r.get(1).map(|y| (x.to_string(), y.to_string())))
        })
        .take(max_words.unwrap_or(std::usize::MAX))
        .collect())
}

#[derive(Debug, Default, Serialize, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
struct Time {
    secs: u64,
    subsec_nanos: u32,
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let ms = self.secs * 1000 + (self.subsec_nanos as u64 / 1_000_000);
        write!(f, "{}ms", ms)
    }
}

impl From<std::time::Duration> for Time {
    fn from(d: std::time::Duration) -> Time {
        Time {
            secs: d.as_secs(),
            subsec_nanos: d.subsec_nanos(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AccuracyResult<'a> {
    input: &'a str,
    expected: &'a str,
    distance: usize,
    is_correct: bool,
    suggestions: Vec<Suggestion>,
    position: Option<usize>,
    time: Time,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    dictionaries: Vec<DictionaryStats>,
    config: &'a EngineConfig,
    summary: Summary,
    results: Vec<AccuracyResult<'a>>,
    start_timestamp: Time,
    total_time: Time,
}

#[derive(Serialize, Default, Debug, Clone)]
struct Summary {
    total_words: u32,
    first_position: u32,
    top_five: u32,
    any_position: u32,
    no_suggestions: u32,
    only_wrong: u32,
    accepted_typos: u32,
    slowest_lookup: Time,
    fastest_lookup: Time,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let percent = |v: u32| -> String {
            if self.total_words == 0 {
                return "-".into();
            }
            format!("{:.2}%", v as f32 / self.total_words as f32 * 100f32)
        };

        write!(
            f,
            "[#1] {} [^5] {} [any] {} [none] {} [wrong] {} [accepted] {} [fast] {} [slow] {}",
            percent(self.first_position),
            percent(self.top_five),
            percent(self.any_position),
            percent(self.no_suggestions),
            percent(self.only_wrong),
            percent(self.accepted_typos),
            self.fastest_lookup,
            self.slowest_lookup
        )
    }
}

impl Summary {
    fn new<'a>(results: &[AccuracyResult<'a>]) -> Summary {
        let mut summary = Summary::default();

        results.iter().for_each(|result| {
            summary.total_words += 1;

            if result.is_correct {
                summary.accepted_typos += 1;
            }

            if let Some(position) = result.position {
                summary.any_position += 1;

                if position == 0 {
                    summary.first_position += 1;
                }

                if position < 5 {
                    summary.top_five += 1;
                }
            } else if result.suggestions.is_empty() {
                summary.no_suggestions += 1;
            } else {
                summary.only_wrong += 1;
            }
        });

        summary.slowest_lookup = results.iter().map(|x| x.time).max().unwrap_or_default();
        summary.fastest_lookup = results.iter().map(|x| x.time).min().unwrap_or_default();

        summary
    }
}

fn git_output(args: &[&str]) -> Result<String, Box<dyn Error>> {
    let output = std::process::Command::new("git").args(args).output()?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let matches = App::new("packspell-accuracy")
        .setting(AppSettings::ArgRequiredElseHelp)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Accuracy testing for packspell.")
        .arg(
            Arg::with_name("config")
                .short("c")
                .takes_value(true)
                .help("Provide JSON config file to override test defaults"),
        )
        .arg(
            Arg::with_name("words")
                .value_name("WORDS")
                .required(true)
                .help("The 'input -> expected' list in tab-delimited value file (TSV)"),
        )
        .arg(
            Arg::with_name("dictionary")
                .short("d")
                .value_name("DICTIONARY")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .required(true)
                .help("Word list to check against; may be given several times"),
        )
        .arg(
            Arg::with_name("json-output")
                .short("o")
                .value_name("JSON-OUTPUT")
                .help("The file path for the JSON report output"),
        )
        .arg(
            Arg::with_name("tsv-output")
                .short("t")
                .value_name("TSV-OUTPUT")
                .help("The file path for the TSV line append"),
        )
        .arg(
            Arg::with_name("max-words")
                .short("w")
                .takes_value(true)
                .help("Truncate typos list to max number of words specified"),
        )
        .get_matches();

    let mut cfg: EngineConfig = match matches.value_of("config") {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            serde_json::from_reader(file)?
        }
        None => CFG.clone(),
    };
    cfg.load_mode = LoadMode::Blocking;

    let engine = SpellCheckEngine::new(cfg.clone());
    for path in matches.values_of("dictionary").into_iter().flatten() {
        let source: Arc<dyn WordSource> = Arc::new(FileLoader::new(path));
        engine.load_dictionary_blocking(source)?;
    }

    let words = match matches.value_of("words") {
        Some(path) => load_words(
            path,
            matches
                .value_of("max-words")
                .and_then(|x| x.parse::<usize>().ok()),
        )?,
        None => {
            eprintln!("No word list for given path; aborting.");
            std::process::exit(1);
        }
    };

    let pb = ProgressBar::new(words.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{pos}/{len} [{percent}%] {wide_bar} {elapsed_precise}"),
    );

    let metrics = LevenshteinDistance;
    let start_time = Instant::now();
    let results = words
        .par_iter()
        .progress_with(pb)
        .map(|(input, expected)| {
            let now = Instant::now();
            let is_correct = engine.is_correct(input);
            let suggestions = engine.suggest_with_config(input, &cfg);
            let time = Time::from(now.elapsed());

            let position = suggestions.iter().position(|x| x.value.as_str() == expected.as_str());

            AccuracyResult {
                input,
                expected,
                distance: metrics.distance(input, expected),
                is_correct,
                time,
                suggestions,
                position,
            }
        })
        .collect::<Vec<_>>();

    let total_time = Time::from(start_time.elapsed());
    let start_timestamp = Time::from(SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?);

    let summary = Summary::new(&results);
    println!("{}", summary);

    if let Some(path) = matches.value_of("json-output") {
        let output = std::fs::File::create(path)?;
        let report = Report {
            dictionaries: engine.dictionary_stats(),
            config: &cfg,
            summary,
            results,
            start_timestamp,
            total_time,
        };
        println!("Writing JSON report…");
        serde_json::to_writer_pretty(output, &report)?;
    } else if let Some(path) = matches.value_of("tsv-output") {
        let mut output = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let md = output.metadata()?;
        if md.len() == 0 {
            // new file, write headers:
            output.write_all(
                b"id\tdate\ttag/branch\ttop1\ttop5\tworse\tno suggs\twrong suggs\taccepted\n",
            )?;
        }

        let row = [
            git_output(&["rev-parse", "--short", "HEAD"])?,
            Local::now().to_rfc3339(),
            git_output(&["describe"])?,
            summary.first_position.to_string(),
            summary.top_five.to_string(),
            summary.any_position.to_string(),
            summary.no_suggestions.to_string(),
            summary.only_wrong.to_string(),
            summary.accepted_typos.to_string(),
        ];
        output.write_all(row.join("\t").as_bytes())?;
        output.write_all(b"\n")?;
    };

    println!("Done!");
    Ok(())
}
