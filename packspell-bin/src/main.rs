use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use gumdrop::Options;
use serde::Serialize;

use packspell::compress::DictionaryStats;
use packspell::loader::{dictionary_files, FileLoader, WordSource};
use packspell::speller::suggestion::Suggestion;
use packspell::speller::{EngineConfig, LoadMode, SpellCheckEngine, Speller};
use packspell::tokenizer::Tokenize;
use packspell::transform::Transformation;

trait OutputWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool);
    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]);
    fn finish(&mut self);
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        println!(
            "Input: {}\t\t[{}]",
            &word,
            if is_correct { "CORRECT" } else { "INCORRECT" }
        );
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &[Suggestion]) {
        for sugg in suggestions {
            println!("{}\t\t{}", sugg.value, sugg.distance);
        }
        println!();
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
struct SuggestionRequest {
    word: String,
    is_correct: bool,
    suggestions: Vec<Suggestion>,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<SuggestionRequest>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }
}

impl OutputWriter for JsonWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        self.results.push(SuggestionRequest {
            word: word.to_owned(),
            is_correct,
            suggestions: vec![],
        });
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &[Suggestion]) {
        if let Some(last) = self.results.last_mut() {
            last.suggestions = suggestions.to_vec();
        }
    }

    fn finish(&mut self) {
        match serde_json::to_string_pretty(self) {
            Ok(v) => println!("{}", v),
            Err(e) => eprintln!("{}", e),
        }
    }
}

fn run(
    speller: &dyn Speller,
    words: Vec<String>,
    writer: &mut dyn OutputWriter,
    is_always_suggesting: bool,
    suggest_cfg: &EngineConfig,
) {
    for word in words {
        let is_correct = speller.is_correct(&word);
        writer.write_correction(&word, is_correct);

        if is_always_suggesting || !is_correct {
            let suggestions = speller.suggest_with_config(&word, suggest_cfg);
            writer.write_suggestions(&word, &suggestions);
        }
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "check words and get suggestions for misspelled ones")]
    Check(CheckArgs),

    #[options(help = "print input in word-separated tokenized form")]
    Tokenize(TokenizeArgs),

    #[options(help = "print compression statistics for dictionaries")]
    Stats(StatsArgs),

    #[options(help = "generate a dictionary from the words in text files")]
    Generate(GenerateArgs),
}

#[derive(Debug, Options)]
struct CheckArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "d", help = "word list to check against (repeatable)")]
    dictionary: Vec<PathBuf>,

    #[options(short = "f", help = "load every .dic file below this folder")]
    folder: Option<PathBuf>,

    #[options(short = "u", help = "user dictionary word list")]
    user: Option<PathBuf>,

    #[options(no_short, long = "config", help = "engine configuration in JSON format")]
    config: Option<PathBuf>,

    #[options(short = "S", help = "always show suggestions even if word is correct")]
    always_suggest: bool,

    #[options(help = "maximum number of results")]
    nbest: Option<usize>,

    #[options(help = "allowed distance from the best suggestion")]
    quality: Option<usize>,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct TokenizeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "w", long = "words", help = "show words only")]
    is_words_only: bool,

    #[options(free, help = "text to be tokenized")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct StatsArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "f", help = "also load every .dic file below this folder")]
    folder: Option<PathBuf>,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "word lists to compress")]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Options)]
struct GenerateArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "o", help = "dictionary file to write", required)]
    output: PathBuf,

    #[options(no_short, help = "file name pattern of sources (default: *.txt)")]
    pattern: Option<String>,

    #[options(free, help = "folders to collect words from")]
    inputs: Vec<PathBuf>,
}

fn read_stdin() -> anyhow::Result<String> {
    eprintln!("Reading from stdin...");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    Ok(buffer)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let path = match path {
        Some(v) => v,
        None => return Ok(EngineConfig::default()),
    };

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let config = serde_json::from_reader(file)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

fn sources(files: &[PathBuf], folder: Option<&Path>) -> Vec<Arc<dyn WordSource>> {
    let found = folder.map(dictionary_files).unwrap_or_default();

    files
        .iter()
        .chain(found.iter())
        .map(|path| Arc::new(FileLoader::new(path)) as Arc<dyn WordSource>)
        .collect()
}

fn check(args: CheckArgs) -> anyhow::Result<()> {
    let mut suggest_cfg = load_config(args.config.as_deref())?;
    suggest_cfg.load_mode = LoadMode::Blocking;

    if let Some(v) = args.nbest {
        suggest_cfg.n_best = v;
    }

    if let Some(v) = args.quality {
        suggest_cfg.quality = v;
    }

    let engine = SpellCheckEngine::new(suggest_cfg.clone());

    for source in sources(&args.dictionary, args.folder.as_deref()) {
        engine
            .load_dictionary_blocking(source.clone())
            .with_context(|| format!("loading {}", source.name()))?;
    }

    if let Some(path) = args.user.as_ref() {
        let count = engine.load_user_words(&FileLoader::new(path))?;
        log::debug!("{} user words", count);
    }

    if engine.dictionary_stats().is_empty() && engine.get_editable_words().is_empty() {
        eprintln!("No dictionaries given, every word will be accepted.");
    }

    let mut writer: Box<dyn OutputWriter> = if args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    };

    let words = if args.inputs.is_empty() {
        read_stdin()?
            .trim()
            .split('\n')
            .map(|x| x.trim().to_string())
            .collect()
    } else {
        args.inputs
    };

    run(
        &engine,
        words,
        &mut *writer,
        args.always_suggest,
        &suggest_cfg,
    );

    writer.finish();

    Ok(())
}

fn tokenize(args: TokenizeArgs) -> anyhow::Result<()> {
    let inputs: String = if args.inputs.is_empty() {
        read_stdin()?
    } else {
        args.inputs.join(" ")
    };

    if args.is_words_only {
        for (index, token) in inputs.word_indices() {
            println!("{:>4}: \"{}\"", index, token);
        }
    } else {
        for (index, token) in inputs.word_bound_indices() {
            println!("{:>4}: \"{}\"", index, token);
        }
    }

    Ok(())
}

fn stats(args: StatsArgs) -> anyhow::Result<()> {
    let engine = SpellCheckEngine::new(EngineConfig::blocking());

    for source in sources(&args.inputs, args.folder.as_deref()) {
        engine
            .load_dictionary_blocking(source.clone())
            .with_context(|| format!("loading {}", source.name()))?;
    }

    let stats: Vec<DictionaryStats> = engine.dictionary_stats();

    if args.use_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    for s in stats {
        println!("{}", s.name);
        println!("  words:           {}", s.words);
        println!("  alphabet:        {}", s.alphabet_size);
        println!("  bits per symbol: {}", s.bits_per_symbol);
        println!("  packed bytes:    {}", s.packed_bytes);
        for bucket in s.buckets {
            println!("    {:>3} bytes x {}", bucket.record_len, bucket.words);
        }
    }

    Ok(())
}

fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let pattern = args.pattern.as_deref().unwrap_or("*.txt");
    let transform = Transformation::new();
    let mut words = BTreeSet::new();

    for folder in args.inputs.iter() {
        let walker = globwalk::GlobWalkerBuilder::new(folder, pattern)
            .file_type(globwalk::FileType::FILE)
            .build()
            .with_context(|| format!("scanning {}", folder.display()))?;

        for entry in walker.filter_map(Result::ok) {
            let text = match std::fs::read_to_string(entry.path()) {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            words.extend(text.words().filter_map(|w| transform.transform(w)));
        }
    }

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut out = BufWriter::new(file);
    for word in words.iter() {
        writeln!(out, "{}", word)?;
    }
    out.flush()?;

    eprintln!("Wrote {} words to {}", words.len(), args.output.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command {
        None => Ok(()),
        Some(Command::Check(args)) => check(args),
        Some(Command::Tokenize(args)) => tokenize(args),
        Some(Command::Stats(args)) => stats(args),
        Some(Command::Generate(args)) => generate(args),
    }
}
