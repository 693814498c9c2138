//! Word sources: where dictionaries get their words from.
//!
//! The on-disk format is newline separated UTF-8, one word per line. Nothing
//! about files leaks past this module; dictionaries only see `&str`.

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use smol_str::SmolStr;

/// Errors raised while reading a word source.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LoadError {
    /// Underlying I/O failure
    #[error("failed to read '{name}'")]
    Io {
        /// name of the word source
        name: SmolStr,
        /// the I/O error
        #[source]
        source: std::io::Error,
    },

    /// A one-shot stream was asked to load a second time
    #[error("stream '{0}' has already been consumed")]
    Consumed(SmolStr),
}

/// A named, repeatable stream of raw words.
pub trait WordSource: Send + Sync {
    /// Identifier the dictionary built from this source is known by.
    fn name(&self) -> &str;

    /// Feeds every raw word to `consumer`, in source order.
    fn load(&self, consumer: &mut dyn FnMut(&str)) -> Result<(), LoadError>;
}

impl fmt::Debug for dyn WordSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WordSource({})", self.name())
    }
}

/// Words held in memory.
#[derive(Debug, Clone)]
pub struct WordList {
    name: SmolStr,
    words: Vec<SmolStr>,
}

impl WordList {
    /// Copies `words` into a named list.
    pub fn new<I, S>(name: &str, words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        WordList {
            name: name.into(),
            words: words.into_iter().map(|w| SmolStr::new(w.as_ref())).collect(),
        }
    }
}

impl WordSource for WordList {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, consumer: &mut dyn FnMut(&str)) -> Result<(), LoadError> {
        self.words.iter().for_each(|w| consumer(w));
        Ok(())
    }
}

/// A word list file, re-read on every load.
#[derive(Debug, Clone)]
pub struct FileLoader {
    name: SmolStr,
    path: PathBuf,
}

impl FileLoader {
    /// A loader named after its path.
    pub fn new<P: AsRef<Path>>(path: P) -> FileLoader {
        let path = path.as_ref().to_path_buf();
        FileLoader {
            name: path.to_string_lossy().into(),
            path,
        }
    }

    /// A file source with an explicit dictionary name.
    pub fn with_name<P: AsRef<Path>>(name: &str, path: P) -> FileLoader {
        FileLoader {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// File the words are read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WordSource for FileLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, consumer: &mut dyn FnMut(&str)) -> Result<(), LoadError> {
        let file = std::fs::File::open(&self.path).map_err(|source| LoadError::Io {
            name: self.name.clone(),
            source,
        })?;

        read_lines(&self.name, file, consumer)
    }
}

/// A one-shot reader, such as stdin or an embedded resource.
pub struct StreamLoader<R> {
    name: SmolStr,
    stream: Mutex<Option<R>>,
}

impl<R: Read + Send> StreamLoader<R> {
    /// Wraps a stream that can be read once.
    pub fn new(name: &str, stream: R) -> StreamLoader<R> {
        StreamLoader {
            name: name.into(),
            stream: Mutex::new(Some(stream)),
        }
    }
}

impl<R: Read + Send> WordSource for StreamLoader<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, consumer: &mut dyn FnMut(&str)) -> Result<(), LoadError> {
        let stream = self
            .stream
            .lock()
            .take()
            .ok_or_else(|| LoadError::Consumed(self.name.clone()))?;

        read_lines(&self.name, stream, consumer)
    }
}

fn read_lines<R: Read>(
    name: &SmolStr,
    reader: R,
    consumer: &mut dyn FnMut(&str),
) -> Result<(), LoadError> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(64);
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| LoadError::Io {
                name: name.clone(),
                source,
            })?;

        if n == 0 {
            return Ok(());
        }

        line_no += 1;

        match std::str::from_utf8(&buf) {
            Ok(line) => consumer(line.trim_end_matches(&['\n', '\r'][..])),
            Err(_) => log::warn!("{}: skipping line {}, not valid UTF-8", name, line_no),
        }
    }
}

/// Every `*.dic` file below `folder`, in path order.
///
/// A missing or unreadable folder yields no files.
pub fn dictionary_files<P: AsRef<Path>>(folder: P) -> Vec<PathBuf> {
    let folder = folder.as_ref();

    if !folder.is_dir() {
        return vec![];
    }

    let walker = match globwalk::GlobWalkerBuilder::new(folder, "*.dic")
        .file_type(globwalk::FileType::FILE)
        .build()
    {
        Ok(v) => v,
        Err(e) => {
            log::warn!("cannot scan {}: {}", folder.display(), e);
            return vec![];
        }
    };

    let mut files = walker
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.path().to_path_buf())
        .collect::<Vec<_>>();
    files.sort();
    files
}
