//! The spell-check engine: dictionary registry, loading and the public
//! query surface.
//!
//! Compressed dictionaries are built off the caller's thread, one at a time.
//! While any build is in flight every word is reported correct, so callers
//! never block and never see false positives against a half-loaded set.

use std::sync::{Arc, Weak};
use std::time::Duration;

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use self::queue::{LoadJob, LoadQueue};
use self::ranker::SuggestionRanker;
use crate::compress::{BuildError, CompressedDictionary, DictionaryStats};
use crate::constants::{MAX_METRICS, MAX_SUGGESTIONS, MIN_WORD_LENGTH, USER_DICTIONARY};
use crate::dictionary::{Dictionary, EditableDictionary, Membership};
use crate::loader::{LoadError, WordSource};
use crate::speller::suggestion::Suggestion;
use crate::tokenizer::case_handling::CaseMutation;
use crate::tokenizer::SpellcheckingStrategy;
use crate::transform::Transformation;

mod queue;
/// Candidate gathering and ordering.
pub mod ranker;
/// Ranked correction candidates.
pub mod suggestion;

/// Where compressed dictionaries are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// On a dedicated loader thread; `load_dictionary` returns at once
    Background,
    /// On the calling thread
    Blocking,
}

/// Tunables of a [`SpellCheckEngine`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// number of suggestions to return
    pub n_best: usize,
    /// how much further than the best suggestion a suggestion may be
    pub quality: usize,
    /// tokens shorter than this (in characters) are never judged
    pub min_word_length: usize,
    /// re-case suggestions to match the checked token
    pub case_restoration: bool,
    /// where compressed dictionaries are built
    pub load_mode: LoadMode,
}

impl EngineConfig {
    /// Background loading with the default limits.
    pub const fn default() -> EngineConfig {
        EngineConfig {
            n_best: MAX_SUGGESTIONS,
            quality: MAX_METRICS,
            min_word_length: MIN_WORD_LENGTH,
            case_restoration: true,
            load_mode: LoadMode::Background,
        }
    }

    /// Like `default()`, but builds on the calling thread.
    pub const fn blocking() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.load_mode = LoadMode::Blocking;
        config
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::default()
    }
}

/// Lifecycle of a named dictionary as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DictionaryState {
    /// Never requested, or forgotten by a reset
    Unloaded,
    /// Waiting for or undergoing a build
    Loading,
    /// Answering queries
    Loaded,
    /// The last build failed
    Failed,
    /// Explicitly removed
    Removed,
}

/// Why a dictionary did not become active.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The dictionary could not be built
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The build finished after its load was cancelled or the engine reset
    #[error("load of '{0}' was cancelled")]
    Cancelled(SmolStr),
}

impl From<LoadError> for EngineError {
    fn from(e: LoadError) -> Self {
        EngineError::Build(BuildError::Load(e))
    }
}

/// The query surface hosts talk to.
pub trait Speller {
    /// Whether `word` should be left unflagged.
    fn is_correct(&self, word: &str) -> bool;
    /// Ranked suggestions using the engine's configuration.
    fn suggest(&self, word: &str) -> Vec<Suggestion>;
    /// Ranked suggestions using the count and quality of `config`.
    fn suggest_with_config(&self, word: &str, config: &EngineConfig) -> Vec<Suggestion>;

    /// Suggested corrections as plain strings, best first.
    fn get_suggestions(&self, word: &str) -> Vec<String> {
        self.suggest(word)
            .into_iter()
            .map(|s| s.value.to_string())
            .collect()
    }
}

/// A flagged token of a checked text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Misspelling {
    /// byte offset of the token in the text
    pub offset: usize,
    /// the token as it appears in the text
    pub word: SmolStr,
    /// corrections, best first
    pub suggestions: Vec<SmolStr>,
}

/// The dictionaries queries run against. Replaced wholesale on every
/// change, so a reader holding one never sees a partial update.
#[derive(Default, Clone)]
struct ActiveSet {
    bundled: Vec<Arc<CompressedDictionary>>,
    editable: Vec<Arc<EditableDictionary>>,
}

impl ActiveSet {
    fn all(&self) -> Vec<Arc<dyn Dictionary>> {
        self.bundled
            .iter()
            .map(|d| d.clone() as Arc<dyn Dictionary>)
            .chain(self.editable.iter().map(|d| d.clone() as Arc<dyn Dictionary>))
            .collect()
    }

    fn contains(&self, name: &str) -> bool {
        self.bundled.iter().any(|d| d.name() == name)
            || self.editable.iter().any(|d| d.name() == name)
    }
}

struct EngineState {
    config: EngineConfig,
    transform: Transformation,
    ranker: SuggestionRanker,
    sources: Vec<Arc<dyn WordSource>>,
    user: Arc<EditableDictionary>,
    active: RwLock<Arc<ActiveSet>>,
    history: Mutex<HashMap<SmolStr, DictionaryState>>,
    queue: LoadQueue,
}

impl EngineState {
    #[inline(always)]
    fn snapshot(&self) -> Arc<ActiveSet> {
        self.active.read().clone()
    }

    fn update<F: FnOnce(&mut ActiveSet)>(&self, f: F) {
        let mut active = self.active.write();
        let mut next = (**active).clone();
        f(&mut next);
        *active = Arc::new(next);
    }

    /// Publishes a finished build, unless its load was cancelled meanwhile.
    fn finish(
        &self,
        job: &LoadJob,
        result: Result<CompressedDictionary, BuildError>,
    ) -> Result<(), EngineError> {
        // Held across the staleness check so a reset cannot slip in between.
        let mut active = self.active.write();
        let name = SmolStr::new(job.name());

        if !self.queue.is_current(job) {
            log::warn!("Discarding stale dictionary: {}", name);
            return Err(EngineError::Cancelled(name));
        }

        match result {
            Ok(dictionary) => {
                log::debug!("Loaded dictionary: {} ({} words)", name, dictionary.len());
                let mut next = (**active).clone();
                next.bundled.retain(|d| d.name() != name);
                next.bundled.push(Arc::new(dictionary));
                *active = Arc::new(next);
                self.history.lock().remove(&name);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load dictionary {}: {}", name, e);
                self.history.lock().insert(name, DictionaryState::Failed);
                Err(e.into())
            }
        }
    }
}

/// Builds queued jobs until the queue runs dry. Holds the engine only
/// weakly, so dropping the engine abandons whatever is still waiting.
fn drain(engine: Weak<EngineState>, transform: Transformation, mut job: LoadJob) {
    loop {
        log::debug!("Loading {}", job.name());
        let result = CompressedDictionary::create(&*job.source, &transform);

        let state = match engine.upgrade() {
            Some(v) => v,
            None => {
                log::warn!("Engine dropped, abandoning load of {}", job.name());
                return;
            }
        };

        // Failures are recorded in the dictionary state.
        let _ = state.finish(&job, result);

        job = match state.queue.next() {
            Some(v) => v,
            None => {
                log::debug!("Loading finished");
                return;
            }
        };
    }
}

/// Checks words against every registered dictionary.
///
/// Cheap to share: all methods take `&self` and the engine is `Send + Sync`.
pub struct SpellCheckEngine {
    state: Arc<EngineState>,
}

impl SpellCheckEngine {
    /// An engine with only the empty user dictionary.
    pub fn new(config: EngineConfig) -> SpellCheckEngine {
        SpellCheckEngine::with_sources(config, vec![])
    }

    /// An engine that loads every source right away and reloads them on
    /// [`reload`](Self::reload).
    pub fn with_sources(config: EngineConfig, sources: Vec<Arc<dyn WordSource>>) -> SpellCheckEngine {
        let engine = SpellCheckEngine {
            state: Arc::new(EngineState {
                transform: Transformation::with_min_length(config.min_word_length),
                ranker: SuggestionRanker::new(),
                sources,
                user: Arc::new(EditableDictionary::new(USER_DICTIONARY)),
                active: RwLock::new(Arc::new(ActiveSet::default())),
                history: Mutex::new(HashMap::new()),
                queue: LoadQueue::new(),
                config,
            }),
        };

        engine.reload();
        engine
    }

    /// The configuration the engine was created with.
    #[inline(always)]
    pub fn config(&self) -> &EngineConfig {
        &self.state.config
    }

    /// The normalizer applied to every checked word.
    #[inline(always)]
    pub fn transformation(&self) -> &Transformation {
        &self.state.transform
    }

    /// Builds a compressed dictionary from `source` according to the
    /// configured [`LoadMode`]. Loading a name that is already present
    /// replaces it once the new build completes.
    pub fn load_dictionary(&self, source: Arc<dyn WordSource>) {
        match self.state.config.load_mode {
            LoadMode::Blocking => {
                // Already logged and recorded as Failed.
                let _ = self.load_dictionary_blocking(source);
            }
            LoadMode::Background => self.submit(source),
        }
    }

    fn submit(&self, source: Arc<dyn WordSource>) {
        let job = self.state.queue.job(source);

        if let Some(job) = self.state.queue.submit(job) {
            self.spawn_loader(job);
        }
    }

    /// Drains the queue starting at `job`, which already owns the running
    /// slot.
    fn spawn_loader(&self, job: LoadJob) {
        let engine = Arc::downgrade(&self.state);
        let transform = self.state.transform;
        let fallback = job.clone();

        let spawned = std::thread::Builder::new()
            .name("packspell-loader".into())
            .spawn(move || drain(engine, transform, job));

        if let Err(e) = spawned {
            log::error!("Could not spawn loader thread, loading inline: {}", e);
            drain(Arc::downgrade(&self.state), transform, fallback);
        }
    }

    /// Builds a compressed dictionary on the calling thread, first waiting
    /// for any build already running. Removing the dictionary or resetting
    /// the engine meanwhile makes this return [`EngineError::Cancelled`].
    pub fn load_dictionary_blocking(&self, source: Arc<dyn WordSource>) -> Result<(), EngineError> {
        let name = SmolStr::new(source.name());
        let job = match self.state.queue.acquire(self.state.queue.job(source)) {
            Some(v) => v,
            None => {
                log::debug!("Load of {} cancelled before it started", name);
                return Err(EngineError::Cancelled(name));
            }
        };

        log::debug!("Loading {}", job.name());
        let result = CompressedDictionary::create(&*job.source, &self.state.transform);
        let outcome = self.state.finish(&job, result);

        // Loads queued behind this one go to the loader thread.
        if let Some(next) = self.state.queue.next() {
            self.spawn_loader(next);
        }

        outcome
    }

    /// Registers an editable dictionary. Editable dictionaries are never
    /// compressed and can only confirm words, not reject them.
    pub fn add_editable_dictionary(&self, dictionary: Arc<EditableDictionary>) {
        let name = SmolStr::new(dictionary.name());
        self.state.update(|set| {
            set.editable.retain(|d| d.name() != name);
            set.editable.push(dictionary);
        });
        self.state.history.lock().remove(&name);
    }

    /// Drops the named dictionary, or cancels its pending load.
    pub fn remove_dictionary(&self, name: &str) -> bool {
        let mut removed = false;

        self.state.update(|set| {
            let before = set.bundled.len() + set.editable.len();
            set.bundled.retain(|d| d.name() != name);
            set.editable.retain(|d| d.name() != name);
            removed = before != set.bundled.len() + set.editable.len();
        });

        if self.state.queue.cancel(name) {
            log::debug!("Cancelled load of {}", name);
            removed = true;
        }

        if removed {
            self.state
                .history
                .lock()
                .insert(name.into(), DictionaryState::Removed);
        }

        removed
    }

    /// Whether `name` is answering queries.
    pub fn is_dictionary_loaded(&self, name: &str) -> bool {
        self.state.snapshot().contains(name)
    }

    /// Where `name` is in its lifecycle.
    pub fn dictionary_state(&self, name: &str) -> DictionaryState {
        if self.is_dictionary_loaded(name) {
            return DictionaryState::Loaded;
        }

        if self.state.queue.is_queued(name) {
            return DictionaryState::Loading;
        }

        self.state
            .history
            .lock()
            .get(name)
            .copied()
            .unwrap_or(DictionaryState::Unloaded)
    }

    /// Names of every dictionary answering queries.
    pub fn loaded_dictionaries(&self) -> Vec<SmolStr> {
        self.state
            .snapshot()
            .all()
            .iter()
            .map(|d| SmolStr::new(d.name()))
            .collect()
    }

    /// Compression statistics of every loaded compressed dictionary.
    pub fn dictionary_stats(&self) -> Vec<DictionaryStats> {
        self.state
            .snapshot()
            .bundled
            .iter()
            .map(|d| d.stats())
            .collect()
    }

    /// True while any dictionary build is waiting or running.
    #[inline(always)]
    pub fn is_loading(&self) -> bool {
        self.state.queue.is_busy()
    }

    /// Waits for background loading to drain. Returns `false` on timeout.
    pub fn wait_for_loads(&self, timeout: Duration) -> bool {
        self.state.queue.wait_idle(timeout)
    }

    /// Abandons every queued and running build. A build already running
    /// completes, but its result is discarded.
    pub fn cancel_loads(&self) {
        let _active = self.state.active.write();
        self.state.queue.cancel_all();
    }

    /// Forgets every dictionary and every pending load. The user dictionary
    /// stays registered, words included.
    pub fn reset(&self) {
        let mut active = self.state.active.write();
        self.state.queue.cancel_all();
        *active = Arc::new(ActiveSet {
            bundled: vec![],
            editable: vec![self.state.user.clone()],
        });
        self.state.history.lock().clear();
        log::debug!("Engine reset");
    }

    /// Resets, then loads every configured source again.
    pub fn reload(&self) {
        self.reset();

        for source in self.state.sources.iter() {
            self.load_dictionary(source.clone());
        }
    }

    /// Makes the loaded sources match `disabled`: sources named in it are
    /// removed, all others are loaded if they are not already.
    pub fn update_dictionaries(&self, disabled: &HashSet<SmolStr>) {
        for source in self.state.sources.iter() {
            let name = source.name();
            let present = self.is_dictionary_loaded(name) || self.state.queue.is_queued(name);
            let wanted = !disabled.contains(name);

            if present && !wanted {
                self.remove_dictionary(name);
            } else if !present && wanted {
                self.load_dictionary(source.clone());
            }
        }
    }

    /// The engine-owned dictionary of accepted words.
    #[inline(always)]
    pub fn user_dictionary(&self) -> &Arc<EditableDictionary> {
        &self.state.user
    }

    /// Adds the normalized form of `word` to the user dictionary. Returns
    /// `false` if the word is too short to be kept.
    pub fn add_to_dictionary(&self, word: &str) -> bool {
        match self.state.transform.transform(word) {
            Some(word) => {
                self.state.user.add(&word);
                true
            }
            None => false,
        }
    }

    /// Removes the normalized form of `word` from the user dictionary.
    pub fn remove_from_dictionary(&self, word: &str) -> bool {
        match self.state.transform.transform(word) {
            Some(word) => self.state.user.remove(&word),
            None => false,
        }
    }

    /// Replaces the user dictionary's contents.
    pub fn replace_all<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = self.state.transform.transform_all(words);
        self.state.user.replace_all(words.iter().map(SmolStr::as_str));
    }

    /// Adds every word of `source` to the user dictionary, returning how
    /// many were kept.
    pub fn load_user_words(&self, source: &dyn WordSource) -> Result<usize, LoadError> {
        let mut words = Vec::new();
        source.load(&mut |raw| {
            if let Some(word) = self.state.transform.transform(raw) {
                words.push(word);
            }
        })?;

        let count = words.len();
        self.state.user.add_all(words.iter().map(SmolStr::as_str));
        Ok(count)
    }

    /// Every word of every registered editable dictionary.
    pub fn get_editable_words(&self) -> HashSet<SmolStr> {
        self.state
            .snapshot()
            .editable
            .iter()
            .flat_map(|d| d.words())
            .collect()
    }

    /// Suggestions with an explicit count and quality window.
    pub fn suggest_with(&self, word: &str, threshold: usize, quality: usize) -> Vec<Suggestion> {
        let normalized = match self.state.transform.transform(word) {
            Some(v) => v,
            None => return vec![],
        };

        let dictionaries = self.state.snapshot().all();
        let ranked = self
            .state
            .ranker
            .rank(&normalized, &dictionaries, threshold, quality);

        if !self.state.config.case_restoration {
            return ranked;
        }

        match CaseMutation::of(word) {
            CaseMutation::None => ranked,
            mutation => ranked
                .into_iter()
                .map(|s| Suggestion::new(mutation.apply(&s.value), s.distance))
                .unique_by(|s| s.value.clone())
                .collect(),
        }
    }

    /// Every token `strategy` finds in `text` that is not correct, with
    /// its suggestions.
    pub fn check_text(&self, text: &str, strategy: &dyn SpellcheckingStrategy) -> Vec<Misspelling> {
        strategy
            .tokens(text)
            .into_iter()
            .filter(|(_, token)| !self.is_correct(token))
            .map(|(offset, token)| Misspelling {
                offset,
                word: token.into(),
                suggestions: self.suggest(token).into_iter().map(|s| s.value).collect(),
            })
            .collect()
    }
}

impl Speller for SpellCheckEngine {
    fn is_correct(&self, word: &str) -> bool {
        if self.is_loading() {
            return true;
        }

        let word = match self.state.transform.transform(word) {
            Some(v) => v,
            None => return true,
        };

        let dictionaries = self.state.snapshot();
        Membership::is_correct(
            dictionaries
                .bundled
                .iter()
                .map(|d| d.contains(&word))
                .chain(dictionaries.editable.iter().map(|d| d.contains(&word))),
        )
    }

    #[inline]
    fn suggest(&self, word: &str) -> Vec<Suggestion> {
        self.suggest_with(word, self.state.config.n_best, self.state.config.quality)
    }

    fn suggest_with_config(&self, word: &str, config: &EngineConfig) -> Vec<Suggestion> {
        self.suggest_with(word, config.n_best, config.quality)
    }
}

impl std::fmt::Debug for SpellCheckEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SpellCheckEngine")
            .field("dictionaries", &self.loaded_dictionaries())
            .field("loading", &self.is_loading())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::WordList;
    use std::sync::mpsc::{channel, Receiver, Sender};

    fn words(name: &str, words: &[&str]) -> Arc<dyn WordSource> {
        Arc::new(WordList::new(name, words))
    }

    fn blocking_engine() -> SpellCheckEngine {
        SpellCheckEngine::new(EngineConfig::blocking())
    }

    /// Blocks inside `load` until released, recording the order it ran in.
    struct GatedSource {
        name: SmolStr,
        words: Vec<&'static str>,
        started: Mutex<Sender<SmolStr>>,
        release: Mutex<Receiver<()>>,
    }

    impl WordSource for GatedSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn load(&self, consumer: &mut dyn FnMut(&str)) -> Result<(), LoadError> {
            let _ = self.started.lock().send(self.name.clone());
            let _ = self.release.lock().recv();
            self.words.iter().for_each(|w| consumer(w));
            Ok(())
        }
    }

    fn gated(
        name: &str,
        words: Vec<&'static str>,
        started: &Sender<SmolStr>,
    ) -> (Arc<dyn WordSource>, Sender<()>) {
        let (release, gate) = channel();
        let source = GatedSource {
            name: name.into(),
            words,
            started: Mutex::new(started.clone()),
            release: Mutex::new(gate),
        };
        (Arc::new(source), release)
    }

    #[test]
    fn scenario_cat_cats_dog() {
        let engine = blocking_engine();
        engine
            .load_dictionary_blocking(words("english", &["cat", "cats", "dog"]))
            .unwrap();

        assert!(engine.is_correct("cat"));
        assert!(engine.is_correct("CAT"));
        assert!(engine.is_correct("  dog "));
        assert!(!engine.is_correct("cta"));
        assert!(engine.is_correct("at"));
        assert!(engine.is_correct("xyz"));

        let suggestions = engine.get_suggestions("cta");
        assert_eq!(suggestions.first().map(String::as_str), Some("cat"));
        assert!(!suggestions.contains(&"dog".to_string()));
        assert!(engine.get_suggestions("at").is_empty());
    }

    #[test]
    fn restores_case_of_token() {
        let engine = blocking_engine();
        engine
            .load_dictionary_blocking(words("english", &["hello", "help"]))
            .unwrap();

        assert_eq!(engine.get_suggestions("HELO")[0], "HELLO");
        assert_eq!(engine.get_suggestions("Helo")[0], "Hello");
        assert_eq!(engine.get_suggestions("helo")[0], "hello");
    }

    #[test]
    fn case_restoration_can_be_disabled() {
        let mut config = EngineConfig::blocking();
        config.case_restoration = false;
        let engine = SpellCheckEngine::with_sources(config, vec![words("english", &["hello"])]);

        assert_eq!(engine.get_suggestions("HELO"), vec!["hello".to_string()]);
    }

    #[test]
    fn suggestions_respect_threshold_and_quality() {
        let engine = blocking_engine();
        engine
            .load_dictionary_blocking(words("english", &["bake", "baker", "bakery", "bark", "ball"]))
            .unwrap();

        let result = engine.suggest_with("bakr", 1, 5);
        assert_eq!(result.len(), 1);

        let result = engine.suggest_with("bakr", 10, 0);
        assert!(result.iter().all(|s| s.distance == result[0].distance));
    }

    #[test]
    fn fails_open_while_loading() {
        let (started_tx, started) = channel();
        let (source, release) = gated("english", vec!["cat"], &started_tx);
        let engine = SpellCheckEngine::new(EngineConfig::default());

        engine.load_dictionary(source);
        assert_eq!(started.recv().unwrap(), "english");

        assert!(engine.is_loading());
        assert!(engine.is_correct("tac"));
        assert_eq!(engine.dictionary_state("english"), DictionaryState::Loading);

        release.send(()).unwrap();
        assert!(engine.wait_for_loads(Duration::from_secs(10)));

        assert!(!engine.is_loading());
        assert!(!engine.is_correct("tac"));
        assert!(engine.is_correct("cat"));
        assert_eq!(engine.dictionary_state("english"), DictionaryState::Loaded);
    }

    #[test]
    fn queued_loads_run_in_order() {
        let (started_tx, started) = channel();
        let (first, release_first) = gated("first", vec!["alpha"], &started_tx);
        let (second, release_second) = gated("second", vec!["beta"], &started_tx);
        let (third, release_third) = gated("third", vec!["gamma"], &started_tx);
        let engine = SpellCheckEngine::new(EngineConfig::default());

        engine.load_dictionary(first);
        assert_eq!(started.recv().unwrap(), "first");
        engine.load_dictionary(second);
        engine.load_dictionary(third);

        assert!(started.recv_timeout(Duration::from_millis(50)).is_err());
        assert_eq!(engine.dictionary_state("third"), DictionaryState::Loading);

        release_first.send(()).unwrap();
        assert_eq!(started.recv().unwrap(), "second");
        release_second.send(()).unwrap();
        assert_eq!(started.recv().unwrap(), "third");
        release_third.send(()).unwrap();

        assert!(engine.wait_for_loads(Duration::from_secs(10)));
        assert_eq!(
            engine.loaded_dictionaries(),
            vec!["first", "second", "third", USER_DICTIONARY]
                .into_iter()
                .map(SmolStr::new)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn cancelled_build_is_discarded() {
        let (started_tx, started) = channel();
        let (source, release) = gated("english", vec!["cat"], &started_tx);
        let (queued, _never) = gated("queued", vec!["dog"], &started_tx);
        let engine = SpellCheckEngine::new(EngineConfig::default());

        engine.load_dictionary(source);
        started.recv().unwrap();
        engine.load_dictionary(queued);

        engine.cancel_loads();
        assert_eq!(engine.dictionary_state("queued"), DictionaryState::Unloaded);
        release.send(()).unwrap();

        assert!(engine.wait_for_loads(Duration::from_secs(10)));
        assert!(!engine.is_dictionary_loaded("english"));
        assert!(!engine.is_dictionary_loaded("queued"));
        assert!(started.try_recv().is_err());
    }

    #[test]
    fn loads_after_reset_are_kept() {
        let (started_tx, started) = channel();
        let (stale, release) = gated("english", vec!["cat"], &started_tx);
        let engine = SpellCheckEngine::new(EngineConfig::default());

        engine.load_dictionary(stale);
        started.recv().unwrap();
        engine.reset();
        engine.load_dictionary(words("english", &["dog", "act"]));
        release.send(()).unwrap();

        assert!(engine.wait_for_loads(Duration::from_secs(10)));
        assert!(engine.is_dictionary_loaded("english"));
        assert!(engine.is_correct("dog"));
        assert!(!engine.is_correct("cat"));
    }

    #[test]
    fn blocking_load_reports_cancellation() {
        let engine = blocking_engine();
        let job = engine.state.queue.job(words("english", &["cat"]));
        engine.cancel_loads();

        let result = CompressedDictionary::create(&*job.source, engine.transformation());
        assert!(matches!(
            engine.state.finish(&job, result),
            Err(EngineError::Cancelled(_))
        ));
        assert!(!engine.is_dictionary_loaded("english"));
    }

    fn memberships(engine: &SpellCheckEngine, words: &[&str]) -> Vec<Membership> {
        let set = engine.state.snapshot();
        words
            .iter()
            .flat_map(|w| set.bundled.iter().map(move |d| d.contains(w)))
            .collect()
    }

    #[test]
    fn reset_is_idempotent() {
        let checked = ["cat", "cats", "tac", "dog", "god", "at", "xyz"];
        let engine = SpellCheckEngine::with_sources(
            EngineConfig::blocking(),
            vec![words("english", &["cat", "cats", "dog"])],
        );
        let correct = checked.iter().map(|w| engine.is_correct(w)).collect::<Vec<_>>();
        let contained = memberships(&engine, &checked);
        assert!(correct.contains(&false));
        assert_eq!(contained.len(), checked.len());

        engine.reset();
        engine.reset();
        assert_eq!(engine.loaded_dictionaries(), vec![SmolStr::new(USER_DICTIONARY)]);
        assert_eq!(engine.dictionary_state("english"), DictionaryState::Unloaded);
        assert!(engine.is_correct("tac"));

        engine.reload();
        assert!(engine.is_dictionary_loaded("english"));
        assert_eq!(
            checked.iter().map(|w| engine.is_correct(w)).collect::<Vec<_>>(),
            correct
        );
        assert_eq!(memberships(&engine, &checked), contained);
    }

    #[test]
    fn user_dictionary_survives_reset() {
        let engine = blocking_engine();
        engine.add_to_dictionary("rustacean");
        engine.reset();
        assert!(engine.is_dictionary_loaded(USER_DICTIONARY));

        engine
            .load_dictionary_blocking(words("english", &["cat", "rust", "ocean"]))
            .unwrap();
        assert!(!engine.is_correct("tacos"));
        assert!(engine.add_to_dictionary("tacos"));
        assert!(engine.is_correct("tacos"));
        assert!(engine.is_correct("rustacean"));

        let editable = engine.get_editable_words();
        assert!(editable.contains("tacos"));
        assert!(editable.contains("rustacean"));
    }

    #[test]
    fn blocking_load_waits_for_running_build() {
        let (started_tx, started) = channel();
        let (first, release_first) = gated("first", vec!["alpha"], &started_tx);
        let (second, release_second) = gated("second", vec!["beta"], &started_tx);
        let engine = Arc::new(SpellCheckEngine::new(EngineConfig::default()));

        engine.load_dictionary(first);
        assert_eq!(started.recv().unwrap(), "first");

        let blocking = {
            let engine = engine.clone();
            std::thread::spawn(move || engine.load_dictionary_blocking(second).is_ok())
        };

        while engine.dictionary_state("second") != DictionaryState::Loading {
            std::thread::yield_now();
        }
        assert!(started.recv_timeout(Duration::from_millis(100)).is_err());

        release_first.send(()).unwrap();
        assert_eq!(started.recv().unwrap(), "second");
        release_second.send(()).unwrap();

        assert!(blocking.join().unwrap());
        assert!(engine.wait_for_loads(Duration::from_secs(10)));
        assert!(engine.is_dictionary_loaded("first"));
        assert!(engine.is_dictionary_loaded("second"));
    }

    #[test]
    fn removing_dictionary_cancels_blocking_build() {
        let (started_tx, started) = channel();
        let (source, release) = gated("english", vec!["cat"], &started_tx);
        let engine = Arc::new(blocking_engine());

        let blocking = {
            let engine = engine.clone();
            std::thread::spawn(move || engine.load_dictionary_blocking(source))
        };

        assert_eq!(started.recv().unwrap(), "english");
        assert!(engine.is_loading());
        assert!(engine.remove_dictionary("english"));
        release.send(()).unwrap();

        assert!(matches!(
            blocking.join().unwrap(),
            Err(EngineError::Cancelled(_))
        ));
        assert!(!engine.is_dictionary_loaded("english"));
        assert_eq!(engine.dictionary_state("english"), DictionaryState::Removed);
        assert!(!engine.is_loading());
    }

    #[test]
    fn overflowing_dictionary_fails() {
        let many = ('\u{4e00}'..'\u{5000}').map(|c| format!("{}{}{}", c, c, c));
        let source: Arc<dyn WordSource> = Arc::new(WordList::new("huge", many));
        let engine = blocking_engine();

        let err = engine.load_dictionary_blocking(source.clone()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Build(BuildError::AlphabetOverflow { .. })
        ));
        assert_eq!(engine.dictionary_state("huge"), DictionaryState::Failed);

        engine.load_dictionary(source);
        assert!(!engine.is_dictionary_loaded("huge"));
    }

    #[test]
    fn user_dictionary() {
        let engine = blocking_engine();
        engine
            .load_dictionary_blocking(words("english", &["cat", "packs", "spell"]))
            .unwrap();

        assert!(!engine.is_correct("Packspell"));
        assert!(engine.add_to_dictionary("Packspell"));
        assert!(engine.is_correct("packspell"));
        assert!(engine.get_editable_words().contains("packspell"));
        assert!(!engine.add_to_dictionary("ab"));

        assert_eq!(engine.get_suggestions("packspel")[0], "packspell");

        assert!(engine.remove_from_dictionary("PACKSPELL"));
        assert!(!engine.is_correct("packspell"));

        engine.replace_all(["one", "Two", "x"]);
        let words = engine.get_editable_words();
        assert_eq!(words.len(), 2);
        assert!(words.contains("two"));
    }

    #[test]
    fn user_words_from_source() {
        let engine = blocking_engine();
        let count = engine
            .load_user_words(&*words("team", &["Rustacean", "ok", "tacos"]))
            .unwrap();

        assert_eq!(count, 2);
        let editable = engine.get_editable_words();
        assert!(editable.contains("rustacean"));
        assert!(editable.contains("tacos"));
        assert!(!editable.contains("ok"));
    }

    #[test]
    fn user_words_cannot_reject() {
        let engine = blocking_engine();
        engine.add_to_dictionary("hello");
        assert!(engine.is_correct("anything"));
    }

    #[test]
    fn editable_dictionaries_come_and_go() {
        let engine = blocking_engine();
        engine
            .load_dictionary_blocking(words("english", &["cat", "rust", "ocean"]))
            .unwrap();

        let project = Arc::new(EditableDictionary::with_words("project", ["rustacean"]));
        engine.add_editable_dictionary(project);
        assert!(engine.is_correct("rustacean"));

        assert!(engine.remove_dictionary("project"));
        assert_eq!(engine.dictionary_state("project"), DictionaryState::Removed);
        assert!(!engine.is_correct("rustacean"));
        assert!(!engine.remove_dictionary("project"));
    }

    #[test]
    fn update_dictionaries_follows_disabled_set() {
        let engine = SpellCheckEngine::with_sources(
            EngineConfig::blocking(),
            vec![words("english", &["cat"]), words("medical", &["femur"])],
        );
        assert!(engine.is_dictionary_loaded("medical"));

        let mut disabled = HashSet::new();
        disabled.insert(SmolStr::new("medical"));
        engine.update_dictionaries(&disabled);
        assert!(!engine.is_dictionary_loaded("medical"));
        assert!(engine.is_dictionary_loaded("english"));

        engine.update_dictionaries(&HashSet::new());
        assert!(engine.is_dictionary_loaded("medical"));
    }

    #[test]
    fn check_text_reports_offsets() {
        let engine = blocking_engine();
        engine
            .load_dictionary_blocking(words("english", &["the", "cat", "sat"]))
            .unwrap();

        let found = engine.check_text("The cta sat on it.", &crate::tokenizer::PlainTextStrategy);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].offset, 4);
        assert_eq!(found[0].word, "cta");
        assert_eq!(found[0].suggestions[0], "cat");
    }

    #[test]
    fn dropping_engine_abandons_loads() {
        let (started_tx, started) = channel();
        let (source, release) = gated("english", vec!["cat"], &started_tx);
        let engine = SpellCheckEngine::new(EngineConfig::default());

        engine.load_dictionary(source);
        started.recv().unwrap();
        let weak = Arc::downgrade(&engine.state);
        drop(engine);
        release.send(()).unwrap();

        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn config_from_json() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"n_best":3,"quality":2,"min_word_length":4,"case_restoration":false,"load_mode":"blocking"}"#,
        )
        .unwrap();
        assert_eq!(config.n_best, 3);
        assert_eq!(config.load_mode, LoadMode::Blocking);
    }
}
