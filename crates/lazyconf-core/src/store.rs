//! Key/value store with lazy variable interpolation
//!
//! The store maps canonical keys to tokenized [`StoredValue`]s. Every `set`
//! re-tokenizes the raw value from scratch; `get` expands variable references
//! at read time against the store's current contents, with an explicit
//! resolution path created fresh per call to break cycles.
//!
//! The store is single-threaded by design: no internal synchronization, no
//! background refresh. Callers sharing one across threads must bring their
//! own locking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::loader::{self, LoadOutcome};
use crate::tokenizer::{tokenize, Dialect};
use crate::value::{Fragment, Scalar, StoredValue};

/// Behavior applied when a reference's target is already being expanded
///
/// A strategy chosen at construction, not a hardcoded policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecursionPolicy {
    /// The cyclic reference expands to empty text
    #[default]
    ReturnEmpty,
    /// The cyclic reference expands to its unexpanded `${name}` form
    ReturnLiteral,
    /// Expansion fails with a `CircularReference` error carrying the chain
    Fail,
}

/// Configuration options for a [`Store`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// The value grammar (quotes, comments, escapes, interpolation)
    pub dialect: Dialect,
    /// Cycle handling during expansion
    pub recursion: RecursionPolicy,
    /// Key/value separator characters for file sources
    pub separators: Vec<char>,
}

impl StoreOptions {
    /// Literal variant: no variable references
    pub fn literal() -> Self {
        Self {
            dialect: Dialect::literal(),
            recursion: RecursionPolicy::default(),
            separators: vec!['='],
        }
    }

    /// Interpolating variant
    pub fn interpolating() -> Self {
        Self {
            dialect: Dialect::interpolating(),
            recursion: RecursionPolicy::default(),
            separators: vec!['='],
        }
    }

    /// INI flavor: `;` comments and `:` as an additional separator
    pub fn ini(mut self) -> Self {
        self.dialect = self.dialect.ini();
        if !self.separators.contains(&':') {
            self.separators.push(':');
        }
        self
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::literal()
    }
}

/// The configuration store
///
/// Insertion-ordered mapping from canonical keys to stored fragment
/// sequences, optionally backed by file sources with explicit reload.
#[derive(Debug, Default)]
pub struct Store {
    entries: IndexMap<String, StoredValue>,
    options: StoreOptions,
    sources: Vec<PathBuf>,
    mtimes: HashMap<PathBuf, SystemTime>,
}

impl Store {
    /// Create an empty literal-variant store
    pub fn new() -> Self {
        Self::with_options(StoreOptions::literal())
    }

    /// Create an empty interpolating store
    pub fn interpolating() -> Self {
        Self::with_options(StoreOptions::interpolating())
    }

    /// Create an empty store with custom options
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            entries: IndexMap::new(),
            options,
            sources: Vec::new(),
            mtimes: HashMap::new(),
        }
    }

    /// Create a store backed by the given files and load them in order
    ///
    /// Later files override earlier keys. Missing files are skipped, not
    /// errors; unreadable files are.
    pub fn from_files<P: AsRef<Path>>(paths: &[P], options: StoreOptions) -> Result<Self> {
        let mut store = Self::with_options(options);
        store.sources = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        store.reload(false)?;
        Ok(store)
    }

    /// Re-read every source file
    ///
    /// Files whose modification time has not advanced are skipped unless
    /// `force` is set. Reload is always explicit; nothing refreshes in the
    /// background.
    pub fn reload(&mut self, force: bool) -> Result<()> {
        let sources = self.sources.clone();
        for path in &sources {
            self.load_file(path, force)?;
        }
        Ok(())
    }

    /// Parse one source file into the store
    pub fn load_file(&mut self, path: impl AsRef<Path>, force: bool) -> Result<LoadOutcome> {
        let path = path.as_ref();

        let mtime = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                log::debug!("source {} unavailable: {}", path.display(), e);
                return Ok(LoadOutcome::Missing);
            }
        };

        if !force {
            if let Some(seen) = self.mtimes.get(path) {
                if mtime <= *seen {
                    log::trace!("source {} unchanged, skipping", path.display());
                    return Ok(LoadOutcome::Unchanged);
                }
            }
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(path.display().to_string(), e.to_string()))?;

        let pairs = loader::parse_lines(
            &content,
            &self.options.dialect.comment_markers,
            &self.options.separators,
        );
        let count = pairs.len();
        for (key, value) in pairs {
            self.set(key, value);
        }
        self.mtimes.insert(path.to_path_buf(), mtime);
        log::debug!("loaded {} ({} pairs)", path.display(), count);

        Ok(LoadOutcome::Loaded)
    }

    /// Assign a value to a key
    ///
    /// The raw value is right-trimmed, tokenized from scratch, and replaces
    /// any prior stored value for the key.
    pub fn set(&mut self, key: impl Into<Scalar>, value: impl Into<Scalar>) {
        let key = key.into().canonical();
        let raw = value.into().canonical();
        let stored = tokenize(raw.trim_end(), &self.options.dialect);
        self.entries.insert(key, stored);
    }

    /// Expanded text for a key
    ///
    /// Fails with `KeyNotFound` if the key is absent. Variable references to
    /// absent keys expand to empty text; cycles are handled by the configured
    /// [`RecursionPolicy`].
    pub fn get(&self, key: impl Into<Scalar>) -> Result<String> {
        let key = key.into().canonical();
        if !self.entries.contains_key(&key) {
            return Err(Error::key_not_found(key));
        }
        let mut path = Vec::new();
        self.expand(&key, &mut path)
    }

    /// Expanded text for a key, or `default` when the key is absent
    pub fn get_or(&self, key: impl Into<Scalar>, default: &str) -> String {
        match self.get(key) {
            Ok(text) => text,
            Err(_) => default.to_string(),
        }
    }

    /// Expanded value parsed as `f64`
    pub fn get_f64(&self, key: impl Into<Scalar>) -> Result<f64> {
        let key = key.into().canonical();
        let text = self.get(key.as_str())?;
        text.parse()
            .map_err(|_| Error::conversion(key, "a floating point number", text))
    }

    /// Expanded value parsed as `f64`, or `default` on lookup or parse failure
    pub fn get_f64_or(&self, key: impl Into<Scalar>, default: f64) -> f64 {
        self.get_f64(key).unwrap_or(default)
    }

    /// Expanded value parsed as `i64`
    pub fn get_i64(&self, key: impl Into<Scalar>) -> Result<i64> {
        let key = key.into().canonical();
        let text = self.get(key.as_str())?;
        text.parse()
            .map_err(|_| Error::conversion(key, "an integer", text))
    }

    /// Expanded value parsed as `i64`, or `default` on lookup or parse failure
    pub fn get_i64_or(&self, key: impl Into<Scalar>, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    /// Expanded value parsed as a strict boolean
    ///
    /// Only "true" and "false" (case-insensitive) are accepted.
    pub fn get_bool(&self, key: impl Into<Scalar>) -> Result<bool> {
        let key = key.into().canonical();
        let text = self.get(key.as_str())?;
        match text.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(Error::conversion(key, "a boolean (\"true\" or \"false\")", text)),
        }
    }

    /// True if the store contains the key
    pub fn contains(&self, key: impl Into<Scalar>) -> bool {
        self.entries.contains_key(&key.into().canonical())
    }

    /// Remove a key; true if it was present
    pub fn remove(&mut self, key: impl Into<Scalar>) -> bool {
        self.entries.shift_remove(&key.into().canonical()).is_some()
    }

    /// The stored fragment sequence for a key, unexpanded
    pub fn raw(&self, key: impl Into<Scalar>) -> Option<&StoredValue> {
        self.entries.get(&key.into().canonical())
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the store has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fully expanded snapshot of the store, in insertion order
    pub fn to_map(&self) -> Result<IndexMap<String, String>> {
        let mut map = IndexMap::with_capacity(self.entries.len());
        for key in self.entries.keys() {
            map.insert(key.clone(), self.get(key.as_str())?);
        }
        Ok(map)
    }

    /// Depth-first, left-to-right expansion of one key
    ///
    /// `path` is the active resolution path: keys currently being expanded in
    /// this `get`. A key appears at most once on it, which bounds recursion
    /// by the number of distinct keys.
    fn expand(&self, key: &str, path: &mut Vec<String>) -> Result<String> {
        let stored = match self.entries.get(key) {
            Some(v) => v,
            None => return Ok(String::new()),
        };

        path.push(key.to_string());
        let mut out = String::new();

        for fragment in stored.fragments() {
            match fragment {
                Fragment::Literal(text) => out.push_str(text),
                Fragment::VariableReference(name) => {
                    if !self.entries.contains_key(name) {
                        // Unresolved references expand to empty text
                        continue;
                    }
                    if path.iter().any(|k| k == name) {
                        match self.options.recursion {
                            RecursionPolicy::ReturnEmpty => {}
                            RecursionPolicy::ReturnLiteral => {
                                out.push_str("${");
                                out.push_str(name);
                                out.push('}');
                            }
                            RecursionPolicy::Fail => {
                                let mut chain = path.clone();
                                chain.push(name.clone());
                                return Err(Error::circular_reference(name.clone(), chain));
                            }
                        }
                    } else {
                        out.push_str(&self.expand(name, path)?);
                    }
                }
            }
        }

        path.pop();
        Ok(out)
    }
}
