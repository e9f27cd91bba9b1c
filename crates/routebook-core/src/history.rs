//! Client-local ranking of searched route pairs.
//!
//! The tracker keeps a small frequency table of origin/destination pairs,
//! ordered by count and capped at [`MAX_HISTORY_ENTRIES`]. Storage is
//! best-effort: losing it only resets the ranking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use crate::error::HistoryError;

/// Number of pairs kept in the ranking.
pub const MAX_HISTORY_ENTRIES: usize = 10;
/// Separator between the two labels in a history key.
pub const KEY_SEPARATOR: &str = "__";
/// Text shown when nothing has been recorded yet.
pub const EMPTY_HISTORY_PLACEHOLDER: &str = "No searches yet";

/// Search count for one origin/destination pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub key: String,
    pub from: String,
    pub to: String,
    pub count: u64,
}

impl HistoryEntry {
    /// Display label, e.g. `Bern → Thun`.
    pub fn label(&self) -> String {
        format!("{} → {}", self.from, self.to)
    }
}

/// Build the history key for a pair of labels.
pub fn history_key(from: &str, to: &str) -> String {
    format!("{}{}{}", from.trim(), KEY_SEPARATOR, to.trim())
}

/// Persistence backend for the ranking.
pub trait HistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError>;
    fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError>;
}

/// Keeps the ranking in memory only.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let stored = self.entries.lock().map_err(|_| HistoryError::Poisoned)?;
        Ok(stored.clone())
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let mut stored = self.entries.lock().map_err(|_| HistoryError::Poisoned)?;
        *stored = entries.to_vec();
        Ok(())
    }
}

/// Stores the ranking as a JSON array in a file.
///
/// A missing file is an empty history. A file that does not parse is
/// discarded rather than reported.
#[derive(Debug, Clone)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!(
                    "Discarding corrupt history file {}: {}",
                    self.path.display(),
                    err
                );
                if let Err(err) = fs::remove_file(&self.path) {
                    warn!("Failed to remove corrupt history file: {}", err);
                }
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Frequency-ordered, size-bounded ranking of route searches.
pub struct HistoryTracker<S> {
    store: S,
    entries: Vec<HistoryEntry>,
}

impl<S: HistoryStore> HistoryTracker<S> {
    /// Load the ranking from `store`.
    pub fn open(store: S) -> Result<Self, HistoryError> {
        let mut entries = store.load()?;
        rank(&mut entries);
        Ok(Self { store, entries })
    }

    /// Load the ranking, starting empty when the store cannot be read.
    pub fn open_or_empty(store: S) -> Self {
        match store.load() {
            Ok(mut entries) => {
                rank(&mut entries);
                Self { store, entries }
            }
            Err(err) => {
                warn!("Search history unavailable, starting empty: {}", err);
                Self {
                    store,
                    entries: Vec::new(),
                }
            }
        }
    }

    /// Count one search for `from → to` and persist the truncated ranking.
    ///
    /// Returns the pair's new count. A new pair can fall straight off the
    /// end of a full ranking, in which case it is not retained.
    pub fn record(&mut self, from: &str, to: &str) -> Result<u64, HistoryError> {
        let key = history_key(from, to);

        let count = match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.count += 1;
                entry.count
            }
            None => {
                self.entries.push(HistoryEntry {
                    key,
                    from: from.trim().to_string(),
                    to: to.trim().to_string(),
                    count: 1,
                });
                1
            }
        };

        rank(&mut self.entries);
        self.store.save(&self.entries)?;
        Ok(count)
    }

    /// Current ranking, highest count first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every entry.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        self.store.save(&self.entries)
    }

    /// Lines for display. Calling again starts over.
    pub fn render(&self) -> Render<'_> {
        Render {
            entries: &self.entries,
            next: 0,
            placeholder_pending: self.entries.is_empty(),
        }
    }
}

// Stable sort keeps first-seen order between equal counts.
fn rank(entries: &mut Vec<HistoryEntry>) {
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(MAX_HISTORY_ENTRIES);
}

/// One display line of the ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryLine {
    Ranked { rank: usize, label: String, count: u64 },
    Placeholder,
}

impl fmt::Display for HistoryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryLine::Ranked { rank, label, count } => {
                write!(f, "{}. {} ({})", rank, label, count)
            }
            HistoryLine::Placeholder => f.write_str(EMPTY_HISTORY_PLACEHOLDER),
        }
    }
}

/// Lazy iterator over [`HistoryLine`]s.
#[derive(Debug, Clone)]
pub struct Render<'a> {
    entries: &'a [HistoryEntry],
    next: usize,
    placeholder_pending: bool,
}

impl Iterator for Render<'_> {
    type Item = HistoryLine;

    fn next(&mut self) -> Option<Self::Item> {
        if self.placeholder_pending {
            self.placeholder_pending = false;
            return Some(HistoryLine::Placeholder);
        }

        let entry = self.entries.get(self.next)?;
        self.next += 1;
        Some(HistoryLine::Ranked {
            rank: self.next,
            label: entry.label(),
            count: entry.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> HistoryTracker<MemoryHistoryStore> {
        HistoryTracker::open(MemoryHistoryStore::default()).unwrap()
    }

    #[test]
    fn more_frequent_pair_ranks_higher() {
        let mut history = tracker();
        history.record("C", "D").unwrap();
        for _ in 0..3 {
            history.record("A", "B").unwrap();
        }

        let keys: Vec<_> = history.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["A__B", "C__D"]);
        assert_eq!(history.entries()[0].count, 3);
        assert_eq!(history.entries()[1].count, 1);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let mut history = tracker();
        history.record("A", "B").unwrap();
        history.record("C", "D").unwrap();
        history.record("E", "F").unwrap();
        history.record("C", "D").unwrap();
        history.record("E", "F").unwrap();

        let keys: Vec<_> = history.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["C__D", "E__F", "A__B"]);
    }

    #[test]
    fn ranking_never_exceeds_ten_entries() {
        let mut history = tracker();
        for i in 0..25 {
            history.record(&format!("from-{i}"), "to").unwrap();
            assert!(history.entries().len() <= MAX_HISTORY_ENTRIES);
        }
        assert_eq!(history.entries().len(), MAX_HISTORY_ENTRIES);
    }

    #[test]
    fn record_trims_labels_and_returns_the_new_count() {
        let mut history = tracker();
        assert_eq!(history.record(" Bern ", "Thun").unwrap(), 1);
        assert_eq!(history.record("Bern", " Thun").unwrap(), 2);
        assert_eq!(history.entries()[0].key, "Bern__Thun");
        assert_eq!(history.entries()[0].from, "Bern");
    }

    #[test]
    fn new_pair_does_not_displace_a_full_ranking() {
        let mut history = tracker();
        for i in 0..MAX_HISTORY_ENTRIES {
            history.record(&format!("from-{i}"), "to").unwrap();
        }
        assert_eq!(history.record("late", "pair").unwrap(), 1);
        assert!(history.entries().iter().all(|e| e.from != "late"));
    }

    #[test]
    fn record_persists_to_store() {
        let store = MemoryHistoryStore::default();
        let mut history = HistoryTracker::open(store).unwrap();
        history.record("A", "B").unwrap();
        assert_eq!(history.store.load().unwrap(), history.entries().to_vec());
    }

    #[test]
    fn render_empty_yields_single_placeholder() {
        let history = tracker();
        let lines: Vec<_> = history.render().collect();
        assert_eq!(lines, vec![HistoryLine::Placeholder]);
        assert_eq!(lines[0].to_string(), EMPTY_HISTORY_PLACEHOLDER);
    }

    #[test]
    fn render_is_ranked_and_restartable() {
        let mut history = tracker();
        history.record("Bern", "Thun").unwrap();
        history.record("Bern", "Thun").unwrap();
        history.record("Biel", "Bern").unwrap();

        let render = history.render();
        let first: Vec<String> = render.clone().map(|l| l.to_string()).collect();
        let second: Vec<String> = history.render().map(|l| l.to_string()).collect();
        assert_eq!(first, vec!["1. Bern → Thun (2)", "2. Biel → Bern (1)"]);
        assert_eq!(first, second);
        assert_eq!(render.count(), 2);
    }

    #[test]
    fn file_store_round_trips_and_resets_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let mut history = HistoryTracker::open(JsonFileHistoryStore::new(&path)).unwrap();
        history.record("A", "B").unwrap();
        history.record("A", "B").unwrap();

        let reopened = HistoryTracker::open(JsonFileHistoryStore::new(&path)).unwrap();
        assert_eq!(reopened.entries().len(), 1);
        assert_eq!(reopened.entries()[0].count, 2);

        fs::write(&path, "{ not json").unwrap();
        let reset = HistoryTracker::open(JsonFileHistoryStore::new(&path)).unwrap();
        assert!(reset.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn unreadable_history_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileHistoryStore::new(dir.path());

        assert!(matches!(
            HistoryTracker::open(store.clone()),
            Err(HistoryError::Io(_))
        ));
        let mut history = HistoryTracker::open_or_empty(store);
        assert!(history.is_empty());
        assert!(history.record("A", "B").is_err());
        assert!(dir.path().is_dir());
    }

    #[test]
    fn poisoned_memory_store_reports_an_error() {
        let store = MemoryHistoryStore::default();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.entries.lock().unwrap();
            panic!("poison the lock");
        }));

        assert!(matches!(store.load(), Err(HistoryError::Poisoned)));
        assert!(matches!(store.save(&[]), Err(HistoryError::Poisoned)));
    }

    #[test]
    fn file_store_rejects_non_array_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"{"A__B": 3}"#).unwrap();

        let history = HistoryTracker::open(JsonFileHistoryStore::new(&path)).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn open_normalizes_oversized_stored_rankings() {
        let store = MemoryHistoryStore::default();
        let stored: Vec<_> = (0..15u64)
            .map(|i| HistoryEntry {
                key: history_key(&format!("f{i}"), "t"),
                from: format!("f{i}"),
                to: "t".to_string(),
                count: i,
            })
            .collect();
        store.save(&stored).unwrap();

        let history = HistoryTracker::open(store).unwrap();
        assert_eq!(history.entries().len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history.entries()[0].count, 14);
    }
}
