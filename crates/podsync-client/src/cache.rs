//! Ordered record cache that live events patch in place.
//!
//! A [`CachedCollection`] holds the client's copy of a server-side list,
//! ordered most-recent-first. Applying a patch either merges into the
//! record with the same id or prepends a new record built from the patch.
//! Applying the same patch twice leaves the collection as it was after
//! the first application.

use indexmap::IndexMap;

/// A record that can be created from, and updated by, a partial patch.
pub trait CacheRecord: Clone + PartialEq {
    type Patch;

    fn id(&self) -> &str;

    /// Build a record for an id the cache has not seen yet.
    fn from_patch(id: &str, patch: &Self::Patch) -> Self;

    /// Overwrite the fields the patch carries. Fields it omits keep
    /// their current values.
    fn merge(&mut self, patch: &Self::Patch);
}

/// What [`CachedCollection::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct CachedCollection<R> {
    records: IndexMap<String, R>,
}

impl<R> Default for CachedCollection<R> {
    fn default() -> Self {
        Self {
            records: IndexMap::new(),
        }
    }
}

impl<R: CacheRecord> CachedCollection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection with a freshly fetched list, keeping
    /// the order it arrives in.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = R>) {
        self.records = records
            .into_iter()
            .map(|r| (r.id().to_string(), r))
            .collect();
    }

    pub fn apply(&mut self, id: &str, patch: &R::Patch) -> ApplyOutcome {
        if let Some(existing) = self.records.get_mut(id) {
            let before = existing.clone();
            existing.merge(patch);
            if *existing == before {
                ApplyOutcome::Unchanged
            } else {
                ApplyOutcome::Updated
            }
        } else {
            self.records
                .shift_insert(0, id.to_string(), R::from_patch(id, patch));
            ApplyOutcome::Inserted
        }
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<R> {
        self.records.shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in display order (most recent first).
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: String,
        text: String,
        pinned: bool,
    }

    #[derive(Default)]
    struct NotePatch {
        text: Option<String>,
        pinned: Option<bool>,
    }

    impl CacheRecord for Note {
        type Patch = NotePatch;

        fn id(&self) -> &str {
            &self.id
        }

        fn from_patch(id: &str, patch: &NotePatch) -> Self {
            Note {
                id: id.to_string(),
                text: patch.text.clone().unwrap_or_default(),
                pinned: patch.pinned.unwrap_or(false),
            }
        }

        fn merge(&mut self, patch: &NotePatch) {
            if let Some(text) = &patch.text {
                self.text = text.clone();
            }
            if let Some(pinned) = patch.pinned {
                self.pinned = pinned;
            }
        }
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.to_string(),
            text: text.to_string(),
            pinned: false,
        }
    }

    #[test]
    fn unknown_id_is_prepended() {
        let mut notes = CachedCollection::new();
        notes.replace_all([note("a", "first"), note("b", "second")]);

        let patch = NotePatch {
            text: Some("fresh".into()),
            ..Default::default()
        };
        assert_eq!(notes.apply("c", &patch), ApplyOutcome::Inserted);
        assert_eq!(notes.ids(), vec!["c", "a", "b"]);
        assert_eq!(notes.get("c").unwrap().text, "fresh");
    }

    #[test]
    fn known_id_is_merged_in_place() {
        let mut notes = CachedCollection::new();
        notes.replace_all([note("a", "first"), note("b", "second")]);

        let patch = NotePatch {
            pinned: Some(true),
            ..Default::default()
        };
        assert_eq!(notes.apply("b", &patch), ApplyOutcome::Updated);
        assert_eq!(notes.ids(), vec!["a", "b"]);
        let b = notes.get("b").unwrap();
        assert!(b.pinned);
        assert_eq!(b.text, "second");
    }

    #[test]
    fn repeating_a_patch_changes_nothing() {
        let mut notes = CachedCollection::new();
        notes.replace_all([note("a", "first")]);
        let patch = NotePatch {
            text: Some("edited".into()),
            pinned: Some(true),
        };

        notes.apply("a", &patch);
        notes.apply("z", &patch);
        let once: Vec<Note> = notes.iter().cloned().collect();

        assert_eq!(notes.apply("a", &patch), ApplyOutcome::Unchanged);
        assert_eq!(notes.apply("z", &patch), ApplyOutcome::Unchanged);
        let twice: Vec<Note> = notes.iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn replace_all_drops_previous_records() {
        let mut notes = CachedCollection::new();
        notes.replace_all([note("a", "first")]);
        notes.replace_all([note("b", "second")]);
        assert_eq!(notes.ids(), vec!["b"]);
        assert!(notes.get("a").is_none());
        assert_eq!(notes.remove("b").map(|n| n.text), Some("second".into()));
        assert!(notes.is_empty());
    }
}
