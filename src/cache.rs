use crate::KeyboardHash;
use std::collections::BTreeMap;

/// Lazily populated per-keyboard cache.
///
/// The loader is passed per lookup so the load policy stays with the caller.
/// Absent results are cached too: a keyboard is loaded at most once.
#[derive(Debug, Clone)]
pub struct KeyboardCache<T> {
    entries: BTreeMap<KeyboardHash, Option<T>>,
}

impl<T> Default for KeyboardCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> KeyboardCache<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn get_or_load<F>(&mut self, keyboard_hash: KeyboardHash, loader: F) -> Option<&mut T>
    where
        F: FnOnce(KeyboardHash) -> Option<T>,
    {
        self.entries
            .entry(keyboard_hash)
            .or_insert_with(|| loader(keyboard_hash))
            .as_mut()
    }

    pub fn into_loaded(self) -> BTreeMap<KeyboardHash, T> {
        self.entries
            .into_iter()
            .filter_map(|(hash, entry)| entry.map(|v| (hash, v)))
            .collect()
    }
}
