use super::KeyStat;
use crate::{KeyCode, KeyboardHash};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-keyboard collection of key statistics, at most one `KeyStat` per code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyStatSet {
    keyboard_hash: KeyboardHash,
    stats: BTreeMap<KeyCode, KeyStat>,
}

impl KeyStatSet {
    pub fn new(keyboard_hash: KeyboardHash) -> Self {
        Self {
            keyboard_hash,
            stats: BTreeMap::new(),
        }
    }

    pub fn keyboard_hash(&self) -> KeyboardHash {
        self.keyboard_hash
    }

    /// Records one touch for `code`, creating its accumulator on first sight.
    pub fn add(&mut self, code: KeyCode, x: i32, y: i32) {
        self.stats
            .entry(code)
            .and_modify(|ks| ks.add(x, y))
            .or_insert_with(|| KeyStat::with_sample(code, x, y));
    }

    /// Inserts a prepared accumulator, replacing any existing one with the same code.
    pub fn insert(&mut self, stat: KeyStat) -> Option<KeyStat> {
        self.stats.insert(stat.code(), stat)
    }

    pub fn get(&self, code: KeyCode) -> Option<&KeyStat> {
        self.stats.get(&code)
    }

    /// Merges `other` into the codes already tracked here. Codes that only
    /// exist in `other` are ignored.
    pub fn merge(&mut self, other: &KeyStatSet) {
        for (code, ks) in self.stats.iter_mut() {
            if let Some(theirs) = other.stats.get(code) {
                ks.merge(theirs);
            }
        }
    }

    /// Merges every accumulator of `other` into this set, adding the codes
    /// not tracked here yet.
    pub fn absorb(&mut self, other: &KeyStatSet) {
        for (code, theirs) in &other.stats {
            self.stats
                .entry(*code)
                .and_modify(|ks| ks.merge(theirs))
                .or_insert_with(|| theirs.clone());
        }
    }

    pub fn total_samples(&self) -> u64 {
        self.stats.values().map(|ks| ks.n() as u64).sum()
    }

    pub fn reduce_data(&mut self, fraction: f64) {
        for ks in self.stats.values_mut() {
            ks.reduce_data(fraction);
        }
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyStat> {
        self.stats.values()
    }
}
