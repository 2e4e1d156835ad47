use super::LearnerStore;
use crate::edit_log::EditLog;
use crate::error::KaResult;
use crate::geometry::HitboxSet;
use crate::stats::KeyStatSet;
use crate::KeyboardHash;
use std::collections::BTreeMap;

/// Store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    key_stats: BTreeMap<KeyboardHash, KeyStatSet>,
    hitboxes: BTreeMap<KeyboardHash, HitboxSet>,
    pending: Vec<EditLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn key_stat_sets(&self) -> impl Iterator<Item = &KeyStatSet> {
        self.key_stats.values()
    }

    pub fn hitbox_sets(&self) -> impl Iterator<Item = &HitboxSet> {
        self.hitboxes.values()
    }
}

impl LearnerStore for MemoryStore {
    fn load_key_stat_set(&self, keyboard_hash: KeyboardHash) -> KaResult<KeyStatSet> {
        Ok(self
            .key_stats
            .get(&keyboard_hash)
            .cloned()
            .unwrap_or_else(|| KeyStatSet::new(keyboard_hash)))
    }

    fn save_key_stat_set(&mut self, stats: &KeyStatSet) -> KaResult<()> {
        self.key_stats.insert(stats.keyboard_hash(), stats.clone());
        Ok(())
    }

    fn load_hitbox_set(&self, keyboard_hash: KeyboardHash) -> KaResult<Option<HitboxSet>> {
        Ok(self.hitboxes.get(&keyboard_hash).cloned())
    }

    fn save_hitbox_set(&mut self, hitboxes: &HitboxSet) -> KaResult<()> {
        self.hitboxes.insert(hitboxes.keyboard_hash(), hitboxes.clone());
        Ok(())
    }

    fn drain_pending_logs(&mut self) -> KaResult<Vec<EditLog>> {
        Ok(std::mem::take(&mut self.pending))
    }

    fn enqueue_log(&mut self, log: &EditLog) -> KaResult<()> {
        self.pending.push(log.clone());
        Ok(())
    }
}
