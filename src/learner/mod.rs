pub mod border;
pub mod boundaries;
pub mod summarize;

pub use self::border::{compute_border, Side};
pub use self::boundaries::{compute_hitboxes, BoundaryReport};
pub use self::summarize::{merge_and_cap, summarize, Summary};

use crate::cache::KeyboardCache;
use crate::config::LearnerConfig;
use crate::edit_log::EditLog;
use crate::geometry::HitboxSet;
use crate::stats::KeyStatSet;
use crate::store::LearnerStore;
use crate::KeyboardHash;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

/// Outcome of one learning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LearnReport {
    pub logs_drained: usize,
    pub entries_seen: usize,
    pub accepted: usize,
    pub rejected_outliers: usize,
    pub skipped_incomplete: usize,
    pub keyboards_updated: usize,
    pub keyboards_without_geometry: usize,
    pub borders_moved: usize,
    pub save_failures: usize,
}

/// Batch learner: drains the queued edit logs of a store and adapts the
/// stored statistics and hitboxes of every keyboard that appears in them.
///
/// Runs for the same store must not overlap.
#[derive(TypedBuilder)]
pub struct LayoutLearner<S: LearnerStore> {
    store: S,
    #[builder(default)]
    config: LearnerConfig,
}

impl<S: LearnerStore> LayoutLearner<S> {
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// One full pass. Store failures are logged and counted, never raised:
    /// a failed load reads as "no data", a failed save loses only that record.
    /// Nothing is written until every keyboard has been computed.
    pub fn learn(&mut self) -> LearnReport {
        info!("Starting learning run");
        let mut report = LearnReport::default();

        // 1. Ingest
        let pending = match self.store.drain_pending_logs() {
            Ok(logs) => logs,
            Err(e) => {
                warn!("Failed to drain pending logs: {}", e);
                Vec::new()
            }
        };
        report.logs_drained = pending.len();

        let mut log = EditLog::new();
        for l in pending {
            log.append(l);
        }
        debug!("Found {} logged keystrokes", log.len());

        // 2. Geometry of every keyboard in the log, loaded once
        let mut hitbox_cache: KeyboardCache<HitboxSet> = KeyboardCache::new();
        let keyboards: BTreeSet<KeyboardHash> =
            log.complete_entries().map(|it| it.keyboard_hash()).collect();
        for &hash in &keyboards {
            let store = &self.store;
            hitbox_cache.get_or_load(hash, |h| match store.load_hitbox_set(h) {
                Ok(set) => set,
                Err(e) => {
                    warn!("Failed to load hitboxes of keyboard {}: {}", h, e);
                    None
                }
            });
        }
        let mut hitboxes = hitbox_cache.into_loaded();

        // 3. Summarise
        let summary = summarize(&log, &hitboxes);
        report.entries_seen = summary.entries_seen;
        report.accepted = summary.accepted;
        report.rejected_outliers = summary.rejected_outliers;
        report.skipped_incomplete = summary.skipped_incomplete;
        if summary.rejected_outliers > 0 {
            debug!("Rejected {} outlier touches", summary.rejected_outliers);
        }

        // 4. Reinforce with persisted data and cap
        let mut stats: BTreeMap<KeyboardHash, KeyStatSet> = summary.stats;
        for (&hash, fresh) in stats.iter_mut() {
            let persisted = self.store.load_key_stat_set(hash).unwrap_or_else(|e| {
                warn!("Failed to load statistics of keyboard {}: {}", hash, e);
                KeyStatSet::new(hash)
            });
            let applied = merge_and_cap(fresh, &persisted, self.config.data_cap);
            if applied < 1.0 {
                debug!("Keyboard {}: capped data to {:.3}", hash, applied);
            }
        }

        // 5. Adapt geometry
        let min_width = self.config.min_width_px();
        let min_height = self.config.min_height_px();
        let mut updated: Vec<KeyboardHash> = Vec::new();
        for (&hash, ks) in &stats {
            let Some(set) = hitboxes.get_mut(&hash) else {
                warn!("Keyboard {} has statistics but no stored hitboxes", hash);
                report.keyboards_without_geometry += 1;
                continue;
            };

            let moved = compute_hitboxes(ks, set, min_width, min_height, self.config.min_frequency);
            debug!(
                "Keyboard {}: {} row and {} column seams moved",
                hash, moved.rows_moved, moved.columns_moved
            );
            report.borders_moved += moved.total();
            updated.push(hash);
        }
        report.keyboards_updated = updated.len();

        // 6. Persist
        for ks in stats.values() {
            if let Err(e) = self.store.save_key_stat_set(ks) {
                warn!("Failed to save statistics of keyboard {}: {}", ks.keyboard_hash(), e);
                report.save_failures += 1;
            }
        }
        for hash in &updated {
            let Some(set) = hitboxes.get(hash) else { continue };
            if let Err(e) = self.store.save_hitbox_set(set) {
                warn!("Failed to save hitboxes of keyboard {}: {}", hash, e);
                report.save_failures += 1;
            }
        }

        info!(
            "Learning run done: {} entries, {} accepted, {} keyboards updated, {} borders moved",
            report.entries_seen, report.accepted, report.keyboards_updated, report.borders_moved
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit_log::Keystroke;
    use crate::geometry::Hitbox;
    use crate::store::MemoryStore;

    #[test]
    fn test_empty_queue_is_a_noop() {
        let mut learner = LayoutLearner::builder().store(MemoryStore::new()).build();
        let report = learner.learn();
        assert_eq!(report, LearnReport::default());
    }

    #[test]
    fn test_keyboard_without_geometry_keeps_stats() {
        let mut store = MemoryStore::new();
        let mut log = EditLog::new();
        for i in 0..3 {
            log.set(i, i, Keystroke::new(1, 'a', 5 + i, 5, 42));
        }
        store.enqueue_log(&log).unwrap();

        let mut learner = LayoutLearner::builder().store(store).build();
        let report = learner.learn();

        assert_eq!(report.keyboards_without_geometry, 1);
        assert_eq!(report.keyboards_updated, 0);
        let ks = learner.store().load_key_stat_set(42).unwrap();
        assert_eq!(ks.get(1).map(|k| k.n()), Some(3));
        assert!(learner.store().load_hitbox_set(42).unwrap().is_none());
    }

    #[test]
    fn test_hitboxes_saved_for_adapted_keyboard() {
        let mut store = MemoryStore::new();
        let hb = HitboxSet::from_hitboxes(
            3,
            vec![Hitbox::new(1, 0, 0, 10, 10), Hitbox::new(2, 10, 0, 20, 10)],
        )
        .unwrap();
        store.save_hitbox_set(&hb).unwrap();

        let mut log = EditLog::new();
        log.set(0, 0, Keystroke::new(1, 'a', 4, 4, 3));
        store.enqueue_log(&log).unwrap();

        let mut learner = LayoutLearner::builder().store(store).build();
        let report = learner.learn();
        assert_eq!(report.logs_drained, 1);
        assert_eq!(report.keyboards_updated, 1);
        assert_eq!(report.borders_moved, 0);
        assert_eq!(learner.store().load_hitbox_set(3).unwrap(), Some(hb));
    }
}
