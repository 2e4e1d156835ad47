use crate::edit_log::EditLog;
use crate::geometry::HitboxSet;
use crate::stats::KeyStatSet;
use crate::KeyboardHash;
use std::collections::BTreeMap;

/// Per-keyboard statistics distilled from one log, plus what was dropped.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub stats: BTreeMap<KeyboardHash, KeyStatSet>,
    pub entries_seen: usize,
    pub accepted: usize,
    pub rejected_outliers: usize,
    pub skipped_incomplete: usize,
}

/// Accumulates every live, complete entry of `log` into the stat set of its
/// keyboard. An entry is an outlier when its key has a hitbox and the touch
/// is not close to it; keys without a hitbox are always accepted.
///
/// Keyboards that receive no accepted entry get no stat set at all.
pub fn summarize(log: &EditLog, hitboxes: &BTreeMap<KeyboardHash, HitboxSet>) -> Summary {
    let mut summary = Summary {
        entries_seen: log.len(),
        ..Summary::default()
    };

    for item in log.iter().filter(|it| !it.is_deleted()) {
        if !item.is_complete() {
            summary.skipped_incomplete += 1;
            continue;
        }

        let too_far = hitboxes
            .get(&item.keyboard_hash())
            .and_then(|set| set.find_by_code(item.code()))
            .map(|hb| !hb.is_close(item.pos_x(), item.pos_y()))
            .unwrap_or(false);

        if too_far {
            summary.rejected_outliers += 1;
            continue;
        }

        summary
            .stats
            .entry(item.keyboard_hash())
            .or_insert_with(|| KeyStatSet::new(item.keyboard_hash()))
            .add(item.code(), item.pos_x(), item.pos_y());
        summary.accepted += 1;
    }

    summary
}

/// Folds the persisted statistics of the same keyboard into `fresh`, keeping
/// stored keys that were not typed in this run, then scales the result down
/// so its total sample count stays within `cap`.
/// Returns the fraction that was applied (1.0 when below the cap).
pub fn merge_and_cap(fresh: &mut KeyStatSet, persisted: &KeyStatSet, cap: u32) -> f64 {
    fresh.absorb(persisted);

    let total = fresh.total_samples().max(1) as f64;
    let fraction = (cap as f64 / total).min(1.0);
    if fraction < 1.0 {
        fresh.reduce_data(fraction);
    }
    fraction
}
