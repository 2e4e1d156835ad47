//! Persistence collaborators for the learner.
//!
//! A store keeps one `KeyStatSet` and one `HitboxSet` per keyboard plus a
//! queue of pending edit logs. Missing records are not errors: an absent
//! stat set loads as empty, an absent hitbox set as `None`.

pub mod json;
pub mod memory;

pub use self::json::JsonStore;
pub use self::memory::MemoryStore;

use crate::edit_log::EditLog;
use crate::error::KaResult;
use crate::geometry::HitboxSet;
use crate::stats::KeyStatSet;
use crate::KeyboardHash;

pub trait LearnerStore {
    /// Stored statistics, or an empty set on cold start.
    fn load_key_stat_set(&self, keyboard_hash: KeyboardHash) -> KaResult<KeyStatSet>;

    fn save_key_stat_set(&mut self, stats: &KeyStatSet) -> KaResult<()>;

    /// Stored geometry. `None` means the keyboard was never seeded.
    fn load_hitbox_set(&self, keyboard_hash: KeyboardHash) -> KaResult<Option<HitboxSet>>;

    fn save_hitbox_set(&mut self, hitboxes: &HitboxSet) -> KaResult<()>;

    /// Returns every queued log and removes it from the queue.
    fn drain_pending_logs(&mut self) -> KaResult<Vec<EditLog>>;

    fn enqueue_log(&mut self, log: &EditLog) -> KaResult<()>;
}
