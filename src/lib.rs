pub mod cache;
pub mod config;
pub mod edit_log;
pub mod error;
pub mod geometry;
pub mod learner;
pub mod stats;
pub mod store;
// cmd and reports belong to the binary (main.rs).

/// Opaque integer identifying one logical key independent of its position.
pub type KeyCode = i32;

/// Opaque integer identifying one keyboard layout/configuration.
pub type KeyboardHash = i32;

pub use crate::config::LearnerConfig;
pub use crate::edit_log::{EditLog, Keystroke, LogItem};
pub use crate::error::{KaResult, KeyAdaptError};
pub use crate::geometry::{Hitbox, HitboxSet, Point};
pub use crate::learner::{BoundaryReport, LayoutLearner, LearnReport};
pub use crate::stats::{KeyStat, KeyStatSet};
pub use crate::store::{JsonStore, LearnerStore, MemoryStore};
