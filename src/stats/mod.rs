pub mod key_stat;
pub mod key_stat_set;

pub use self::key_stat::KeyStat;
pub use self::key_stat_set::KeyStatSet;
