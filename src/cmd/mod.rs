pub mod learn;
pub mod seed;
pub mod show;
pub mod simulate;
