use crate::reports;
use clap::Args;
use keyadapt::geometry::kle::parse_kle_hitboxes;
use keyadapt::{JsonStore, KaResult, KeyboardHash, LearnerStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SeedArgs {
    /// KLE (keyboard-layout-editor) JSON file.
    #[arg(short, long)]
    pub layout: PathBuf,

    #[arg(short = 'k', long)]
    pub keyboard_hash: KeyboardHash,

    /// Pixel width of one KLE unit.
    #[arg(long, default_value_t = 100.0)]
    pub unit_width: f64,

    /// Pixel height of one KLE unit.
    #[arg(long, default_value_t = 150.0)]
    pub unit_height: f64,
}

pub fn run(data_dir: &Path, args: SeedArgs) -> KaResult<()> {
    info!("📂 Loading layout: {}", args.layout.display());
    let content = fs::read_to_string(&args.layout)?;
    let hitboxes = parse_kle_hitboxes(
        &content,
        args.keyboard_hash,
        args.unit_width,
        args.unit_height,
    )?;

    let mut store = JsonStore::open(data_dir)?;
    store.save_hitbox_set(&hitboxes)?;
    info!(
        "Seeded {} hitboxes for keyboard {}",
        hitboxes.len(),
        args.keyboard_hash
    );

    reports::print_keyboard(&hitboxes, None);
    Ok(())
}
