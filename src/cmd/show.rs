use crate::reports;
use clap::Args;
use keyadapt::{JsonStore, KaResult, KeyAdaptError, KeyboardHash, LearnerStore};
use std::path::Path;

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(short = 'k', long)]
    pub keyboard_hash: KeyboardHash,
}

pub fn run(data_dir: &Path, args: ShowArgs) -> KaResult<()> {
    let store = JsonStore::open(data_dir)?;
    let hitboxes = store.load_hitbox_set(args.keyboard_hash)?.ok_or_else(|| {
        KeyAdaptError::Validation(format!(
            "Keyboard {} has no stored hitboxes",
            args.keyboard_hash
        ))
    })?;
    let stats = store.load_key_stat_set(args.keyboard_hash)?;

    reports::print_keyboard(&hitboxes, Some(&stats));
    Ok(())
}
