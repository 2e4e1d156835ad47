use clap::Args;
use fastrand::Rng;
use keyadapt::edit_log::UNKNOWN_CHAR;
use keyadapt::{
    EditLog, Hitbox, JsonStore, KaResult, KeyAdaptError, KeyboardHash, Keystroke, LearnerStore,
};
use std::path::Path;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(short = 'k', long)]
    pub keyboard_hash: KeyboardHash,

    /// Number of logs (typing sessions) to queue.
    #[arg(long, default_value_t = 1)]
    pub sessions: usize,

    /// Key presses per session.
    #[arg(short, long, default_value_t = 200)]
    pub touches: usize,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Systematic horizontal miss in pixels (positive = right).
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub offset_x: i32,

    /// Systematic vertical miss in pixels (positive = down).
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub offset_y: i32,

    /// Standard deviation of the touch scatter, as a fraction of key size.
    #[arg(long, default_value_t = 0.15)]
    pub spread: f64,
}

/// Approximately standard-normal sample: the Irwin-Hall sum of 12 uniforms,
/// so the result never leaves [-6, 6].
fn normal(rng: &mut Rng) -> f64 {
    (0..12).map(|_| rng.f64()).sum::<f64>() - 6.0
}

fn touch(rng: &mut Rng, hb: &Hitbox, args: &SimulateArgs) -> (i32, i32) {
    let cx = (hb.left() + hb.right()) as f64 / 2.0;
    let cy = (hb.top() + hb.bottom()) as f64 / 2.0;
    let x = cx + args.offset_x as f64 + normal(rng) * args.spread * hb.width() as f64;
    let y = cy + args.offset_y as f64 + normal(rng) * args.spread * hb.height() as f64;
    (x.round() as i32, y.round() as i32)
}

pub fn run(data_dir: &Path, args: SimulateArgs) -> KaResult<()> {
    let mut store = JsonStore::open(data_dir)?;
    let hitboxes = store.load_hitbox_set(args.keyboard_hash)?.ok_or_else(|| {
        KeyAdaptError::Validation(format!(
            "Keyboard {} has no stored hitboxes; run `seed` first",
            args.keyboard_hash
        ))
    })?;

    // Only keys that type a character get simulated presses.
    let typing_keys: Vec<&Hitbox> = hitboxes.iter().filter(|hb| hb.code() > 0).collect();
    if typing_keys.is_empty() {
        return Err(KeyAdaptError::Validation(format!(
            "Keyboard {} has no character keys",
            args.keyboard_hash
        )));
    }

    let mut rng = match args.seed {
        Some(s) => Rng::with_seed(s),
        None => Rng::new(),
    };

    for _ in 0..args.sessions {
        let mut log = EditLog::new();
        for pos in 0..args.touches as i32 {
            let hb = typing_keys[rng.usize(..typing_keys.len())];
            let (x, y) = touch(&mut rng, hb, &args);
            let ch = char::from_u32(hb.code() as u32).unwrap_or(UNKNOWN_CHAR);
            log.set(pos, pos, Keystroke::new(hb.code(), ch, x, y, args.keyboard_hash));
        }
        store.enqueue_log(&log)?;
    }

    info!(
        "Queued {} sessions of {} touches for keyboard {}",
        args.sessions, args.touches, args.keyboard_hash
    );
    Ok(())
}
