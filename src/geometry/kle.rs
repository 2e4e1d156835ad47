use super::{Hitbox, HitboxSet};
use crate::error::{KaResult, KeyAdaptError};
use crate::{KeyCode, KeyboardHash};
use std::collections::HashSet;
use tracing::debug;

const FIRST_SYNTHETIC_CODE: KeyCode = -1000;

/// Fixed codes for named (multi-character) legends.
fn named_code(label: &str) -> Option<KeyCode> {
    match label.to_lowercase().as_str() {
        "space" | "spc" => Some(32),
        "enter" | "return" | "ret" => Some(10),
        "tab" => Some(9),
        "shift" => Some(-1),
        "?123" | "symbols" | "sym" => Some(-2),
        "backspace" | "bksp" | "bspc" | "delete" | "del" => Some(-5),
        _ => None,
    }
}

fn legend_code(label: &str) -> Option<KeyCode> {
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().next().map(|lc| lc as KeyCode),
        (Some(_), Some(_)) => named_code(label),
        _ => None,
    }
}

/// Parses keyboard-layout-editor JSON into initial hitboxes in reading order.
///
/// KLE coordinates are in key units; `unit_w_px`/`unit_h_px` give the pixel
/// size of one unit.
pub fn parse_kle_hitboxes(
    content: &str,
    keyboard_hash: KeyboardHash,
    unit_w_px: f64,
    unit_h_px: f64,
) -> KaResult<HitboxSet> {
    if !(unit_w_px > 0.0 && unit_h_px > 0.0) {
        return Err(KeyAdaptError::Layout(format!(
            "Unit size must be positive (got {} x {})",
            unit_w_px, unit_h_px
        )));
    }

    // 1. Let the crate deal with the KLE row/offset format
    let keyboard: kle_serial::Keyboard =
        serde_json::from_str(content).map_err(|e| KeyAdaptError::Layout(e.to_string()))?;

    // 2. Convert to pixel rectangles and assign codes
    let mut used: HashSet<KeyCode> = HashSet::new();
    let mut next_synthetic = FIRST_SYNTHETIC_CODE;
    let mut hitboxes = Vec::with_capacity(keyboard.keys.len());

    for key in keyboard.keys {
        let label = key
            .legends
            .iter()
            .flatten()
            .find(|l| !l.text.is_empty())
            .map(|l| l.text.as_str())
            .unwrap_or("");

        let code = match legend_code(label) {
            Some(c) if !used.contains(&c) => c,
            _ => {
                while used.contains(&next_synthetic) {
                    next_synthetic -= 1;
                }
                next_synthetic
            }
        };
        used.insert(code);

        let left = (key.x * unit_w_px).round() as i32;
        let top = (key.y * unit_h_px).round() as i32;
        let right = ((key.x + key.width) * unit_w_px).round() as i32;
        let bottom = ((key.y + key.height) * unit_h_px).round() as i32;

        debug!("KLE key '{}' -> code {}", label, code);
        hitboxes.push(Hitbox::new(code, left, top, right, bottom));
    }

    // 3. Reading order
    hitboxes.sort_by_key(|hb| (hb.top(), hb.left()));

    HitboxSet::from_hitboxes(keyboard_hash, hitboxes)
}
