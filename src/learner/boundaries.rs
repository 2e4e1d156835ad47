use super::border::{compute_border, Side};
use crate::geometry::grid::{GridRow, KeyGrid};
use crate::geometry::{Hitbox, HitboxSet};
use crate::stats::{KeyStat, KeyStatSet};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoundaryReport {
    pub rows_moved: usize,
    pub columns_moved: usize,
}

impl BoundaryReport {
    pub fn total(&self) -> usize {
        self.rows_moved + self.columns_moved
    }
}

/// Pools the statistics of every tracked key in a row into one aggregate
/// whose code is the row's top edge. When the row also holds untracked keys
/// the aggregate's count is scaled by `members / tracked`.
fn row_aggregate(row: &GridRow, hitboxes: &[Hitbox], stats: &KeyStatSet) -> KeyStat {
    let mut aggregate = KeyStat::new(row.top);
    let mut tracked = 0usize;

    for &idx in &row.members {
        if let Some(ks) = stats.get(hitboxes[idx].code()) {
            aggregate.merge(ks);
            tracked += 1;
        }
    }

    if tracked > 0 && tracked < row.members.len() {
        aggregate.multiply_n(row.members.len() as f64 / tracked as f64);
    }

    aggregate
}

/// Moves hitbox edges towards the Gaussian decision boundaries implied by
/// `stats`: first the seams between rows, then the seams between
/// neighbouring keys inside each row.
///
/// Keys without statistics, or with `n <= min_frequency`, keep their edges.
/// No hitbox is shrunk below `min_width` x `min_height` by a move.
pub fn compute_hitboxes(
    stats: &KeyStatSet,
    hitboxes: &mut HitboxSet,
    min_width: i32,
    min_height: i32,
    min_frequency: u32,
) -> BoundaryReport {
    let grid = KeyGrid::build(hitboxes);
    if grid.is_empty() {
        return BoundaryReport::default();
    }

    let rows: Vec<KeyStat> = grid
        .rows()
        .iter()
        .map(|row| row_aggregate(row, hitboxes.as_slice(), stats))
        .collect();

    let rows_moved = adapt_rows(&grid, &rows, hitboxes, min_height, min_frequency);
    let columns_moved = adapt_columns(&grid, &rows, stats, hitboxes, min_width, min_frequency);

    BoundaryReport {
        rows_moved,
        columns_moved,
    }
}

fn adapt_rows(
    grid: &KeyGrid,
    rows: &[KeyStat],
    hitboxes: &mut HitboxSet,
    min_height: i32,
    min_frequency: u32,
) -> usize {
    let total_n: u64 = rows.iter().map(|r| r.n() as u64).sum();
    let mut moved = 0;

    for (r, pair) in rows.windows(2).enumerate() {
        let (cur, next) = (&pair[0], &pair[1]);
        if cur.n() <= min_frequency || next.n() <= min_frequency {
            continue;
        }

        // Row starts are read live: an earlier seam may already have moved cur_top.
        let slice = hitboxes.as_slice();
        let cur_hit = &slice[grid.rows()[r].members[0]];
        let next_hit = &slice[grid.rows()[r + 1].members[0]];
        let (cur_top, cur_bottom) = (cur_hit.top(), cur_hit.bottom());
        let (next_top, next_bottom) = (next_hit.top(), next_hit.bottom());

        let border = compute_border(
            &Side {
                start: cur_top,
                end: cur_bottom,
                mean: cur.mean_y(),
                var: cur.var_y(),
                prior: cur.n() as f64 / total_n as f64,
            },
            &Side {
                start: next_top,
                end: next_bottom,
                mean: next.mean_y(),
                var: next.var_y(),
                prior: next.n() as f64 / total_n as f64,
            },
        );

        let fits =
            (border - cur_top).abs() >= min_height && (border - next_bottom).abs() >= min_height;
        if border == cur_bottom || !fits {
            continue;
        }

        debug!("Row seam y = {} -> {}", cur_bottom, border);
        for hb in hitboxes.as_mut_slice() {
            if hb.bottom() == cur_bottom {
                hb.set_bottom(border);
            } else if hb.top() == next_top {
                hb.set_top(border);
            }
        }
        moved += 1;
    }

    moved
}

fn adapt_columns(
    grid: &KeyGrid,
    rows: &[KeyStat],
    stats: &KeyStatSet,
    hitboxes: &mut HitboxSet,
    min_width: i32,
    min_frequency: u32,
) -> usize {
    let mut moved = 0;

    for (row, aggregate) in grid.rows().iter().zip(rows) {
        if aggregate.n() <= min_frequency {
            continue;
        }
        let row_n = aggregate.n() as f64;

        for pair in row.members.windows(2) {
            let (ci, ni) = (pair[0], pair[1]);
            let slice = hitboxes.as_slice();
            let (cur_hit, next_hit) = (&slice[ci], &slice[ni]);

            let (cur, next) = match (stats.get(cur_hit.code()), stats.get(next_hit.code())) {
                (Some(c), Some(n)) if c.n() > min_frequency && n.n() > min_frequency => (c, n),
                _ => continue,
            };

            let (cur_left, cur_right) = (cur_hit.left(), cur_hit.right());
            let next_right = next_hit.right();

            let mut border = compute_border(
                &Side {
                    start: cur_left,
                    end: cur_right,
                    mean: cur.mean_x(),
                    var: cur.var_x(),
                    prior: cur.n() as f64 / row_n,
                },
                &Side {
                    start: next_hit.left(),
                    end: next_right,
                    mean: next.mean_x(),
                    var: next.var_x(),
                    prior: next.n() as f64 / row_n,
                },
            );

            if (border - cur_left).abs() < min_width {
                border = cur_left + min_width;
            }
            if (border - next_right).abs() < min_width {
                border = next_right - min_width;
            }

            // Keys that were already below the minimum stay as they are.
            let fits =
                (border - cur_left).abs() >= min_width && (border - next_right).abs() >= min_width;
            if border == cur_right || !fits {
                continue;
            }

            debug!(
                "Column seam between keys {} and {}: x = {} -> {}",
                cur_hit.code(),
                next_hit.code(),
                cur_right,
                border
            );
            let slice = hitboxes.as_mut_slice();
            slice[ci].set_right(border);
            slice[ni].set_left(border);
            moved += 1;
        }
    }

    moved
}
