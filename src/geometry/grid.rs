use super::HitboxSet;

/// One visual row: the shared top coordinate and the indices of its
/// hitboxes (into the owning `HitboxSet`), ordered left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub top: i32,
    pub members: Vec<usize>,
}

/// Row/column index over a `HitboxSet`, keyed by (top-Y, left-X).
///
/// Built once before a boundary pass. Indices stay valid while the set is
/// mutated through `as_mut_slice`, and grouping is fixed at build time even
/// when edges move afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyGrid {
    rows: Vec<GridRow>,
}

impl KeyGrid {
    pub fn build(hitboxes: &HitboxSet) -> Self {
        let slice = hitboxes.as_slice();
        let mut order: Vec<usize> = (0..slice.len()).collect();
        // stable: ties keep reading order
        order.sort_by_key(|&i| (slice[i].top(), slice[i].left()));

        let mut rows: Vec<GridRow> = Vec::new();
        for idx in order {
            let top = slice[idx].top();
            match rows.last_mut() {
                Some(row) if row.top == top => row.members.push(idx),
                _ => rows.push(GridRow {
                    top,
                    members: vec![idx],
                }),
            }
        }

        Self { rows }
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
