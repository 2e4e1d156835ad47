/// One side of a boundary: its current extent on the axis and the
/// distribution of touches observed for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Side {
    pub start: i32,
    pub end: i32,
    pub mean: f64,
    pub var: f64,
    pub prior: f64,
}

/// Two-class Gaussian decision boundary between `left` and `right`: the
/// coordinate where the prior-weighted density of `right` overtakes `left`,
/// floored to whole pixels.
///
/// Degenerate inputs (a zero prior or variance on either side, or equal
/// variances with equal means) return `right.start`, the current boundary.
/// With unequal variances the root strictly inside `(left.start, right.end)`
/// is taken, falling back to `left.end` when neither root qualifies.
pub fn compute_border(left: &Side, right: &Side) -> i32 {
    if left.prior == 0.0 || right.prior == 0.0 || left.var == 0.0 || right.var == 0.0 {
        return right.start;
    }

    let (ml, mr, vl, vr) = (left.mean, right.mean, left.var, right.var);
    let log_odds = (left.prior / vl.sqrt()).ln() - (right.prior / vr.sqrt()).ln();

    if vl != vr {
        let p = (2.0 * mr * vl - 2.0 * ml * vr) / (vr - vl);
        let q = (vr * ml * ml - vl * mr * mr - 2.0 * vl * vr * log_odds) / (vr - vl);
        let root = ((p / 2.0) * (p / 2.0) - q).sqrt();

        [-p / 2.0 - root, -p / 2.0 + root]
            .into_iter()
            .filter(|b| b.is_finite())
            .map(|b| b.floor())
            .find(|&b| (left.start as f64) < b && b < (right.end as f64))
            .map(|b| b as i32)
            .unwrap_or(left.end)
    } else {
        if ml == mr {
            return right.start;
        }
        let border = ((vl * 2.0 * log_odds - ml * ml + mr * mr) / (2.0 * (mr - ml))).floor();
        if border.is_finite() {
            border as i32
        } else {
            right.start
        }
    }
}
