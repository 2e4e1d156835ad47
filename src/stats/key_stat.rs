use crate::KeyCode;
use serde::{Deserialize, Serialize};

/// Online accumulator of the touch positions recorded for one key.
///
/// Keeps the running means and the co-moment sums `Σ(x-x̄)²`, `Σ(y-ȳ)²` and
/// `Σ(x-x̄)(y-ȳ)`. Variances and the covariance use the unbiased `n - 1`
/// denominator and are reported as zero while `n <= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyStat {
    code: KeyCode,
    mean_x: f64,
    mean_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
    n: u32,
}

impl KeyStat {
    /// Empty accumulator (n = 0).
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            mean_x: 0.0,
            mean_y: 0.0,
            sum_xx: 0.0,
            sum_yy: 0.0,
            sum_xy: 0.0,
            n: 0,
        }
    }

    /// Accumulator holding exactly one observation.
    pub fn with_sample(code: KeyCode, x: i32, y: i32) -> Self {
        Self {
            mean_x: x as f64,
            mean_y: y as f64,
            n: 1,
            ..Self::new(code)
        }
    }

    /// Rebuilds an accumulator from already summarised statistics.
    pub fn from_summary(
        code: KeyCode,
        mean_x: f64,
        mean_y: f64,
        var_x: f64,
        var_y: f64,
        cov_xy: f64,
        n: u32,
    ) -> Self {
        let dof = n.saturating_sub(1) as f64;
        Self {
            code,
            mean_x,
            mean_y,
            sum_xx: var_x * dof,
            sum_yy: var_y * dof,
            sum_xy: cov_xy * dof,
            n,
        }
    }

    pub fn code(&self) -> KeyCode {
        self.code
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn mean_x(&self) -> f64 {
        self.mean_x
    }

    pub fn mean_y(&self) -> f64 {
        self.mean_y
    }

    pub fn var_x(&self) -> f64 {
        self.unbiased(self.sum_xx)
    }

    pub fn var_y(&self) -> f64 {
        self.unbiased(self.sum_yy)
    }

    pub fn cov_xy(&self) -> f64 {
        self.unbiased(self.sum_xy)
    }

    #[inline(always)]
    fn unbiased(&self, sum: f64) -> f64 {
        if self.n <= 1 {
            0.0
        } else {
            sum / (self.n - 1) as f64
        }
    }

    /// Adds one observation (Welford update).
    pub fn add(&mut self, x: i32, y: i32) {
        self.n += 1;
        if self.n == 1 {
            self.mean_x = x as f64;
            self.mean_y = y as f64;
            return;
        }

        let n = self.n as f64;
        let dx = x as f64 - self.mean_x;
        let dy = y as f64 - self.mean_y;
        self.mean_x += dx / n;
        self.mean_y += dy / n;

        let weight = (n - 1.0) / n;
        self.sum_xx += dx * dx * weight;
        self.sum_yy += dy * dy * weight;
        self.sum_xy += dx * dy * weight;
    }

    /// Pools the statistics of an independent accumulator into this one.
    pub fn merge(&mut self, other: &KeyStat) {
        if other.n == 0 {
            return;
        }

        let n_self = self.n as f64;
        let n_other = other.n as f64;
        let total = n_self + n_other;

        let pooled_x = (self.mean_x * n_self + other.mean_x * n_other) / total;
        let pooled_y = (self.mean_y * n_self + other.mean_y * n_other) / total;

        let dx1 = self.mean_x - pooled_x;
        let dy1 = self.mean_y - pooled_y;
        let dx2 = other.mean_x - pooled_x;
        let dy2 = other.mean_y - pooled_y;

        self.sum_xx += n_self * dx1 * dx1 + other.sum_xx + n_other * dx2 * dx2;
        self.sum_yy += n_self * dy1 * dy1 + other.sum_yy + n_other * dy2 * dy2;
        self.sum_xy += n_self * dx1 * dy1 + other.sum_xy + n_other * dx2 * dy2;
        self.mean_x = pooled_x;
        self.mean_y = pooled_y;
        self.n += other.n;
    }

    /// Rescales the sample count only. Co-moment sums are left as they are.
    pub fn multiply_n(&mut self, factor: f64) {
        self.n = (factor * self.n as f64).round() as u32;
    }

    /// Shrinks the accumulator to roughly `fraction` of its samples while
    /// keeping means, variances and covariance. Returns the fraction that was
    /// actually applied after rounding to a whole sample count, or `1.0`
    /// without touching anything when `fraction` lies outside `[0, 1]`.
    pub fn reduce_data(&mut self, fraction: f64) -> f64 {
        if !(0.0..=1.0).contains(&fraction) {
            return 1.0;
        }
        if self.n == 0 {
            return 1.0;
        }

        let n = self.n as f64;
        let actual = (fraction * n).floor() / n;

        self.sum_xx *= actual;
        self.sum_yy *= actual;
        self.sum_xy *= actual;
        self.n = (actual * n).round() as u32;

        actual
    }
}
