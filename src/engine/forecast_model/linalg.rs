// ==========================================
// 最小二乘求解辅助
// ==========================================

/// 正规方程累加器: 累积 X'X 与 X'y
#[derive(Debug, Clone)]
pub(crate) struct NormalEquations {
    xtx: Vec<Vec<f64>>,
    xty: Vec<f64>,
}

impl NormalEquations {
    pub(crate) fn new(num_params: usize) -> Self {
        Self {
            xtx: vec![vec![0.0; num_params]; num_params],
            xty: vec![0.0; num_params],
        }
    }

    /// 累加一行观测
    pub(crate) fn observe(&mut self, row: &[f64], y: f64) {
        for i in 0..row.len() {
            for j in 0..row.len() {
                self.xtx[i][j] += row[i] * row[j];
            }
            self.xty[i] += row[i] * y;
        }
    }

    /// 在对角线上加惩罚项（岭回归）
    pub(crate) fn penalize(&mut self, index: usize, lambda: f64) {
        self.xtx[index][index] += lambda;
    }

    pub(crate) fn solve(&self) -> Option<Vec<f64>> {
        solve_symmetric(&self.xtx, &self.xty)
    }
}

/// Cholesky 分解求解对称正定方程组 A x = b
///
/// 非正定时返回 None
pub(crate) fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // 前代: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // 回代: L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}
