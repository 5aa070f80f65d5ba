// ==========================================
// 需求预测与自动调拨系统 - 趋势 + 季节性加法模型
// ==========================================
// 模型: y(t) = k + m·t + Σ 傅里叶季节项
// - t: 历史区间缩放到 [0, 1]
// - 周季节: 周期 7 天，阶数 3
// - 年季节: 周期 365.25 天，阶数 10
// - 日季节: 日粒度数据下无意义，接受配置但不建模
// 区间: yhat ± z·σ·sqrt(1 + h/n)
// ==========================================

use crate::domain::forecast::ForecastPoint;
use crate::domain::transaction::DemandSeries;
use crate::domain::types::SeasonalityProfile;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::forecast_model::linalg::NormalEquations;
use crate::engine::forecast_model::DemandForecaster;
use chrono::{Datelike, NaiveDate};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use tracing::debug;

const WEEKLY_PERIOD: f64 = 7.0;
const YEARLY_PERIOD: f64 = 365.25;

/// 趋势参数的数值稳定项
const TREND_RIDGE: f64 = 1e-8;

// ==========================================
// ModelSettings - 模型参数
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub seasonality: SeasonalityProfile,
    /// 预测区间宽度 (0, 1)，默认 0.80
    pub interval_width: f64,
    pub weekly_fourier_order: usize,
    pub yearly_fourier_order: usize,
    /// 季节项先验尺度，惩罚 = 1 / scale²
    pub seasonality_prior_scale: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            seasonality: SeasonalityProfile::default(),
            interval_width: 0.80,
            weekly_fourier_order: 3,
            yearly_fourier_order: 10,
            seasonality_prior_scale: 10.0,
        }
    }
}

// ==========================================
// SeasonalTrendModel - 模型（无状态，可跨线程共享）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SeasonalTrendModel {
    settings: ModelSettings,
}

/// 拟合后的模型状态
#[derive(Debug, Clone)]
pub struct FittedSeasonalTrend {
    item_id: String,
    location_id: String,
    first_day: NaiveDate,
    n: usize,
    t_span: f64,
    y_scale: f64,
    coefficients: Vec<f64>,
    sigma: f64,
    z: f64,
    fourier: Vec<(f64, usize)>,
}

impl SeasonalTrendModel {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// 季节项列表: (周期, 阶数)
    fn fourier_terms(&self) -> Vec<(f64, usize)> {
        let mut terms = Vec::new();
        if self.settings.seasonality.weekly && self.settings.weekly_fourier_order > 0 {
            terms.push((WEEKLY_PERIOD, self.settings.weekly_fourier_order));
        }
        if self.settings.seasonality.yearly && self.settings.yearly_fourier_order > 0 {
            terms.push((YEARLY_PERIOD, self.settings.yearly_fourier_order));
        }
        terms
    }

    /// 拟合单条需求序列
    ///
    /// # 错误
    /// - 空序列: InsufficientData
    /// - 非有限值 / 方程组奇异 / 结果非有限: ModelFit
    pub fn fit(&self, series: &DemandSeries) -> EngineResult<FittedSeasonalTrend> {
        let width = self.settings.interval_width;
        if !(width > 0.0 && width < 1.0) {
            return Err(EngineError::InvalidParameter(format!(
                "interval_width 必须在 (0, 1) 内，实际 {}",
                width
            )));
        }

        let first_day = series.first_day().ok_or(EngineError::InsufficientData {
            needed: 1,
            got: 0,
        })?;
        let values = series.values();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::ModelFit("需求序列包含非有限值".to_string()));
        }

        if self.settings.seasonality.daily {
            debug!(pair = %series.pair_key(), "日粒度数据不建模日内季节性");
        }

        let n = values.len();
        let t_span = (n.saturating_sub(1)).max(1) as f64;
        let y_scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let fourier = self.fourier_terms();
        let num_params = 2 + fourier.iter().map(|(_, order)| 2 * order).sum::<usize>();

        let mut equations = NormalEquations::new(num_params);
        for (idx, (day, qty)) in series.points.iter().enumerate() {
            let row = design_row(*day, idx as f64 / t_span, &fourier);
            equations.observe(&row, qty / y_scale);
        }
        equations.penalize(0, TREND_RIDGE);
        equations.penalize(1, TREND_RIDGE);
        let seasonal_ridge = 1.0 / self.settings.seasonality_prior_scale.powi(2);
        for idx in 2..num_params {
            equations.penalize(idx, seasonal_ridge);
        }

        let coefficients = equations
            .solve()
            .ok_or_else(|| EngineError::ModelFit("正规方程非正定".to_string()))?;
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(EngineError::ModelFit("回归系数非有限".to_string()));
        }

        let mut sse = 0.0;
        for (idx, (day, qty)) in series.points.iter().enumerate() {
            let row = design_row(*day, idx as f64 / t_span, &fourier);
            let fitted = dot(&row, &coefficients) * y_scale;
            sse += (qty - fitted).powi(2);
        }
        let dof = n.saturating_sub(2).max(1) as f64;
        let sigma = (sse / dof).sqrt();

        let normal = Normal::new(0.0, 1.0).map_err(|e| EngineError::ModelFit(e.to_string()))?;
        let z = normal.inverse_cdf((1.0 + width) / 2.0);

        if !sigma.is_finite() || !z.is_finite() {
            return Err(EngineError::ModelFit("残差方差非有限".to_string()));
        }

        Ok(FittedSeasonalTrend {
            item_id: series.item_id.clone(),
            location_id: series.location_id.clone(),
            first_day,
            n,
            t_span,
            y_scale,
            coefficients,
            sigma,
            z,
            fourier,
        })
    }
}

impl FittedSeasonalTrend {
    pub fn residual_sigma(&self) -> f64 {
        self.sigma
    }

    /// 生成历史区间 + 预测期的全部预测点
    pub fn forecast(&self, horizon: usize) -> EngineResult<Vec<ForecastPoint>> {
        let mut points = Vec::with_capacity(self.n + horizon);
        for (idx, day) in self.first_day.iter_days().take(self.n + horizon).enumerate() {
            let row = design_row(day, idx as f64 / self.t_span, &self.fourier);
            let yhat = dot(&row, &self.coefficients) * self.y_scale;
            let steps_ahead = (idx + 1).saturating_sub(self.n) as f64;
            let half_width = self.z * self.sigma * (1.0 + steps_ahead / self.n as f64).sqrt();

            if !yhat.is_finite() || !half_width.is_finite() {
                return Err(EngineError::ModelFit(format!("第 {} 天预测值非有限", day)));
            }

            points.push(ForecastPoint {
                item_id: self.item_id.clone(),
                location_id: self.location_id.clone(),
                day,
                predicted_quantity: yhat,
                lower_bound: yhat - half_width,
                upper_bound: yhat + half_width,
                is_future: idx >= self.n,
            });
        }
        Ok(points)
    }
}

impl DemandForecaster for SeasonalTrendModel {
    fn fit_predict(&self, series: &DemandSeries, horizon: usize) -> EngineResult<Vec<ForecastPoint>> {
        if horizon == 0 {
            return Err(EngineError::InvalidParameter("预测期必须为正整数".to_string()));
        }
        self.fit(series)?.forecast(horizon)
    }

    fn name(&self) -> &str {
        "SeasonalTrend"
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 设计矩阵行: [1, t, sin/cos ...]
///
/// 季节项以公历绝对日序计算，保证星期对齐与序列起点无关
fn design_row(day: NaiveDate, t: f64, fourier: &[(f64, usize)]) -> Vec<f64> {
    let abs_day = day.num_days_from_ce() as f64;
    let mut row = vec![1.0, t];
    for (period, order) in fourier {
        for k in 1..=*order {
            let angle = 2.0 * PI * k as f64 * abs_day / period;
            row.push(angle.sin());
            row.push(angle.cos());
        }
    }
    row
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
