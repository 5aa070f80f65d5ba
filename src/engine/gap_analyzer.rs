// ==========================================
// 需求预测与自动调拨系统 - 库存缺口分析引擎
// ==========================================
// 输入: 统一预测表 + 库存快照
// 输出: 每个 (商品, 仓库) 的 GapRecord（内连接语义）
// 规则:
// 1) 仅取预测期数据，按日期升序取最早 W 天
// 2) forecasted_demand = round(Σ yhat)
// 3) gap = round(current_inventory - Σ yhat)
// 4) 无库存行的组合静默排除，但计入排除统计
// 取整: 银行家舍入（ties-to-even）
// ==========================================

use crate::domain::forecast::ForecastPoint;
use crate::domain::inventory::{GapRecord, InventorySnapshot};
use crate::domain::types::PairKey;
use crate::engine::error::{EngineError, EngineResult};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

// ==========================================
// GapSettings - 缺口分析参数
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct GapSettings {
    pub window_days: usize,          // 近期窗口: 默认 7 天
    pub clamp_negative_demand: bool, // 负预测值是否截断为 0: 默认 false
}

impl Default for GapSettings {
    fn default() -> Self {
        Self {
            window_days: 7,
            clamp_negative_demand: false,
        }
    }
}

// ==========================================
// GapReport - 缺口分析结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapReport {
    /// 缺口记录（按 (item_id, location_id) 排序）
    pub records: Vec<GapRecord>,
    /// 有预测、无库存的组合
    pub missing_inventory: Vec<PairKey>,
    /// 有库存、无预测的组合
    pub missing_forecast: Vec<PairKey>,
}

impl GapReport {
    pub fn excluded_count(&self) -> usize {
        self.missing_inventory.len() + self.missing_forecast.len()
    }

    pub fn shortages(&self) -> impl Iterator<Item = &GapRecord> {
        self.records.iter().filter(|r| r.is_shortage())
    }
}

// ==========================================
// GapAnalyzer - 缺口分析引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct GapAnalyzer {
    settings: GapSettings,
}

impl GapAnalyzer {
    pub fn new(settings: GapSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GapSettings {
        &self.settings
    }

    /// 计算库存缺口
    ///
    /// # 错误
    /// - window_days = 0: InvalidParameter
    /// - 预测表与库存表无交集: NoGapRecords
    #[instrument(skip(self, forecast, inventory), fields(
        forecast_rows = forecast.len(),
        inventory_rows = inventory.len(),
        window_days = self.settings.window_days
    ))]
    pub fn analyze(
        &self,
        forecast: &[ForecastPoint],
        inventory: &[InventorySnapshot],
    ) -> EngineResult<GapReport> {
        if self.settings.window_days == 0 {
            return Err(EngineError::InvalidParameter("近期窗口必须为正整数".to_string()));
        }

        let mut by_pair: BTreeMap<PairKey, Vec<&ForecastPoint>> = BTreeMap::new();
        for point in forecast {
            by_pair.entry(point.pair_key()).or_default().push(point);
        }

        // 同一组合多行库存时取首行
        let mut stock: HashMap<PairKey, f64> = HashMap::new();
        for snap in inventory {
            stock.entry(snap.pair_key()).or_insert(snap.current_inventory);
        }

        let mut report = GapReport::default();
        for (pair, points) in &by_pair {
            let Some(current_inventory) = stock.get(pair).copied() else {
                debug!(pair = %pair, "无库存记录，排除");
                report.missing_inventory.push(pair.clone());
                continue;
            };

            let raw_demand = self.near_term_demand(points);
            report.records.push(GapRecord {
                item_id: pair.item_id.clone(),
                location_id: pair.location_id.clone(),
                forecasted_demand: round_half_even(raw_demand),
                current_inventory,
                gap: round_half_even(current_inventory - raw_demand),
            });
        }

        let mut missing_forecast: Vec<PairKey> = stock
            .keys()
            .filter(|pair| !by_pair.contains_key(*pair))
            .cloned()
            .collect();
        missing_forecast.sort();
        report.missing_forecast = missing_forecast;

        if report.records.is_empty() {
            return Err(EngineError::NoGapRecords {
                forecast_pairs: by_pair.len(),
                inventory_rows: inventory.len(),
            });
        }

        info!(
            gap_records = report.records.len(),
            shortages = report.shortages().count(),
            missing_inventory = report.missing_inventory.len(),
            missing_forecast = report.missing_forecast.len(),
            "缺口分析完成"
        );
        Ok(report)
    }

    /// 预测期内最早 W 天的需求之和（未取整）
    fn near_term_demand(&self, points: &[&ForecastPoint]) -> f64 {
        let mut future: Vec<&ForecastPoint> = points.iter().copied().filter(|p| p.is_future).collect();
        future.sort_by_key(|p| p.day);
        future
            .iter()
            .take(self.settings.window_days)
            .map(|p| {
                if self.settings.clamp_negative_demand {
                    p.predicted_quantity.max(0.0)
                } else {
                    p.predicted_quantity
                }
            })
            .sum()
    }
}

fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}
