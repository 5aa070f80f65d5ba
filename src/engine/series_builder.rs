// ==========================================
// 需求预测与自动调拨系统 - 需求序列构建器
// ==========================================
// 输入: 单个 (商品, 仓库) 组合的全部交易记录
// 输出: 逐日连续、缺失日补 0 的 DemandSeries
// 红线: 纯函数，不做跨组合日期对齐
// ==========================================

use crate::domain::transaction::{DemandSeries, TransactionRecord};
use crate::domain::types::PairKey;
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// 默认最小历史天数
pub const DEFAULT_MIN_HISTORY_DAYS: usize = 2;

// ==========================================
// SeriesBuilder - 需求序列构建器
// ==========================================
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    min_history_days: usize,
}

impl SeriesBuilder {
    /// 构造函数
    ///
    /// # 参数
    /// - `min_history_days`: 日期区间（首日到末日，含两端）的最小天数
    pub fn new(min_history_days: usize) -> Self {
        Self { min_history_days }
    }

    pub fn min_history_days(&self) -> usize {
        self.min_history_days
    }

    /// 构建单组合的日需求序列
    ///
    /// 规则：
    /// 1) 同日销量求和
    /// 2) 区间为该组合自身的 [最早日, 最晚日]
    /// 3) 区间内缺失日补 0
    ///
    /// 不属于 `pair` 的记录被忽略。
    ///
    /// # 错误
    /// - 无交易 / 区间天数不足: `EngineError::InsufficientData`
    pub fn build(&self, pair: &PairKey, records: &[TransactionRecord]) -> EngineResult<DemandSeries> {
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for rec in records.iter().filter(|r| r.belongs_to(pair)) {
            *daily.entry(rec.date).or_insert(0.0) += rec.quantity;
        }

        let (first, last) = match (daily.keys().next(), daily.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(EngineError::InsufficientData {
                    needed: self.min_history_days.max(1),
                    got: 0,
                })
            }
        };

        let span_days = (last - first).num_days() as usize + 1;
        if span_days < self.min_history_days {
            return Err(EngineError::InsufficientData {
                needed: self.min_history_days,
                got: span_days,
            });
        }

        let points: Vec<(NaiveDate, f64)> = first
            .iter_days()
            .take(span_days)
            .map(|day| (day, daily.get(&day).copied().unwrap_or(0.0)))
            .collect();

        debug!(
            pair = %pair,
            observed_days = daily.len(),
            span_days,
            "需求序列构建完成"
        );

        Ok(DemandSeries {
            item_id: pair.item_id.clone(),
            location_id: pair.location_id.clone(),
            points,
        })
    }
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_HISTORY_DAYS)
    }
}
