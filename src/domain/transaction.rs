// ==========================================
// 需求预测与自动调拨系统 - 交易与需求序列领域模型
// ==========================================
// TransactionRecord: 原始交易行（只读事实源）
// DemandSeries: 按日补零后的连续需求序列
// ==========================================

use crate::domain::types::PairKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// TransactionRecord - 交易记录
// ==========================================
// 一行 = 一次销售事件或已按日汇总的销量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,      // 交易日期
    pub item_id: String,      // 商品编码 (sku_id)
    pub location_id: String,  // 仓库编码 (warehouse_id)
    pub quantity: f64,        // 销量（非负）
}

impl TransactionRecord {
    pub fn new(
        date: NaiveDate,
        item_id: impl Into<String>,
        location_id: impl Into<String>,
        quantity: f64,
    ) -> Self {
        Self {
            date,
            item_id: item_id.into(),
            location_id: location_id.into(),
            quantity,
        }
    }

    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.item_id.clone(), self.location_id.clone())
    }

    pub fn belongs_to(&self, pair: &PairKey) -> bool {
        self.item_id == pair.item_id && self.location_id == pair.location_id
    }
}

// ==========================================
// DemandSeries - 日需求序列
// ==========================================
// 不变量: 日期严格递增、逐日连续、无重复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSeries {
    pub item_id: String,
    pub location_id: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl DemandSeries {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.item_id.clone(), self.location_id.clone())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, q)| *q).collect()
    }

    /// 检查序列是否逐日连续
    pub fn is_contiguous(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].0.succ_opt() == Some(w[1].0))
    }

    /// 将序列还原为交易记录（每日一行，用于重跑构建器）
    pub fn to_records(&self) -> Vec<TransactionRecord> {
        self.points
            .iter()
            .map(|(day, qty)| {
                TransactionRecord::new(*day, self.item_id.clone(), self.location_id.clone(), *qty)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_contiguity_check() {
        let series = DemandSeries {
            item_id: "SKU1".to_string(),
            location_id: "WH1".to_string(),
            points: vec![(d(2024, 1, 1), 1.0), (d(2024, 1, 2), 0.0), (d(2024, 1, 3), 2.0)],
        };
        assert!(series.is_contiguous());
        assert_eq!(series.first_day(), Some(d(2024, 1, 1)));
        assert_eq!(series.last_day(), Some(d(2024, 1, 3)));

        let gapped = DemandSeries {
            points: vec![(d(2024, 1, 1), 1.0), (d(2024, 1, 3), 2.0)],
            ..series
        };
        assert!(!gapped.is_contiguous());
    }

    #[test]
    fn test_belongs_to() {
        let rec = TransactionRecord::new(d(2024, 1, 1), "SKU1", "WH1", 3.0);
        assert!(rec.belongs_to(&PairKey::new("SKU1", "WH1")));
        assert!(!rec.belongs_to(&PairKey::new("SKU1", "WH2")));
    }
}
