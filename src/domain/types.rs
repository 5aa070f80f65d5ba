// ==========================================
// 需求预测与自动调拨系统 - 领域类型定义
// ==========================================
// 职责: 跨实体共享的键与枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// PairKey - (商品, 仓库) 组合键
// ==========================================
// 排序规则: 先 item_id 再 location_id（用于保证输出顺序稳定）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub item_id: String,
    pub location_id: String,
}

impl PairKey {
    pub fn new(item_id: impl Into<String>, location_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            location_id: location_id.into(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.item_id, self.location_id)
    }
}

// ==========================================
// 季节性配置 (Seasonality Profile)
// ==========================================
// 默认: 仅周季节性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalityProfile {
    pub weekly: bool,
    pub yearly: bool,
    pub daily: bool,
}

impl Default for SeasonalityProfile {
    fn default() -> Self {
        Self {
            weekly: true,
            yearly: false,
            daily: false,
        }
    }
}

impl fmt::Display for SeasonalityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.weekly {
            parts.push("WEEKLY");
        }
        if self.yearly {
            parts.push("YEARLY");
        }
        if self.daily {
            parts.push("DAILY");
        }
        if parts.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}

// ==========================================
// 调拨表状态 (Transfer Table Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    NoShortage,               // 无缺货，无需调拨
    ShortageWithoutTransfers, // 存在缺货，但无可用富余
    TransfersPlanned,         // 已生成调拨建议
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::NoShortage => write!(f, "NO_SHORTAGE"),
            TransferStatus::ShortageWithoutTransfers => write!(f, "SHORTAGE_WITHOUT_TRANSFERS"),
            TransferStatus::TransfersPlanned => write!(f, "TRANSFERS_PLANNED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_ordering() {
        let mut keys = vec![
            PairKey::new("SKU2", "WH1"),
            PairKey::new("SKU1", "WH2"),
            PairKey::new("SKU1", "WH1"),
        ];
        keys.sort();
        assert_eq!(keys[0], PairKey::new("SKU1", "WH1"));
        assert_eq!(keys[1], PairKey::new("SKU1", "WH2"));
        assert_eq!(keys[2], PairKey::new("SKU2", "WH1"));
    }

    #[test]
    fn test_seasonality_display() {
        assert_eq!(SeasonalityProfile::default().to_string(), "WEEKLY");
        let none = SeasonalityProfile {
            weekly: false,
            yearly: false,
            daily: false,
        };
        assert_eq!(none.to_string(), "NONE");
    }
}
