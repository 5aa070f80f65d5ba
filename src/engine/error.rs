// ==========================================
// 需求预测与自动调拨系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类:
// - 单组合错误（数据不足 / 模型拟合失败 / 超时）: 由编排器捕获并计数
// - 全局空结果（无预测 / 无缺口记录）: 必须上报调用方
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 单组合错误 =====
    #[error("数据不足: 至少需要 {needed} 天历史，实际 {got} 天")]
    InsufficientData { needed: usize, got: usize },

    #[error("模型拟合失败: {0}")]
    ModelFit(String),

    #[error("模型拟合超时: 超过 {timeout_ms} 毫秒")]
    FitTimeout { timeout_ms: u64 },

    // ===== 参数错误 =====
    #[error("参数无效: {0}")]
    InvalidParameter(String),

    // ===== 全局空结果 =====
    #[error("未生成任何预测: 共 {attempted} 个组合，全部跳过 ({skipped})")]
    NoForecastsProduced { attempted: usize, skipped: usize },

    #[error("无缺口记录: 预测组合 {forecast_pairs} 个，库存行 {inventory_rows} 行，无交集")]
    NoGapRecords {
        forecast_pairs: usize,
        inventory_rows: usize,
    },
}

impl EngineError {
    /// 是否为单组合级别错误（可跳过并继续）
    pub fn is_pair_local(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientData { .. }
                | EngineError::ModelFit(_)
                | EngineError::FitTimeout { .. }
        )
    }

    /// 原因代码（用于跳过统计）
    pub fn reason_code(&self) -> &'static str {
        match self {
            EngineError::InsufficientData { .. } => "INSUFFICIENT_DATA",
            EngineError::ModelFit(_) => "MODEL_FIT_FAILURE",
            EngineError::FitTimeout { .. } => "FIT_TIMEOUT",
            EngineError::InvalidParameter(_) => "INVALID_PARAMETER",
            EngineError::NoForecastsProduced { .. } => "NO_FORECASTS_PRODUCED",
            EngineError::NoGapRecords { .. } => "NO_GAP_RECORDS",
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::InsufficientData { needed: 2, got: 1 };
        assert!(err.to_string().contains("至少需要 2"));
        assert!(err.is_pair_local());
        assert_eq!(err.reason_code(), "INSUFFICIENT_DATA");

        let err = EngineError::NoForecastsProduced {
            attempted: 3,
            skipped: 3,
        };
        assert!(!err.is_pair_local());
        assert_eq!(err.reason_code(), "NO_FORECASTS_PRODUCED");
    }
}
