// ==========================================
// 需求预测与自动调拨系统 - API层错误类型
// ==========================================
// 职责: 汇聚各层错误，向调用方给出显式原因
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::error::EngineError;
use crate::export::error::ExportError;
use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("引擎执行失败: {0}")]
    Engine(#[from] EngineError),

    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("文件导出失败: {0}")]
    Export(#[from] ExportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// 错误代码（供日志 / 上层展示）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Engine(e) => e.reason_code(),
            ApiError::Import(_) => "IMPORT_FAILED",
            ApiError::Export(_) => "EXPORT_FAILED",
            ApiError::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
