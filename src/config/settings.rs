// ==========================================
// 需求预测与自动调拨系统 - 运行参数
// ==========================================
// RebalanceSettings: 一次运行所需的全部参数（解析 + 校验后）
// StaticConfig: 内存配置，实现 RebalanceConfigReader
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::rebalance_config_trait::RebalanceConfigReader;
use crate::domain::types::SeasonalityProfile;
use crate::engine::{
    GapSettings, ModelSettings, OrchestratorSettings, SeriesBuilder, TransferSettings,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ==========================================
// RebalanceSettings - 运行参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceSettings {
    pub horizon_days: usize,
    pub min_history_days: usize,
    pub seasonality: SeasonalityProfile,
    pub interval_width: f64,
    pub fit_timeout_ms: u64,
    pub max_parallelism: usize,
    pub gap_window_days: usize,
    pub clamp_negative_demand: bool,
    pub min_surplus_threshold: i64,
}

impl Default for RebalanceSettings {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            min_history_days: 2,
            seasonality: SeasonalityProfile::default(),
            interval_width: 0.80,
            fit_timeout_ms: 30_000,
            max_parallelism: 0,
            gap_window_days: 7,
            clamp_negative_demand: false,
            min_surplus_threshold: 10,
        }
    }
}

impl RebalanceSettings {
    /// 从配置读取器加载并校验
    pub async fn load<C>(reader: &C) -> ConfigResult<Self>
    where
        C: RebalanceConfigReader + ?Sized,
    {
        let settings = Self {
            horizon_days: reader.get_horizon_days().await?,
            min_history_days: reader.get_min_history_days().await?,
            seasonality: reader.get_seasonality().await?,
            interval_width: reader.get_interval_width().await?,
            fit_timeout_ms: reader.get_fit_timeout_ms().await?,
            max_parallelism: reader.get_max_parallelism().await?,
            gap_window_days: reader.get_gap_window_days().await?,
            clamp_negative_demand: reader.get_clamp_negative_demand().await?,
            min_surplus_threshold: reader.get_min_surplus_threshold().await?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// 校验参数范围
    pub fn validate(&self) -> ConfigResult<()> {
        fn invalid(key: &str, value: impl ToString, message: &str) -> ConfigError {
            ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                message: message.to_string(),
            }
        }

        if self.horizon_days == 0 {
            return Err(invalid("forecast.horizon_days", self.horizon_days, "必须 ≥ 1"));
        }
        if self.min_history_days == 0 {
            return Err(invalid("forecast.min_history_days", self.min_history_days, "必须 ≥ 1"));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(invalid("forecast.interval_width", self.interval_width, "必须在 (0, 1) 内"));
        }
        if self.fit_timeout_ms == 0 {
            return Err(invalid("forecast.fit_timeout_ms", self.fit_timeout_ms, "必须 ≥ 1"));
        }
        if self.gap_window_days == 0 {
            return Err(invalid("gap.window_days", self.gap_window_days, "必须 ≥ 1"));
        }
        if self.min_surplus_threshold < 0 {
            return Err(invalid(
                "transfer.min_surplus_threshold",
                self.min_surplus_threshold,
                "必须 ≥ 0",
            ));
        }
        Ok(())
    }

    // ===== 引擎参数转换 =====

    pub fn series_builder(&self) -> SeriesBuilder {
        SeriesBuilder::new(self.min_history_days)
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            seasonality: self.seasonality,
            interval_width: self.interval_width,
            ..ModelSettings::default()
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            horizon_days: self.horizon_days,
            fit_timeout: Duration::from_millis(self.fit_timeout_ms),
            max_parallelism: self.max_parallelism,
        }
    }

    pub fn gap_settings(&self) -> GapSettings {
        GapSettings {
            window_days: self.gap_window_days,
            clamp_negative_demand: self.clamp_negative_demand,
        }
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            min_surplus_threshold: self.min_surplus_threshold,
        }
    }
}

// ==========================================
// StaticConfig - 内存配置
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    settings: RebalanceSettings,
}

impl StaticConfig {
    pub fn new(settings: RebalanceSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl RebalanceConfigReader for StaticConfig {
    async fn get_horizon_days(&self) -> ConfigResult<usize> {
        Ok(self.settings.horizon_days)
    }

    async fn get_min_history_days(&self) -> ConfigResult<usize> {
        Ok(self.settings.min_history_days)
    }

    async fn get_seasonality(&self) -> ConfigResult<SeasonalityProfile> {
        Ok(self.settings.seasonality)
    }

    async fn get_interval_width(&self) -> ConfigResult<f64> {
        Ok(self.settings.interval_width)
    }

    async fn get_fit_timeout_ms(&self) -> ConfigResult<u64> {
        Ok(self.settings.fit_timeout_ms)
    }

    async fn get_max_parallelism(&self) -> ConfigResult<usize> {
        Ok(self.settings.max_parallelism)
    }

    async fn get_gap_window_days(&self) -> ConfigResult<usize> {
        Ok(self.settings.gap_window_days)
    }

    async fn get_clamp_negative_demand(&self) -> ConfigResult<bool> {
        Ok(self.settings.clamp_negative_demand)
    }

    async fn get_min_surplus_threshold(&self) -> ConfigResult<i64> {
        Ok(self.settings.min_surplus_threshold)
    }

    /// 内存配置无覆写表，快照为完整参数
    async fn config_snapshot(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(&self.settings)?)
    }
}
