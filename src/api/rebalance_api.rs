// ==========================================
// 需求预测与自动调拨系统 - 调拨决策 API
// ==========================================
// 流程: 解析配置 → 预测编排 → 缺口分析 → 调拨规划 → 预警
// 每次运行独立生成 run_id，不合并历史结果
// ==========================================

use crate::api::error::ApiResult;
use crate::config::rebalance_config_trait::RebalanceConfigReader;
use crate::config::settings::RebalanceSettings;
use crate::domain::inventory::InventorySnapshot;
use crate::domain::transaction::TransactionRecord;
use crate::domain::transfer::TransferPlan;
use crate::domain::types::TransferStatus;
use crate::engine::alerts::{low_stock_alerts, transfer_status, LowStockAlert};
use crate::engine::forecast_model::{DemandForecaster, SeasonalTrendModel};
use crate::engine::gap_analyzer::{GapAnalyzer, GapReport};
use crate::engine::orchestrator::{ForecastOrchestrator, ForecastRunReport};
use crate::engine::transfer_planner::TransferPlanner;
use crate::importer::{import_inventory, import_transactions};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ForecastStage - 预测阶段结果
// ==========================================
// 预测表在库存表参与之前即可导出
#[derive(Debug, Clone)]
pub struct ForecastStage {
    pub run_id: String,
    /// 本次运行使用的参数
    pub settings: RebalanceSettings,
    /// 配置快照（JSON）
    pub config_snapshot: String,
    pub forecast: ForecastRunReport,
}

// ==========================================
// RebalanceReport - 单次运行报告
// ==========================================
#[derive(Debug, Clone)]
pub struct RebalanceReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    /// 本次运行使用的参数
    pub settings: RebalanceSettings,
    /// 配置快照（JSON），用于复现
    pub config_snapshot: String,
    pub forecast: ForecastRunReport,
    pub gaps: GapReport,
    pub plan: TransferPlan,
    pub alerts: Vec<LowStockAlert>,
    pub status: TransferStatus,
}

// ==========================================
// RebalanceApi
// ==========================================
pub struct RebalanceApi<C: RebalanceConfigReader> {
    config: Arc<C>,
    model_override: Option<Arc<dyn DemandForecaster>>,
}

impl<C: RebalanceConfigReader> RebalanceApi<C> {
    pub fn new(config: Arc<C>) -> Self {
        Self {
            config,
            model_override: None,
        }
    }

    /// 替换预测模型（默认按配置构建 SeasonalTrendModel）
    pub fn with_model(mut self, model: Arc<dyn DemandForecaster>) -> Self {
        self.model_override = Some(model);
        self
    }

    /// 读取并校验本次运行参数
    pub async fn resolve_settings(&self) -> ApiResult<RebalanceSettings> {
        Ok(RebalanceSettings::load(self.config.as_ref()).await?)
    }

    fn orchestrator(&self, settings: &RebalanceSettings) -> ForecastOrchestrator {
        let model: Arc<dyn DemandForecaster> = match &self.model_override {
            Some(model) => Arc::clone(model),
            None => Arc::new(SeasonalTrendModel::new(settings.model_settings())),
        };
        ForecastOrchestrator::new(
            settings.series_builder(),
            model,
            settings.orchestrator_settings(),
        )
    }

    /// 预测阶段: 解析配置 → 预测编排
    #[instrument(skip(self, transactions), fields(records = transactions.len()))]
    pub async fn forecast_stage(&self, transactions: &[TransactionRecord]) -> ApiResult<ForecastStage> {
        let run_id = Uuid::new_v4().to_string();
        let settings = self.resolve_settings().await?;
        let config_snapshot = self.config.config_snapshot().await?;
        info!(run_id = %run_id, ?settings, "开始调拨决策运行");

        let forecast = self.orchestrator(&settings).run(transactions).await?;
        Ok(ForecastStage {
            run_id,
            settings,
            config_snapshot,
            forecast,
        })
    }

    /// 仅执行预测阶段
    pub async fn forecast_only(
        &self,
        transactions: &[TransactionRecord],
    ) -> ApiResult<ForecastRunReport> {
        Ok(self.forecast_stage(transactions).await?.forecast)
    }

    /// 调拨阶段: 缺口分析 → 调拨规划 → 预警
    ///
    /// # 错误
    /// - 预测与库存无交集: NoGapRecords（预测表仍由调用方持有）
    #[instrument(skip(self, stage, inventory), fields(run_id = %stage.run_id, inventory_rows = inventory.len()))]
    pub fn rebalance(
        &self,
        stage: ForecastStage,
        inventory: &[InventorySnapshot],
    ) -> ApiResult<RebalanceReport> {
        let ForecastStage {
            run_id,
            settings,
            config_snapshot,
            forecast,
        } = stage;

        // 1. 缺口
        let gaps = GapAnalyzer::new(settings.gap_settings()).analyze(&forecast.points, inventory)?;
        if gaps.excluded_count() > 0 {
            warn!(
                missing_inventory = gaps.missing_inventory.len(),
                missing_forecast = gaps.missing_forecast.len(),
                "部分组合未参与缺口计算"
            );
        }

        // 2. 调拨
        let plan = TransferPlanner::new(settings.transfer_settings()).plan(&gaps.records);

        // 3. 预警
        let alerts = low_stock_alerts(&gaps.records);
        let status = transfer_status(&alerts, &plan);

        info!(
            run_id = %run_id,
            forecasted = forecast.forecasted_pairs.len(),
            gap_records = gaps.records.len(),
            shortages = alerts.len(),
            transfers = plan.suggestions.len(),
            unmet = plan.unmet.len(),
            "调拨决策运行完成"
        );

        Ok(RebalanceReport {
            run_id,
            generated_at: Utc::now(),
            settings,
            config_snapshot,
            forecast,
            gaps,
            plan,
            alerts,
            status,
        })
    }

    /// 执行完整流程
    ///
    /// # 返回
    /// - Ok(RebalanceReport): 预测表、缺口表、调拨方案、预警
    /// - Err: 全部组合预测失败 / 预测与库存无交集 / 配置非法
    pub async fn run(
        &self,
        transactions: &[TransactionRecord],
        inventory: &[InventorySnapshot],
    ) -> ApiResult<RebalanceReport> {
        let stage = self.forecast_stage(transactions).await?;
        self.rebalance(stage, inventory)
    }

    /// 从文件导入后执行完整流程
    pub async fn run_files<P, Q>(&self, orders_path: P, inventory_path: Q) -> ApiResult<RebalanceReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let transactions = import_transactions(orders_path)?;
        let inventory = import_inventory(inventory_path)?;
        self.run(&transactions, &inventory).await
    }
}
