// ==========================================
// 需求预测与自动调拨系统 - 预测编排器
// ==========================================
// 用途: 枚举全部 (商品, 仓库) 组合，逐组合执行
//       序列构建 → 模型预测，汇总为统一预测表
// 策略:
// - 单组合失败: 跳过并记录类型化原因（不中断整体运行）
// - 全部失败: 返回 NoForecastsProduced
// 并发: 每个组合在阻塞线程池中独立执行，受并行度与超时约束
// ==========================================

use crate::domain::forecast::ForecastPoint;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::PairKey;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::forecast_model::DemandForecaster;
use crate::engine::series_builder::SeriesBuilder;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

// ==========================================
// OrchestratorSettings - 编排参数
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub horizon_days: usize,     // 预测期: 默认 30 天
    pub fit_timeout: Duration,   // 单组合拟合超时: 默认 30 秒
    pub max_parallelism: usize,  // 并行度: 0 表示按 CPU 数
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            fit_timeout: Duration::from_secs(30),
            max_parallelism: 0,
        }
    }
}

impl OrchestratorSettings {
    fn effective_parallelism(&self) -> usize {
        if self.max_parallelism > 0 {
            self.max_parallelism
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

// ==========================================
// PairOutcome - 单组合结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    Forecasted {
        pair: PairKey,
        points: Vec<ForecastPoint>,
    },
    Skipped {
        pair: PairKey,
        reason: EngineError,
    },
}

impl PairOutcome {
    fn from_result(pair: PairKey, result: EngineResult<Vec<ForecastPoint>>) -> Self {
        match result {
            Ok(points) => PairOutcome::Forecasted { pair, points },
            Err(reason) => PairOutcome::Skipped { pair, reason },
        }
    }

    pub fn pair(&self) -> &PairKey {
        match self {
            PairOutcome::Forecasted { pair, .. } | PairOutcome::Skipped { pair, .. } => pair,
        }
    }
}

/// 被跳过的组合
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPair {
    pub pair: PairKey,
    pub reason: EngineError,
}

// ==========================================
// ForecastRunReport - 预测运行报告
// ==========================================
#[derive(Debug, Clone)]
pub struct ForecastRunReport {
    /// 统一预测表（按 (item_id, location_id) 排序，组内按日期排序）
    pub points: Vec<ForecastPoint>,
    pub forecasted_pairs: Vec<PairKey>,
    pub skipped: Vec<SkippedPair>,
    pub model_name: String,
    pub elapsed_ms: i64,
}

impl ForecastRunReport {
    pub fn attempted(&self) -> usize {
        self.forecasted_pairs.len() + self.skipped.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// 按原因代码统计跳过数
    pub fn skip_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for s in &self.skipped {
            *counts.entry(s.reason.reason_code()).or_insert(0) += 1;
        }
        counts
    }
}

// ==========================================
// ForecastOrchestrator - 预测编排器
// ==========================================
pub struct ForecastOrchestrator {
    builder: SeriesBuilder,
    model: Arc<dyn DemandForecaster>,
    settings: OrchestratorSettings,
}

impl ForecastOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - builder: 需求序列构建器
    /// - model: 预测模型
    /// - settings: 预测期 / 超时 / 并行度
    pub fn new(
        builder: SeriesBuilder,
        model: Arc<dyn DemandForecaster>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            builder,
            model,
            settings,
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// 按组合分组（组合按 (item_id, location_id) 排序）
    pub fn group_by_pair(records: &[TransactionRecord]) -> BTreeMap<PairKey, Vec<TransactionRecord>> {
        let mut grouped: BTreeMap<PairKey, Vec<TransactionRecord>> = BTreeMap::new();
        for rec in records {
            grouped.entry(rec.pair_key()).or_default().push(rec.clone());
        }
        grouped
    }

    /// 去重并排序全部组合
    pub fn distinct_pairs(records: &[TransactionRecord]) -> Vec<PairKey> {
        Self::group_by_pair(records).into_keys().collect()
    }

    /// 同步处理单个组合（不含超时控制）
    pub fn forecast_pair(&self, pair: &PairKey, records: &[TransactionRecord]) -> PairOutcome {
        let result = forecast_one(
            &self.builder,
            self.model.as_ref(),
            pair,
            records,
            self.settings.horizon_days,
        );
        PairOutcome::from_result(pair.clone(), result)
    }

    /// 执行全部组合的预测
    ///
    /// # 返回
    /// - Ok: 至少一个组合成功
    /// - Err(NoForecastsProduced): 全部组合失败（含输入为空）
    /// - Err(InvalidParameter): 预测期为 0
    #[instrument(skip(self, records), fields(records = records.len(), model = self.model.name()))]
    pub async fn run(&self, records: &[TransactionRecord]) -> EngineResult<ForecastRunReport> {
        if self.settings.horizon_days == 0 {
            return Err(EngineError::InvalidParameter("预测期必须为正整数".to_string()));
        }

        let started = Instant::now();

        let grouped = Self::group_by_pair(records);

        let parallelism = self.settings.effective_parallelism();
        info!(
            pairs = grouped.len(),
            horizon_days = self.settings.horizon_days,
            parallelism,
            "开始执行预测"
        );

        let timeout = self.settings.fit_timeout;
        let timeout_ms = timeout.as_millis() as u64;
        let horizon = self.settings.horizon_days;
        // 许可随阻塞线程释放: 超时后线程仍在运行时不放行新的拟合
        let fit_slots = Arc::new(Semaphore::new(parallelism));

        let tasks = grouped.into_iter().map(|(pair, pair_records)| {
            let builder = self.builder.clone();
            let model = Arc::clone(&self.model);
            let fit_slots = Arc::clone(&fit_slots);
            async move {
                let permit = match fit_slots.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        let reason = EngineError::ModelFit(format!("并行许可获取失败: {}", e));
                        return PairOutcome::from_result(pair, Err(reason));
                    }
                };
                let task_pair = pair.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    forecast_one(&builder, model.as_ref(), &task_pair, &pair_records, horizon)
                });
                let result = match tokio::time::timeout(timeout, handle).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(join_err)) => Err(EngineError::ModelFit(format!(
                        "拟合任务异常终止: {}",
                        join_err
                    ))),
                    Err(_) => Err(EngineError::FitTimeout { timeout_ms }),
                };
                PairOutcome::from_result(pair, result)
            }
        });

        let mut outcomes: Vec<PairOutcome> = stream::iter(tasks)
            .buffer_unordered(parallelism)
            .collect()
            .await;
        outcomes.sort_by(|a, b| a.pair().cmp(b.pair()));

        let report = self.assemble(outcomes, started);
        if report.forecasted_pairs.is_empty() {
            warn!(attempted = report.attempted(), "所有组合均未能生成预测");
            return Err(EngineError::NoForecastsProduced {
                attempted: report.attempted(),
                skipped: report.skipped_count(),
            });
        }

        info!(
            forecasted = report.forecasted_pairs.len(),
            skipped = report.skipped_count(),
            rows = report.points.len(),
            elapsed_ms = report.elapsed_ms,
            "预测执行完成"
        );
        Ok(report)
    }

    fn assemble(&self, outcomes: Vec<PairOutcome>, started: Instant) -> ForecastRunReport {
        let mut points = Vec::new();
        let mut forecasted_pairs = Vec::new();
        let mut skipped = Vec::new();

        for outcome in outcomes {
            match outcome {
                PairOutcome::Forecasted {
                    pair,
                    points: pair_points,
                } => {
                    debug!(pair = %pair, rows = pair_points.len(), "组合预测成功");
                    points.extend(pair_points);
                    forecasted_pairs.push(pair);
                }
                PairOutcome::Skipped { pair, reason } => {
                    warn!(pair = %pair, reason = reason.reason_code(), detail = %reason, "组合预测跳过");
                    skipped.push(SkippedPair { pair, reason });
                }
            }
        }

        ForecastRunReport {
            points,
            forecasted_pairs,
            skipped,
            model_name: self.model.name().to_string(),
            elapsed_ms: started.elapsed().as_millis() as i64,
        }
    }
}

fn forecast_one(
    builder: &SeriesBuilder,
    model: &dyn DemandForecaster,
    pair: &PairKey,
    records: &[TransactionRecord],
    horizon: usize,
) -> EngineResult<Vec<ForecastPoint>> {
    let series = builder.build(pair, records)?;
    model.fit_predict(&series, horizon)
}
