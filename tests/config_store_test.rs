// ==========================================
// 配置存储集成测试
// ==========================================
// 测试目标: config_kv 覆写 → RebalanceApi 运行参数
// ==========================================


use demand_rebalancer::api::{ApiError, RebalanceApi};
use demand_rebalancer::config::{config_keys, ConfigManager, RebalanceSettings};
use std::sync::Arc;
use test_helpers::*;

#[tokio::test]
async fn test_overrides_flow_into_run() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::new(dir.path().join("config.db")).unwrap();
    manager.set_config_value(config_keys::HORIZON_DAYS, "10").unwrap();
    manager.set_config_value(config_keys::MIN_SURPLUS_THRESHOLD, "0").unwrap();

    let api = RebalanceApi::new(Arc::new(manager));

    let mut tx = constant_history("X", "A", 21, 5.0);
    tx.extend(constant_history("X", "B", 21, 1.0));
    // A: 需求 35，库存 30 → 缺 5；B: 需求 7，库存 12 → 富余 5（阈值 0 时可调出）
    let inventory = vec![snapshot("X", "A", 30.0), snapshot("X", "B", 12.0)];

    let report = api.run(&tx, &inventory).await.unwrap();
    assert_eq!(report.settings.horizon_days, 10);
    assert_eq!(report.forecast.points.len(), 2 * (21 + 10));
    assert_eq!(report.plan.suggestions.len(), 1);
    assert_eq!(report.plan.suggestions[0].quantity, 5);
}

#[tokio::test]
async fn test_invalid_override_is_reported() {
    let manager = ConfigManager::in_memory().unwrap();
    manager.set_config_value(config_keys::INTERVAL_WIDTH, "1.5").unwrap();

    let api = RebalanceApi::new(Arc::new(manager));
    let err = api.resolve_settings().await.unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
    assert_eq!(err.code(), "CONFIG_ERROR");
}

#[tokio::test]
async fn test_snapshot_restores_settings() {
    let source = ConfigManager::in_memory().unwrap();
    source.set_config_value(config_keys::GAP_WINDOW_DAYS, "14").unwrap();
    source.set_config_value(config_keys::YEARLY_SEASONALITY, "1").unwrap();
    let snapshot = source.get_config_snapshot().unwrap();

    let target = ConfigManager::in_memory().unwrap();
    target.restore_config_from_snapshot(&snapshot).unwrap();

    let settings = RebalanceSettings::load(&target).await.unwrap();
    assert_eq!(settings.gap_window_days, 14);
    assert!(settings.seasonality.yearly);
}

#[tokio::test]
async fn test_report_records_override_snapshot() {
    let manager = ConfigManager::in_memory().unwrap();
    manager.set_config_value(config_keys::GAP_WINDOW_DAYS, "5").unwrap();

    let api = RebalanceApi::new(Arc::new(manager));
    let tx = constant_history("X", "A", 14, 2.0);
    let report = api.run(&tx, &[snapshot("X", "A", 50.0)]).await.unwrap();

    let recorded: std::collections::BTreeMap<String, String> =
        serde_json::from_str(&report.config_snapshot).unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded.get(config_keys::GAP_WINDOW_DAYS).map(String::as_str), Some("5"));

    // 快照可恢复出同一组参数
    let replay = ConfigManager::in_memory().unwrap();
    replay.restore_config_from_snapshot(&report.config_snapshot).unwrap();
    assert_eq!(RebalanceSettings::load(&replay).await.unwrap(), report.settings);
}
