// ==========================================
// 导入 / 导出集成测试
// ==========================================
// 测试目标: CSV 文件 → 领域记录 → CSV 文件
// ==========================================


use demand_rebalancer::domain::TransferSuggestion;
use demand_rebalancer::export::{CsvExporter, FILTERED_TRANSFER_PLAN_FILE};
use demand_rebalancer::importer::{import_inventory, import_transactions, ImportError};
use test_helpers::*;

#[test]
fn test_import_orders_mixed_date_formats() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "orders.csv",
        &[
            "date,sku_id,warehouse_id,quantity_sold".to_string(),
            "2024-01-01,X,A,3".to_string(),
            "2024/01/02,X,A,4".to_string(),
            "20240103,X,A,5".to_string(),
            "2024-01-04 13:45:00,X,A,6".to_string(),
        ],
    );

    let records = import_transactions(&path).unwrap();
    let days: Vec<_> = records.iter().map(|r| r.date).collect();
    assert_eq!(days, vec![day(0), day(1), day(2), day(3)]);
    assert_eq!(records.iter().map(|r| r.quantity).sum::<f64>(), 18.0);
}

#[test]
fn test_import_reports_failing_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "orders.csv",
        &[
            "date,sku_id,warehouse_id,quantity_sold".to_string(),
            "2024-01-01,X,A,3".to_string(),
            "not-a-date,X,A,4".to_string(),
        ],
    );

    let err = import_transactions(&path).unwrap_err();
    assert!(matches!(err, ImportError::DateFormatError { row: 3, .. }));
}

#[test]
fn test_import_missing_file() {
    let err = import_inventory("does/not/exist.csv").unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}

#[test]
fn test_import_inventory_keeps_duplicates_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "inventory.csv",
        &[
            "sku_id,warehouse_id,current_inventory".to_string(),
            "X,A,10".to_string(),
            "X,A,99".to_string(),
        ],
    );

    let snapshots = import_inventory(&path).unwrap();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].current_inventory, 10.0);
}

#[test]
fn test_filtered_transfer_plan_file() {
    let dir = tempfile::tempdir().unwrap();
    let plan = vec![
        TransferSuggestion {
            item_id: "X".to_string(),
            from_location: "B".to_string(),
            to_location: "A".to_string(),
            quantity: 15,
        },
        TransferSuggestion {
            item_id: "Y".to_string(),
            from_location: "C".to_string(),
            to_location: "A".to_string(),
            quantity: 12,
        },
    ];

    let path = dir.path().join(FILTERED_TRANSFER_PLAN_FILE);
    CsvExporter
        .export_transfer_plan_file(&path, &plan, Some("Y"))
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "sku_id,from_warehouse,to_warehouse,quantity\nY,C,A,12\n");
}
