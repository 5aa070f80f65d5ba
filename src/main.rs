// ==========================================
// 需求预测与自动调拨系统 - 命令行入口
// ==========================================
// 用法:
//   demand-rebalancer <orders.csv|xlsx> [inventory.csv|xlsx] [out_dir]
//       [--sku SKU] [--config-db PATH] [--json-log] [--lang en|zh-CN]
//
// 无库存表时仅输出 full_forecast.csv
// ==========================================

use anyhow::{bail, Context, Result};
use demand_rebalancer::api::RebalanceApi;
use demand_rebalancer::config::ConfigManager;
use demand_rebalancer::db::default_config_db_path;
use demand_rebalancer::engine::alerts::{status_message, transfers_by_item};
use demand_rebalancer::export::{
    CsvExporter, FILTERED_TRANSFER_PLAN_FILE, FULL_FORECAST_FILE, TRANSFER_PLAN_FILE,
};
use demand_rebalancer::i18n::{set_locale, t, t_with_args};
use demand_rebalancer::importer::{import_inventory, import_transactions};
use demand_rebalancer::{logging, VERSION};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Default)]
struct CliArgs {
    orders: PathBuf,
    inventory: Option<PathBuf>,
    out_dir: PathBuf,
    sku: Option<String>,
    config_db: Option<PathBuf>,
    json_log: bool,
    lang: Option<String>,
}

fn parse_args() -> Result<CliArgs> {
    let mut positional = Vec::new();
    let mut cli = CliArgs::default();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sku" => cli.sku = Some(args.next().context("--sku 需要参数")?),
            "--config-db" => {
                cli.config_db = Some(PathBuf::from(args.next().context("--config-db 需要参数")?))
            }
            "--lang" => cli.lang = Some(args.next().context("--lang 需要参数")?),
            "--json-log" => cli.json_log = true,
            flag if flag.starts_with("--") => bail!("未知参数: {}", flag),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    cli.orders = positional
        .next()
        .context("用法: demand-rebalancer <orders> [inventory] [out_dir] [--sku SKU] [--config-db PATH] [--json-log] [--lang en|zh-CN]")?;
    cli.inventory = positional.next();
    cli.out_dir = positional.next().unwrap_or_else(|| PathBuf::from("."));
    if let Some(extra) = positional.next() {
        bail!("多余的参数: {}", extra.display());
    }
    Ok(cli)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args()?;

    if cli.json_log {
        logging::init_json();
    } else {
        logging::init();
    }

    if let Some(lang) = &cli.lang {
        if !set_locale(lang) {
            bail!("不支持的语言: {}", lang);
        }
    }

    tracing::info!("==================================================");
    tracing::info!("{}", t("app.banner"));
    tracing::info!("系统版本: {}", VERSION);
    tracing::info!("==================================================");

    let config_db = cli.config_db.clone().unwrap_or_else(default_config_db_path);
    tracing::info!("使用配置库: {}", config_db.display());
    let config = ConfigManager::new(&config_db)
        .with_context(|| format!("无法打开配置库: {}", config_db.display()))?;
    let api = RebalanceApi::new(Arc::new(config));
    let exporter = CsvExporter;

    if !cli.orders.exists() {
        bail!(t_with_args("import.file_not_found", &[("path", &cli.orders.display().to_string())]));
    }
    let transactions = import_transactions(&cli.orders)?;
    println!("{}", t_with_args("import.loaded_orders", &[("rows", &transactions.len().to_string())]));

    let Some(inventory_path) = &cli.inventory else {
        // 仅预测
        let forecast = api.forecast_only(&transactions).await?;
        print_forecast_summary(forecast.forecasted_pairs.len(), forecast.skipped_count());
        let path = cli.out_dir.join(FULL_FORECAST_FILE);
        exporter.export_forecast_file(&path, &forecast.points)?;
        println!("{}", t_with_args("forecast.exported", &[("path", &path.display().to_string())]));
        return Ok(());
    };

    let inventory = import_inventory(inventory_path)?;
    println!("{}", t_with_args("import.loaded_inventory", &[("rows", &inventory.len().to_string())]));

    // 预测表先落盘，缺口阶段失败时仍保留
    let stage = api.forecast_stage(&transactions).await?;
    print_forecast_summary(stage.forecast.forecasted_pairs.len(), stage.forecast.skipped_count());
    for skipped in &stage.forecast.skipped {
        println!(
            "  {}",
            t_with_args(
                "forecast.skipped_pair",
                &[("pair", &skipped.pair.to_string()), ("reason", &skipped.reason.to_string())]
            )
        );
    }

    let forecast_path = cli.out_dir.join(FULL_FORECAST_FILE);
    exporter.export_forecast_file(&forecast_path, &stage.forecast.points)?;
    println!("{}", t_with_args("forecast.exported", &[("path", &forecast_path.display().to_string())]));

    let report = api.rebalance(stage, &inventory)?;

    // 低库存预警
    println!();
    println!("{}", t("alert.header"));
    if report.alerts.is_empty() {
        println!("  {}", t("alert.none"));
    }
    for alert in &report.alerts {
        println!("  {}", alert.message());
    }

    // 调拨表
    println!();
    println!("{}", t("transfer.header"));
    println!("  {}", status_message(report.status, &report.plan));
    for s in &report.plan.suggestions {
        println!(
            "  {}",
            t_with_args(
                "transfer.suggestion",
                &[
                    ("sku", &s.item_id),
                    ("from", &s.from_location),
                    ("to", &s.to_location),
                    ("quantity", &s.quantity.to_string()),
                ]
            )
        );
    }
    for total in transfers_by_item(&report.plan.suggestions) {
        println!(
            "  {}",
            t_with_args("transfer.by_item", &[("sku", &total.item_id), ("quantity", &total.quantity.to_string())])
        );
    }
    for unmet in &report.plan.unmet {
        println!(
            "  {}",
            t_with_args(
                "transfer.unmet",
                &[
                    ("sku", &unmet.item_id),
                    ("warehouse", &unmet.location_id),
                    ("unmet", &unmet.unmet_need.to_string()),
                ]
            )
        );
    }

    let plan_path = cli.out_dir.join(TRANSFER_PLAN_FILE);
    exporter.export_transfer_plan_file(&plan_path, &report.plan.suggestions, None)?;
    println!("{}", t_with_args("transfer.exported", &[("path", &plan_path.display().to_string())]));

    if let Some(sku) = cli.sku.as_deref() {
        let filtered_path = cli.out_dir.join(FILTERED_TRANSFER_PLAN_FILE);
        exporter.export_transfer_plan_file(&filtered_path, &report.plan.suggestions, Some(sku))?;
        println!("{}", t_with_args("transfer.exported", &[("path", &filtered_path.display().to_string())]));
    }

    tracing::info!(run_id = %report.run_id, "{}", t("common.success"));
    Ok(())
}

fn print_forecast_summary(forecasted: usize, skipped: usize) {
    println!(
        "{}",
        t_with_args(
            "forecast.generated",
            &[("forecasted", &forecasted.to_string()), ("skipped", &skipped.to_string())]
        )
    );
}
