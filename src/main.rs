// ==========================================
// 仓储作业核心 - 主入口
// ==========================================
// 职责: 初始化日志与数据库，输出当前库区/计划概况
// ==========================================

use warehouse_ops::app::{get_default_db_path, AppState};
use warehouse_ops::config::WarehouseConfigReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统（RUST_LOG 控制级别）
    warehouse_ops::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", warehouse_ops::APP_NAME);
    tracing::info!("系统版本: {}", warehouse_ops::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let locale = app_state
        .config_manager
        .get_default_locale()
        .await
        .map_err(|e| anyhow::anyhow!("读取语言配置失败: {}", e))?;
    let locale = warehouse_ops::i18n::set_locale(&locale);

    let max_total = app_state
        .config_manager
        .get_layout_max_total()
        .await
        .map_err(|e| anyhow::anyhow!("读取布局上限失败: {}", e))?;

    let zones = app_state.zone_api.list_zones()?;
    let plans = app_state.plan_api.list_plans()?;
    tracing::info!(
        locale = %locale,
        layout_max_total = max_total,
        zone_count = zones.len(),
        plan_count = plans.len(),
        "{}",
        warehouse_ops::i18n::t("common.success")
    );

    Ok(())
}
