// ==========================================
// 仓储作业核心 - 配置读取 Trait
// ==========================================
// 职责: 定义业务层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// WarehouseConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait WarehouseConfigReader: Send + Sync {
    /// 单次批量生成库位的上限
    ///
    /// # 默认值
    /// - 10000
    async fn get_layout_max_total(&self) -> ConfigResult<u64>;

    /// 布局预览展示的编码条数
    ///
    /// # 默认值
    /// - 5
    async fn get_layout_preview_limit(&self) -> ConfigResult<usize>;

    /// 界面默认语言
    ///
    /// # 默认值
    /// - zh-CN
    async fn get_default_locale(&self) -> ConfigResult<String>;
}
