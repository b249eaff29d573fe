// ==========================================
// 仓储作业核心 - 国际化
// ==========================================
// 文案: locales/zh-CN.yml（默认）、locales/en.yml
// 用途: 计划操作按钮、计划/箱状态的界面文案
// ==========================================

/// 支持的界面语言，首项为默认
pub const SUPPORTED_LOCALES: [&str; 2] = ["zh-CN", "en"];

/// 切换界面语言，不支持的语言回退到 zh-CN
///
/// 返回实际生效的语言
pub fn set_locale(locale: &str) -> &'static str {
    let applied = SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| l.eq_ignore_ascii_case(locale.trim()))
        .unwrap_or(SUPPORTED_LOCALES[0]);
    rust_i18n::set_locale(applied);
    applied
}

pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 枚举值文案: `{group}.{db 值小写}`，如 plan_status.in_progress
pub fn enum_label(group: &str, db_value: &str) -> String {
    t(&format!("{}.{}", group, db_value.to_lowercase()))
}
