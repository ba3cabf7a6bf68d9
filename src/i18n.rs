// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 冲突信息按配置中的 locale 显式翻译，不依赖全局 locale
// ==========================================

/// 按指定语言翻译消息（带参数）
///
/// 占位符格式: %{name}
///
/// # 示例
/// ```no_run
/// use school_timetable::i18n::t_in;
/// let msg = t_in("en", "suggestion.check_availability", &[("teacher", "Alice")]);
/// ```
pub fn t_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key, locale = locale).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
