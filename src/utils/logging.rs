//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use std::fs::{self, OpenOptions};
use std::io::Write;

use anyhow::Result;
use tracing::info;

use crate::config::Config;

/// 初始化日志文件（覆盖旧内容）
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `document`: 本次处理的文档名
pub fn init_log_file(log_file_path: &str, document: &str) -> Result<()> {
    let log_header = format!(
        "{}\n学习材料生成日志 - {}\n文档: {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        document,
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一段内容
pub fn append_to_log_file(log_file_path: &str, section: &str, content: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(file, "--- {} ---", section)?;
    writeln!(file, "{}\n", content)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 学习材料生成模式");
    info!("🎓 年级: {}", config.study_level.label());
    info!(
        "🤖 模型: 文本 {} / 测验 {} / 插图 {}",
        config.text_model_name, config.test_model_name, config.image_model_name
    );
    info!("📊 插图最大并发数: {}", config.max_concurrent_illustrations);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部生成完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("fotosynthese", 4), "foto...");
        assert_eq!(truncate_text("光合作用", 2), "光合...");
        assert_eq!(truncate_text("kort", 10), "kort");
    }

    #[test]
    fn test_log_file_header_and_append() {
        let path = std::env::temp_dir().join(format!("study_log_{}.log", std::process::id()));
        let path_str = path.to_string_lossy().to_string();

        init_log_file(&path_str, "biologie.txt").unwrap();
        append_to_log_file(&path_str, "Woordenlijst", "[]").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("学习材料生成日志"));
        assert!(content.contains("文档: biologie.txt"));
        assert!(content.contains("--- Woordenlijst ---"));
        let _ = fs::remove_file(&path);
    }
}
