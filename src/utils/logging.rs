/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use crate::models::transcript::ParsedTranscript;
use tracing::{debug, info};

/// 记录程序启动信息
///
/// # 参数
/// - `command`: 本次执行的子命令
pub fn log_startup(command: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", command);
    info!(
        "🕒 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 记录成绩单解析结果
///
/// # 参数
/// - `label`: 成绩单来源（文件名或学期）
/// - `transcript`: 解析结果
pub fn log_transcript_summary(label: &str, transcript: &ParsedTranscript) {
    if transcript.is_unavailable() {
        info!("❌ [{}] 成绩单不可用", label);
        return;
    }

    let graded = transcript.grades.iter().filter(|s| !s.empty).count();
    info!(
        "📊 [{}] 科目 {} 个（已有成绩 {} 个）",
        label,
        transcript.grades.len(),
        graded
    );
    if !transcript.average.is_empty() {
        info!("📈 [{}] 总平均分: {}", label, transcript.average);
    }
    for subject in &transcript.grades {
        debug!(
            "  {} | {} | {}",
            truncate_text(&subject.name, 40),
            subject.teacher,
            subject.average
        );
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
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
    fn test_truncate_text() {
        assert_eq!(truncate_text("Mathématiques", 5), "Mathé...");
        assert_eq!(truncate_text("Anglais", 20), "Anglais");
    }
}
