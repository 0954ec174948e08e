//! 评语 / 成绩切分
//!
//! 逐行扫描科目正文，把行归为"评语开头"、"成绩"或"评语续行"，
//! 最后按出现顺序把评语与成绩一一配对。

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// 评语开头，例如 `Séance 3 - TP noté`
static COMMENT_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Séance.+-").unwrap());

/// 成绩行：`12.500 (coeff 2.0000)` / `(coeff 2.0000)` / `Résultats non publiés` / `ABI (coeff 1.0000)`
static GRADE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:(\d+\.\d+ )?\(coeff (\d+\.\d+)\))|(Résultats non publiés)|(?:ABI ?\(coeff (\d+\.\d+)\)))",
    )
    .unwrap()
});

/// 成绩行的原始匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGrade {
    /// 匹配到的完整文本
    pub text: String,
    /// 分数（含末尾空格，未清洗）
    pub value: Option<String>,
    /// 分数对应的系数
    pub coefficient: Option<String>,
    /// 是否为"成绩未公布"
    pub unpublished: bool,
    /// 缺考时的系数
    pub absence_coefficient: Option<String>,
}

impl RawGrade {
    /// 尝试把一行解析为成绩，行首不是成绩时返回 `None`
    pub fn parse(line: &str) -> Option<Self> {
        let caps = GRADE.captures(line)?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        Some(Self {
            text: caps.get(0)?.as_str().to_string(),
            value: group(1),
            coefficient: group(2),
            unpublished: caps.get(3).is_some(),
            absence_coefficient: group(4),
        })
    }
}

/// 评语累积状态
enum CommentState<'a> {
    Idle,
    Accumulating(Vec<&'a str>),
}

impl<'a> CommentState<'a> {
    /// 结束当前评语块，非空时放入已完成队列
    fn flush(&mut self, completed: &mut Vec<String>) {
        if let CommentState::Accumulating(lines) = std::mem::replace(self, CommentState::Idle) {
            if !lines.is_empty() {
                completed.push(lines.join(" "));
            }
        }
    }

    fn push(&mut self, line: &'a str) {
        match self {
            CommentState::Idle => *self = CommentState::Accumulating(vec![line]),
            CommentState::Accumulating(lines) => lines.push(line),
        }
    }
}

/// 切分科目正文，返回按顺序配对的 (评语, 成绩)
///
/// 配对是位置性的：第 i 个成绩对应第 i 个完整评语块，评语不足时为空字符串。
/// 多出来的评语块（包括末尾没有成绩的那一块）会被丢弃。
pub fn tokenize(body: &[&str]) -> Vec<(String, RawGrade)> {
    let mut state = CommentState::Idle;
    let mut comments: Vec<String> = Vec::new();
    let mut grades: Vec<RawGrade> = Vec::new();

    for line in body.iter().copied() {
        if COMMENT_START.is_match(line) {
            state.flush(&mut comments);
            state.push(line);
        } else if let Some(grade) = RawGrade::parse(line) {
            grades.push(grade);
            state.flush(&mut comments);
        } else {
            state.push(line);
        }
    }
    state.flush(&mut comments);

    if comments.len() > grades.len() {
        debug!(
            "丢弃 {} 条没有对应成绩的评语: {:?}",
            comments.len() - grades.len(),
            &comments[grades.len()..]
        );
    }

    let mut comments = comments.into_iter();
    grades
        .into_iter()
        .map(|grade| (comments.next().unwrap_or_default(), grade))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_grade_variants() {
        let scored = RawGrade::parse("14.250 (coeff 1.0000)").unwrap();
        assert_eq!(scored.value.as_deref(), Some("14.250 "));
        assert_eq!(scored.coefficient.as_deref(), Some("1.0000"));

        let unpublished = RawGrade::parse("Résultats non publiés").unwrap();
        assert!(unpublished.unpublished);

        let absent = RawGrade::parse("ABI (coeff 2.0000) justifiée").unwrap();
        assert_eq!(absent.text, "ABI (coeff 2.0000)");
        assert_eq!(absent.absence_coefficient.as_deref(), Some("2.0000"));

        assert!(RawGrade::parse("Note : (coeff 1.0000)").is_none());
    }

    #[test]
    fn test_comment_then_grade_pairs() {
        let body = [
            "Séance 1 - Contrôle",
            "continu",
            "12.000 (coeff 1.0000)",
            "Séance 2 - Examen -",
            "16.000 (coeff 2.0000)",
        ];
        let pairs = tokenize(&body);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "Séance 1 - Contrôle continu");
        assert_eq!(pairs[0].1.text, "12.000 (coeff 1.0000)");
        assert_eq!(pairs[1].0, "Séance 2 - Examen -");
    }

    #[test]
    fn test_grade_without_comment_gets_empty_comment() {
        let body = ["15.000 (coeff 1.0000)"];
        let pairs = tokenize(&body);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "");
    }

    #[test]
    fn test_trailing_comment_is_dropped() {
        // 末尾没有成绩的评语不会出现在结果中
        let body = [
            "Séance 1 - DS",
            "10.000 (coeff 1.0000)",
            "Séance 2 - Projet",
            "rendu en retard",
        ];
        let pairs = tokenize(&body);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "Séance 1 - DS");
    }

    #[test]
    fn test_pairing_is_positional() {
        // 两个评语块先后出现，成绩按位置与第一个配对
        let body = [
            "Séance 1 - TP",
            "Séance 2 - TD",
            "11.000 (coeff 1.0000)",
            "13.000 (coeff 1.0000)",
        ];
        let pairs = tokenize(&body);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "Séance 1 - TP");
        assert_eq!(pairs[1].0, "Séance 2 - TD");
    }
}
