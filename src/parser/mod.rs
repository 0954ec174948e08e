//! 成绩单 PDF 解析
//!
//! ```text
//! text_extractor (PDF → 文本)
//!     ↓
//! segmenter (文本 → 科目片段) ─── header (页首字段)
//!     ↓
//! tokenizer (片段正文 → 评语/成绩对)
//!     ↓
//! normalizer (成绩归类 + 平均分)
//!     ↓
//! ParsedTranscript
//! ```
//!
//! 所有函数都是无状态的纯函数，可以在多个任务中并发调用。

pub mod header;
pub mod normalizer;
pub mod segmenter;
pub mod text_extractor;
pub mod tokenizer;

use crate::error::AppResult;
use crate::models::transcript::{CommentGradePair, GradeToken, ParsedTranscript, Subject};
use segmenter::SubjectSegment;
use tracing::debug;

pub use header::extract_header;
pub use segmenter::split_subjects;
pub use text_extractor::{clean_pages, extract_text};

/// 解析成绩单 PDF
///
/// # 返回
/// PDF 无法解析或没有页面时返回 `DocumentError`
pub fn parse_transcript(pdf: &[u8]) -> AppResult<ParsedTranscript> {
    let text = extract_text(pdf)?;
    Ok(parse_text(&text))
}

/// 解析已经提取出来的文本
pub fn parse_text(text: &str) -> ParsedTranscript {
    let header = extract_header(text);
    let subjects: Vec<Subject> = split_subjects(text).iter().map(build_subject).collect();
    debug!("解析出 {} 个科目", subjects.len());
    ParsedTranscript::assemble(header, subjects)
}

/// 解析单个科目片段
pub fn build_subject(segment: &SubjectSegment<'_>) -> Subject {
    let grades: Vec<CommentGradePair> = tokenizer::tokenize(segment.body())
        .into_iter()
        .map(|(comment, raw)| CommentGradePair {
            comment,
            grade: normalizer::classify(&raw),
        })
        .collect();

    let tokens: Vec<GradeToken> = grades.iter().map(|pair| pair.grade.clone()).collect();
    let average = segment
        .stated_average()
        .unwrap_or_else(|| normalizer::compute_average(&tokens));

    Subject {
        name: segment.name(),
        teacher: segment.teacher(),
        average,
        empty: normalizer::all_unpublished(&tokens),
        grades,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transcript::NO_AVERAGE;

    #[test]
    fn test_unpublished_only_subject() {
        let segment = SubjectSegment::new(
            "Code UE 3.2 Maths : Analyse\nResponsable : Mme MARTIN\nEvaluation Note\nSéance 1 - Partiel\nRésultats non publiés",
        );
        let subject = build_subject(&segment);
        assert!(subject.empty);
        assert_eq!(subject.average, NO_AVERAGE);
        assert_eq!(subject.teacher, "Mme MARTIN");
        assert_eq!(subject.grades.len(), 1);
        assert_eq!(subject.grades[0].grade, GradeToken::Unpublished);
    }

    #[test]
    fn test_computed_average_when_not_stated() {
        let segment = SubjectSegment::new(
            "Code UE 3.3 Maths : Algèbre\nResponsable : M. DURAND\nEvaluation Note\n12.000 (coeff 1.0000)\n16.000 (coeff 2.0000)",
        );
        let subject = build_subject(&segment);
        assert_eq!(subject.average, "14.667 (calculated)");
        assert!(!subject.empty);
    }
}
