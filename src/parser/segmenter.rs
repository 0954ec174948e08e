//! 按科目切分文本
//!
//! 每个科目以 `Code ... :` 行开始，到下一个科目标记为止。
//! 最后一个标记之后的文本是文档尾部，不作为科目。

use crate::models::transcript::NO_TEACHER;
use crate::parser::normalizer::strip_trailing_zeros;
use once_cell::sync::Lazy;
use regex::Regex;

static SUBJECT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"Code .+ .+ :").unwrap());

/// 名称 / 老师 / 平均分的分隔符
const FIELD_SEPARATOR: &str = " : ";
const TEACHER_LABEL: &str = "Responsable";
const AVERAGE_LABEL: &str = "Moyenne";
/// 第 3 行是表头，正文从第 4 行开始
const BODY_START: usize = 3;

/// 单个科目的文本片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectSegment<'a> {
    lines: Vec<&'a str>,
}

impl<'a> SubjectSegment<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
        }
    }

    /// 科目名称，PDF 字体把撇号解码成了 `?`
    pub fn name(&self) -> String {
        self.lines
            .first()
            .and_then(|line| line.rsplit(FIELD_SEPARATOR).next())
            .unwrap_or_default()
            .replace('?', "'")
    }

    /// 负责老师
    pub fn teacher(&self) -> String {
        match self.lines.get(1) {
            Some(line) if line.contains(TEACHER_LABEL) => line
                .rsplit(FIELD_SEPARATOR)
                .next()
                .unwrap_or_default()
                .to_string(),
            _ => NO_TEACHER.to_string(),
        }
    }

    /// 文档上给出的平均分，没有时返回 `None`
    pub fn stated_average(&self) -> Option<String> {
        let line = self.lines.get(1)?;
        if !line.contains(AVERAGE_LABEL) {
            return None;
        }
        let value = line.split(FIELD_SEPARATOR).nth(1)?.split(' ').next()?;
        let value = strip_trailing_zeros(value);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// 评语与成绩所在的行
    pub fn body(&self) -> &[&'a str] {
        self.lines.get(BODY_START..).unwrap_or_default()
    }
}

/// 按科目标记切分全文
pub fn split_subjects(text: &str) -> Vec<SubjectSegment<'_>> {
    let offsets: Vec<usize> = SUBJECT_MARKER.find_iter(text).map(|m| m.start()).collect();

    offsets
        .windows(2)
        .map(|pair| SubjectSegment::new(&text[pair[0]..pair[1]]))
        .collect()
}
