//! 成绩单数据模型
//!
//! 序列化格式与前端约定保持一致：
//!
//! ```text
//! {
//!   "grades": [
//!     {"name": str, "teacher": str, "average": str,
//!      "grades": [[comment, grade_repr], ...], "empty": "empty" | ""}
//!   ],
//!   "admission": str, "average": str, "position": str
//! }
//! ```
//!
//! `grade_repr` 对有分数的成绩是 `[分数, 系数]`，其余情况是 `[原文]`。

use crate::parser::normalizer::strip_trailing_zeros;
use serde::ser::{SerializeSeq, SerializeTuple};
use serde::{Serialize, Serializer};

/// 没有负责老师时的占位文本
pub const NO_TEACHER: &str = "no teacher";
/// 无法得到平均分时的占位文本
pub const NO_AVERAGE: &str = "no average available";
/// 计算得到的平均分后缀
pub const CALCULATED_SUFFIX: &str = " (calculated)";
/// "成绩未公布"在输出中按系数 1 呈现
pub const UNPUBLISHED_REPR: &str = "(coeff 1.0000)";
/// 成绩单不可用时占位科目的名称
pub const UNAVAILABLE_SUBJECT: &str = "Transcript unavailable";

/// 单个成绩
#[derive(Debug, Clone, PartialEq)]
pub enum GradeToken {
    /// 已公布的分数及其系数
    Scored { value: f64, coefficient: f64 },
    /// 缺考（ABI），保留原文
    Absent { raw_text: String },
    /// 成绩未公布
    Unpublished,
    /// 无法归类的匹配，原样透传
    Other { raw_text: String },
}

impl GradeToken {
    /// 输出用的文本形式
    pub fn repr(&self) -> Vec<String> {
        match self {
            GradeToken::Scored { value, coefficient } => vec![
                strip_trailing_zeros(&value.to_string()),
                strip_trailing_zeros(&coefficient.to_string()),
            ],
            GradeToken::Absent { raw_text } | GradeToken::Other { raw_text } => {
                vec![raw_text.clone()]
            }
            GradeToken::Unpublished => vec![UNPUBLISHED_REPR.to_string()],
        }
    }

    pub fn is_unpublished(&self) -> bool {
        matches!(self, GradeToken::Unpublished)
    }
}

impl Serialize for GradeToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = self.repr();
        let mut seq = serializer.serialize_seq(Some(repr.len()))?;
        for part in &repr {
            seq.serialize_element(part)?;
        }
        seq.end()
    }
}

/// 评语与成绩的配对（按出现顺序）
#[derive(Debug, Clone, PartialEq)]
pub struct CommentGradePair {
    pub comment: String,
    pub grade: GradeToken,
}

impl Serialize for CommentGradePair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.comment)?;
        tuple.serialize_element(&self.grade)?;
        tuple.end()
    }
}

/// 单个科目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    pub name: String,
    pub teacher: String,
    /// 文档给出的平均分、带 "(calculated)" 后缀的计算值，或 [`NO_AVERAGE`]
    pub average: String,
    pub grades: Vec<CommentGradePair>,
    /// 所有成绩均未公布
    #[serde(serialize_with = "serialize_empty_flag")]
    pub empty: bool,
}

fn serialize_empty_flag<S: Serializer>(empty: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *empty { "empty" } else { "" })
}

/// 成绩单页首信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    /// 评审决定
    pub admission: String,
    /// 总平均分
    pub average: String,
    /// 排名
    pub position: String,
}

/// 解析后的成绩单
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTranscript {
    pub grades: Vec<Subject>,
    pub admission: String,
    pub average: String,
    pub position: String,
}

impl ParsedTranscript {
    /// 组合页首信息与科目列表
    pub fn assemble(header: HeaderFields, subjects: Vec<Subject>) -> Self {
        Self {
            grades: subjects,
            admission: header.admission,
            average: header.average,
            position: header.position,
        }
    }

    /// 成绩单不可用时返回的占位结果
    pub fn unavailable() -> Self {
        Self {
            grades: vec![Subject {
                name: UNAVAILABLE_SUBJECT.to_string(),
                teacher: NO_TEACHER.to_string(),
                average: NO_AVERAGE.to_string(),
                grades: Vec::new(),
                empty: true,
            }],
            admission: String::new(),
            average: String::new(),
            position: String::new(),
        }
    }

    /// 是否为占位结果
    pub fn is_unavailable(&self) -> bool {
        matches!(self.grades.as_slice(), [only] if only.name == UNAVAILABLE_SUBJECT && only.grades.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grade_repr_shapes() {
        let scored = GradeToken::Scored {
            value: 12.5,
            coefficient: 2.0,
        };
        assert_eq!(serde_json::to_value(&scored).unwrap(), json!(["12.5", "2"]));

        let absent = GradeToken::Absent {
            raw_text: "ABI (coeff 1.0000)".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&absent).unwrap(),
            json!(["ABI (coeff 1.0000)"])
        );

        assert_eq!(
            serde_json::to_value(&GradeToken::Unpublished).unwrap(),
            json!(["(coeff 1.0000)"])
        );
    }

    #[test]
    fn test_subject_json_shape() {
        let subject = Subject {
            name: "Anglais".to_string(),
            teacher: "M. SMITH".to_string(),
            average: "14".to_string(),
            grades: vec![CommentGradePair {
                comment: "Séance 1 - Oral".to_string(),
                grade: GradeToken::Scored {
                    value: 14.0,
                    coefficient: 1.0,
                },
            }],
            empty: false,
        };

        assert_eq!(
            serde_json::to_value(&subject).unwrap(),
            json!({
                "name": "Anglais",
                "teacher": "M. SMITH",
                "average": "14",
                "grades": [["Séance 1 - Oral", ["14", "1"]]],
                "empty": ""
            })
        );
    }

    #[test]
    fn test_unavailable_placeholder() {
        let placeholder = ParsedTranscript::unavailable();
        assert!(placeholder.is_unavailable());
        let value = serde_json::to_value(&placeholder).unwrap();
        assert_eq!(value["grades"][0]["empty"], "empty");
        assert_eq!(value["position"], "");
    }
}
