//! 成绩归类与平均分计算

use crate::models::transcript::{GradeToken, CALCULATED_SUFFIX, NO_AVERAGE};
use crate::parser::tokenizer::RawGrade;

/// 去掉小数末尾无意义的 0 和小数点
///
/// 只处理包含小数点的文本：`"12.500"` → `"12.5"`，`"15.000"` → `"15"`，
/// `"10"` 保持不变。
pub fn strip_trailing_zeros(text: &str) -> String {
    let text = text.trim();
    if !text.contains('.') {
        return text.to_string();
    }
    let stripped = text.trim_end_matches('0').trim_end_matches('.');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// 把原始匹配归类为 [`GradeToken`]
pub fn classify(raw: &RawGrade) -> GradeToken {
    if raw.absence_coefficient.is_some() {
        return GradeToken::Absent {
            raw_text: raw.text.clone(),
        };
    }

    if let (Some(value), Some(coefficient)) = (raw.value.as_deref(), raw.coefficient.as_deref()) {
        if let (Ok(value), Ok(coefficient)) = (value.trim().parse::<f64>(), coefficient.parse::<f64>()) {
            return GradeToken::Scored { value, coefficient };
        }
    }

    if raw.unpublished {
        return GradeToken::Unpublished;
    }

    GradeToken::Other {
        raw_text: raw.text.clone(),
    }
}

/// 根据有分数的成绩计算加权平均分
///
/// 没有任何分数时返回 [`NO_AVERAGE`]；系数总和为 0 时按 1 处理。
pub fn compute_average(grades: &[GradeToken]) -> String {
    let scored: Vec<(f64, f64)> = grades
        .iter()
        .filter_map(|g| match g {
            GradeToken::Scored { value, coefficient } => Some((*value, *coefficient)),
            _ => None,
        })
        .collect();

    if scored.is_empty() {
        return NO_AVERAGE.to_string();
    }

    let total_coefficient: f64 = scored.iter().map(|(_, c)| c).sum();
    let divide_by = if total_coefficient == 0.0 {
        1.0
    } else {
        total_coefficient
    };
    let average = scored.iter().map(|(v, c)| v * c).sum::<f64>() / divide_by;

    format!(
        "{}{}",
        strip_trailing_zeros(&format!("{:.3}", average)),
        CALCULATED_SUFFIX
    )
}

/// 所有成绩都未公布（没有成绩时也成立）
pub fn all_unpublished(grades: &[GradeToken]) -> bool {
    grades.iter().all(GradeToken::is_unpublished)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawGrade {
        RawGrade::parse(text).expect("应当匹配成绩格式")
    }

    #[test]
    fn test_strip_trailing_zeros() {
        assert_eq!(strip_trailing_zeros("12.500"), "12.5");
        assert_eq!(strip_trailing_zeros("15.000"), "15");
        assert_eq!(strip_trailing_zeros("15.00"), "15");
        assert_eq!(strip_trailing_zeros("10"), "10");
        assert_eq!(strip_trailing_zeros("0.000"), "0");
    }

    #[test]
    fn test_strip_is_idempotent() {
        for text in ["12.500", "15.000", "0.050", "100", "7.", "3.14159"] {
            let once = strip_trailing_zeros(text);
            assert_eq!(strip_trailing_zeros(&once), once, "输入: {}", text);
        }
    }

    #[test]
    fn test_classify_scored() {
        assert_eq!(
            classify(&raw("12.500 (coeff 2.0000)")),
            GradeToken::Scored {
                value: 12.5,
                coefficient: 2.0
            }
        );
    }

    #[test]
    fn test_classify_absent_keeps_raw_text() {
        assert_eq!(
            classify(&raw("ABI (coeff 1.5000)")),
            GradeToken::Absent {
                raw_text: "ABI (coeff 1.5000)".to_string()
            }
        );
        assert_eq!(
            classify(&raw("ABI(coeff 3.0000)")),
            GradeToken::Absent {
                raw_text: "ABI(coeff 3.0000)".to_string()
            }
        );
    }

    #[test]
    fn test_classify_unpublished_and_other() {
        assert_eq!(classify(&raw("Résultats non publiés")), GradeToken::Unpublished);
        assert_eq!(
            classify(&raw("(coeff 2.0000)")),
            GradeToken::Other {
                raw_text: "(coeff 2.0000)".to_string()
            }
        );
    }

    #[test]
    fn test_compute_weighted_average() {
        let grades = vec![
            GradeToken::Scored {
                value: 12.0,
                coefficient: 1.0,
            },
            GradeToken::Scored {
                value: 16.0,
                coefficient: 2.0,
            },
            GradeToken::Unpublished,
        ];
        assert_eq!(compute_average(&grades), "14.667 (calculated)");
    }

    #[test]
    fn test_compute_average_zero_coefficients() {
        let grades = vec![
            GradeToken::Scored {
                value: 12.0,
                coefficient: 0.0,
            },
            GradeToken::Scored {
                value: 8.0,
                coefficient: 0.0,
            },
        ];
        assert_eq!(compute_average(&grades), "0 (calculated)");
    }

    #[test]
    fn test_compute_average_without_scores() {
        let grades = vec![
            GradeToken::Unpublished,
            GradeToken::Absent {
                raw_text: "ABI (coeff 1.0000)".to_string(),
            },
        ];
        assert_eq!(compute_average(&grades), NO_AVERAGE);
        assert!(!all_unpublished(&grades));
        assert!(all_unpublished(&[GradeToken::Unpublished]));
    }
}
