//! 成绩单页首信息：评审决定、总平均分、排名

use crate::models::transcript::HeaderFields;

/// 页首到此标记为止
const PREAMBLE_END: &str = "Nombre d'absences";
const ADMISSION_LABEL: &str = "Décision";
const AVERAGE_LABEL: &str = "Moyenne";
const POSITION_LABEL: &str = "Classement";

/// 扫描页首，提取三个字段
///
/// 每行只匹配一个标签，缺失的字段为空字符串。
///
/// 同一字段出现多次时保留第一次的值，后面的行不会覆盖它：
/// 页首第一行 `Moyenne ...` 是总平均分，之后同名的行都是局部数据。
pub fn extract_header(text: &str) -> HeaderFields {
    let preamble = text.split(PREAMBLE_END).next().unwrap_or_default();
    let mut header = HeaderFields::default();

    for line in preamble.lines() {
        let slot = if line.starts_with(ADMISSION_LABEL) {
            &mut header.admission
        } else if line.starts_with(AVERAGE_LABEL) {
            &mut header.average
        } else if line.starts_with(POSITION_LABEL) {
            &mut header.position
        } else {
            continue;
        };

        if slot.is_empty() {
            *slot = trailing_value(line);
        }
    }

    header
}

/// 最后一个冒号之后的内容
fn trailing_value(line: &str) -> String {
    line.rsplit(':').next().unwrap_or_default().trim().to_string()
}
