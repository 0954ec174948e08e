use serde::Serialize;

/// 一条缺勤 / 迟到 / 排除记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbsenceRecord {
    pub date: String,
    pub hour: String,
    /// 课程类型（CM / TD / TP ...）
    #[serde(rename = "type")]
    pub kind: String,
    pub class: String,
    #[serde(rename = "prof")]
    pub teacher: String,
    pub justified: bool,
    pub reason: String,
}

/// 缺勤页面上的三张表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AbsenceReport {
    pub absences: Vec<AbsenceRecord>,
    #[serde(rename = "retards")]
    pub lates: Vec<AbsenceRecord>,
    pub exclusions: Vec<AbsenceRecord>,
}

impl AbsenceReport {
    /// 三张表的记录总数
    pub fn total(&self) -> usize {
        self.absences.len() + self.lates.len() + self.exclusions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_json_keys() {
        let record = AbsenceRecord {
            date: "12/03/2025".to_string(),
            hour: "08:00".to_string(),
            kind: "TD".to_string(),
            class: "R4.01 Architecture".to_string(),
            teacher: "M. LEROY".to_string(),
            justified: true,
            reason: "Maladie".to_string(),
        };
        let report = AbsenceReport {
            lates: vec![record],
            ..AbsenceReport::default()
        };

        assert_eq!(report.total(), 1);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "absences": [],
                "retards": [{
                    "date": "12/03/2025",
                    "hour": "08:00",
                    "type": "TD",
                    "class": "R4.01 Architecture",
                    "prof": "M. LEROY",
                    "justified": true,
                    "reason": "Maladie"
                }],
                "exclusions": []
            })
        );
    }
}
