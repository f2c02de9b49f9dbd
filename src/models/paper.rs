use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// PDF 的媒体类型，文件列表只接受这一种
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// 考试类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamType {
    Test,
    #[serde(rename = "Internal Assessment")]
    InternalAssessment,
    #[serde(rename = "Semester End")]
    SemesterEnd,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Test => "Test",
            ExamType::InternalAssessment => "Internal Assessment",
            ExamType::SemesterEnd => "Semester End",
        }
    }
}

impl Default for ExamType {
    fn default() -> Self {
        ExamType::Test
    }
}

impl std::fmt::Display for ExamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 题目难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Mixed,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Mixed => "Mixed",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Mixed
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 题型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "Multiple Choice", alias = "MultipleChoice")]
    MultipleChoice,
    #[serde(rename = "Long Answer", alias = "LongAnswer")]
    LongAnswer,
    #[serde(rename = "Short Answer", alias = "ShortAnswer")]
    ShortAnswer,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple Choice",
            QuestionType::LongAnswer => "Long Answer",
            QuestionType::ShortAnswer => "Short Answer",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 用户选中的源文档
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: String,
    pub media_type: String,
    pub content: Vec<u8>,
}

impl SourceFile {
    /// 从磁盘路径读取文件，媒体类型按扩展名推断
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let media_type = match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MEDIA_TYPE,
            _ => "application/octet-stream",
        };

        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Self {
            file_name,
            media_type: media_type.to_string(),
            content,
        })
    }

    /// 是否为 PDF 文件
    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }
}

/// 一次生成请求的完整载荷
///
/// 每次提交时重新构建，请求结束后即丢弃
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub api_key: String,
    pub college_name: String,
    pub title: String,
    pub exam_type: ExamType,
    pub total_marks: u32,
    pub question_difficulty: Difficulty,
    pub question_types: Vec<QuestionType>,
    pub files: Vec<SourceFile>,
}

impl SubmissionRequest {
    /// 实际发送的题型列表
    ///
    /// 未选择任何题型时固定发送 ["Mixed"]
    pub fn effective_question_types(&self) -> Vec<String> {
        if self.question_types.is_empty() {
            vec!["Mixed".to_string()]
        } else {
            self.question_types
                .iter()
                .map(|t| t.as_str().to_string())
                .collect()
        }
    }
}

/// 已审批试卷记录
///
/// 持久层中的一行，客户端只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovedPaper {
    pub id: i64,
    pub title: String,
    pub subject_name: String,
    pub course_code: String,
    pub exam_type: ExamType,
    pub total_marks: u32,
    pub question_difficulty: Difficulty,
    #[serde(deserialize_with = "deserialize_question_types")]
    pub question_types: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// base64 编码的 PDF 内容
    pub pdf_data: String,
}

impl ApprovedPaper {
    /// 把查询返回的动态行解码为记录
    ///
    /// 字段缺失或类型不符时返回解析错误，而不是把未校验的数据继续往下传
    pub fn from_row(index: usize, row: serde_json::Value) -> AppResult<Self> {
        serde_json::from_value(row).map_err(|e| AppError::row_decode_failed(index, e))
    }
}

// Helper function to deserialize question_types as either string or string array
fn deserialize_question_types<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{SeqAccess, Visitor};
    use std::fmt;

    struct QuestionTypesVisitor;

    impl<'de> Visitor<'de> for QuestionTypesVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or an array of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut values = Vec::new();
            while let Some(value) = seq.next_element::<String>()? {
                values.push(value);
            }
            Ok(values)
        }
    }

    deserializer.deserialize_any(QuestionTypesVisitor)
}

/// 审批入库的载荷（由外部审批动作触发，这里仅保留客户端侧的辅助结构）
#[derive(Debug, Clone, Serialize)]
pub struct PaperDraft {
    pub title: String,
    pub subject_name: String,
    pub course_code: String,
    pub exam_type: ExamType,
    pub total_marks: u32,
    pub question_difficulty: Difficulty,
    pub question_types: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub pdf_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> serde_json::Value {
        json!({
            "id": 7,
            "title": "Midterm",
            "subject_name": "Operating Systems",
            "course_code": "CS101",
            "exam_type": "Semester End",
            "total_marks": 50,
            "question_difficulty": "Easy",
            "question_types": ["Multiple Choice", "Short Answer"],
            "created_at": "2025-03-14T08:30:00Z",
            "pdf_data": "JVBERi0xLjQ="
        })
    }

    #[test]
    fn test_decode_valid_row() {
        let paper = ApprovedPaper::from_row(0, sample_row()).expect("记录应能解析");
        assert_eq!(paper.id, 7);
        assert_eq!(paper.course_code, "CS101");
        assert_eq!(paper.exam_type, ExamType::SemesterEnd);
        assert_eq!(paper.question_difficulty, Difficulty::Easy);
        assert_eq!(
            paper.question_types,
            vec!["Multiple Choice".to_string(), "Short Answer".to_string()]
        );
    }

    #[test]
    fn test_decode_question_types_as_plain_string() {
        // 旧数据里 question_types 可能是单个字符串而非数组
        let mut row = sample_row();
        row["question_types"] = json!("Mixed");

        let paper = ApprovedPaper::from_row(0, row).expect("字符串形式也应能解析");
        assert_eq!(paper.question_types, vec!["Mixed".to_string()]);
    }

    #[test]
    fn test_decode_row_with_missing_field_fails() {
        let mut row = sample_row();
        row.as_object_mut().unwrap().remove("pdf_data");

        let err = ApprovedPaper::from_row(3, row).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)), "缺字段应报解析错误");
        assert!(err.to_string().contains("第 4 行"));
    }

    #[test]
    fn test_decode_row_with_wrong_type_fails() {
        let mut row = sample_row();
        row["total_marks"] = json!("五十");

        let err = ApprovedPaper::from_row(0, row).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_effective_question_types_defaults_to_mixed() {
        let request = SubmissionRequest {
            api_key: String::new(),
            college_name: String::new(),
            title: "Midterm".to_string(),
            exam_type: ExamType::Test,
            total_marks: 50,
            question_difficulty: Difficulty::Easy,
            question_types: vec![],
            files: vec![],
        };
        assert_eq!(request.effective_question_types(), vec!["Mixed".to_string()]);
    }

    #[test]
    fn test_effective_question_types_keeps_selection_order() {
        let request = SubmissionRequest {
            api_key: String::new(),
            college_name: String::new(),
            title: String::new(),
            exam_type: ExamType::Test,
            total_marks: 100,
            question_difficulty: Difficulty::Mixed,
            question_types: vec![QuestionType::ShortAnswer, QuestionType::MultipleChoice],
            files: vec![],
        };
        assert_eq!(
            request.effective_question_types(),
            vec!["Short Answer".to_string(), "Multiple Choice".to_string()]
        );
    }

    #[test]
    fn test_exam_type_labels() {
        assert_eq!(ExamType::InternalAssessment.as_str(), "Internal Assessment");
        let parsed: ExamType = serde_json::from_str("\"Internal Assessment\"").unwrap();
        assert_eq!(parsed, ExamType::InternalAssessment);
    }
}
