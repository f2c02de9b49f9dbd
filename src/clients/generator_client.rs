/// 生成服务客户端
///
/// 封装所有与试卷生成端点相关的调用逻辑
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{SubmissionRequest, PDF_MEDIA_TYPE};

/// 生成能力
///
/// 表单组件只依赖这个能力，不关心具体的 HTTP 细节
#[async_trait]
pub trait GeneratePaper: Send + Sync {
    /// 提交一次生成请求，成功时返回 PDF 字节
    async fn generate(&self, request: &SubmissionRequest) -> AppResult<Vec<u8>>;
}

/// 生成服务 HTTP 客户端
pub struct GeneratorClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeneratorClient {
    /// 创建新的生成服务客户端
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/generate_question_paper/",
            self.base_url.trim_end_matches('/')
        )
    }

    /// 构建 multipart 载荷
    ///
    /// 标量字段 + 重复的 question_types 条目 + 全部源文档
    fn build_form(request: &SubmissionRequest) -> AppResult<Form> {
        let mut form = Form::new()
            .text("api_key", request.api_key.clone())
            .text("college_name", request.college_name.clone())
            .text("exam_type", request.exam_type.as_str())
            .text("total_marks", request.total_marks.to_string())
            .text("title", request.title.clone())
            .text("question_difficulty", request.question_difficulty.as_str());

        for question_type in request.effective_question_types() {
            form = form.text("question_types", question_type);
        }

        for file in &request.files {
            let part = Part::bytes(file.content.clone())
                .file_name(file.file_name.clone())
                .mime_str(PDF_MEDIA_TYPE)?;
            form = form.part("files", part);
        }

        Ok(form)
    }
}

#[async_trait]
impl GeneratePaper for GeneratorClient {
    async fn generate(&self, request: &SubmissionRequest) -> AppResult<Vec<u8>> {
        let endpoint = self.endpoint();
        debug!(
            "提交生成请求: {} (标题: {}, 文件数: {})",
            endpoint,
            request.title,
            request.files.len()
        );

        let form = Self::build_form(request)?;

        let response = self
            .http
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            // 失败响应是 JSON，detail 里是服务端给出的原因
            let detail = response.json::<Value>().await.ok().and_then(|body| {
                body.get("detail")
                    .and_then(|d| d.as_str())
                    .map(String::from)
            });
            return Err(AppError::bad_response(
                endpoint.as_str(),
                status.as_u16(),
                detail,
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        debug!("生成成功，收到 {} 字节", bytes.len());

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, ExamType, SourceFile};

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client = GeneratorClient::new(reqwest::Client::new(), "http://localhost:8000/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:8000/generate_question_paper/"
        );
    }

    #[test]
    fn test_build_form_accepts_full_request() {
        let request = SubmissionRequest {
            api_key: "sk-test".to_string(),
            college_name: "Evergreen College".to_string(),
            title: "Midterm".to_string(),
            exam_type: ExamType::Test,
            total_marks: 50,
            question_difficulty: Difficulty::Easy,
            question_types: vec![],
            files: vec![SourceFile {
                file_name: "unit1.pdf".to_string(),
                media_type: PDF_MEDIA_TYPE.to_string(),
                content: b"%PDF-1.4".to_vec(),
            }],
        };

        // 载荷构建本身不应失败
        assert!(GeneratorClient::build_form(&request).is_ok());
    }
}
