/// 持久层客户端
///
/// 通过查询构造器风格的 REST 接口访问 approved_papers 表，
/// 只做条件翻译和记录解码，不落任何本地状态
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::Value;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{ApprovedPaper, PaperDraft, SearchFilter};

/// 持久层能力
///
/// 检索面板只依赖这个能力
#[async_trait]
pub trait PaperStore: Send + Sync {
    /// 按条件检索已审批试卷，created_at 降序
    async fn fetch_approved(&self, filter: &SearchFilter) -> AppResult<Vec<ApprovedPaper>>;

    /// 审批入库（由外部审批动作使用，前端侧仅保留此辅助入口）
    async fn approve(&self, draft: &PaperDraft) -> AppResult<()>;
}

/// 持久层 HTTP 客户端
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl StoreClient {
    /// 创建新的持久层客户端
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            table: table.into(),
        }
    }

    fn table_endpoint(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }

    /// 从失败响应中提取服务端说明
    async fn extract_detail(response: reqwest::Response) -> Option<String> {
        response.json::<Value>().await.ok().and_then(|body| {
            body.get("message")
                .or_else(|| body.get("detail"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
    }
}

/// 把检索条件翻译成查询构造器参数
///
/// 科目名是子串匹配，课程代码是精确匹配，
/// 日期条件展开成 created_at 的闭区间上下界
pub fn build_query_params(filter: &SearchFilter) -> Vec<(String, String)> {
    let mut params = vec![
        ("select".to_string(), "*".to_string()),
        ("order".to_string(), "created_at.desc".to_string()),
    ];

    if let Some(subject) = &filter.subject_name {
        params.push(("subject_name".to_string(), format!("ilike.*{}*", subject)));
    }

    if let Some(code) = &filter.course_code {
        params.push(("course_code".to_string(), format!("eq.{}", code)));
    }

    if let Some((start, end)) = filter.created_range() {
        params.push((
            "created_at".to_string(),
            format!("gte.{}", start.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ));
        params.push((
            "created_at".to_string(),
            format!("lte.{}", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ));
    }

    params
}

/// 把查询返回的动态行逐条解码为记录
pub fn decode_rows(rows: Vec<Value>) -> AppResult<Vec<ApprovedPaper>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| ApprovedPaper::from_row(index, row))
        .collect()
}

#[async_trait]
impl PaperStore for StoreClient {
    async fn fetch_approved(&self, filter: &SearchFilter) -> AppResult<Vec<ApprovedPaper>> {
        let endpoint = self.table_endpoint();
        let params = build_query_params(filter);
        debug!("检索已审批试卷: {} {:?}", endpoint, params);

        let response = self
            .http
            .get(&endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = Self::extract_detail(response).await;
            return Err(AppError::bad_response(
                endpoint.as_str(),
                status.as_u16(),
                detail,
            ));
        }

        let rows = response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        debug!("检索完成，共 {} 行", rows.len());

        decode_rows(rows)
    }

    async fn approve(&self, draft: &PaperDraft) -> AppResult<()> {
        let endpoint = self.table_endpoint();
        debug!("审批入库: {} (标题: {})", endpoint, draft.title);

        let response = self
            .http
            .post(&endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(draft)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = Self::extract_detail(response).await;
            return Err(AppError::bad_response(
                endpoint.as_str(),
                status.as_u16(),
                detail,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_query_params_course_code_only() {
        let filter = SearchFilter {
            course_code: Some("CS101".to_string()),
            ..Default::default()
        };
        let params = build_query_params(&filter);

        assert!(params.contains(&("course_code".to_string(), "eq.CS101".to_string())));
        assert!(params.contains(&("order".to_string(), "created_at.desc".to_string())));
        // 没给的条件不应出现
        assert!(!params.iter().any(|(k, _)| k == "subject_name"));
        assert!(!params.iter().any(|(k, _)| k == "created_at"));
    }

    #[test]
    fn test_query_params_subject_is_substring_match() {
        let filter = SearchFilter {
            subject_name: Some("Operating".to_string()),
            ..Default::default()
        };
        let params = build_query_params(&filter);

        assert!(params.contains(&(
            "subject_name".to_string(),
            "ilike.*Operating*".to_string()
        )));
    }

    #[test]
    fn test_query_params_date_expands_to_full_day() {
        let filter = SearchFilter {
            date: Some(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            ..Default::default()
        };
        let params = build_query_params(&filter);

        assert!(params.contains(&(
            "created_at".to_string(),
            "gte.2025-03-14T00:00:00.000Z".to_string()
        )));
        assert!(params.contains(&(
            "created_at".to_string(),
            "lte.2025-03-14T23:59:59.999Z".to_string()
        )));
    }

    #[test]
    fn test_decode_rows_reports_bad_row_index() {
        let rows = vec![serde_json::json!({"id": "不是数字"})];
        let err = decode_rows(rows).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }
}
