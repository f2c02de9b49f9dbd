//! 检索/浏览面板 - 流程层
//!
//! 核心职责：把三个可选条件拼成检索过滤器，驱动
//! 初始加载 → 检索 → 解码下载 流程
//!
//! 错误约定：检索失败保留上一次的结果，空结果只提示不报错

use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::clients::PaperStore;
use crate::error::{AppError, AppResult, ValidationError};
use crate::infrastructure::{decode_artifact, download_file_name, ArtifactSink};
use crate::models::{ApprovedPaper, SearchFilter};
use crate::services::Notifier;

/// 检索/浏览面板
pub struct SearchPanel {
    subject_name: String,
    course_code: String,
    date: String,
    papers: Vec<ApprovedPaper>,
    loading: bool,
    store: Arc<dyn PaperStore>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn ArtifactSink>,
}

impl SearchPanel {
    /// 创建空面板
    pub fn new(
        store: Arc<dyn PaperStore>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            subject_name: String::new(),
            course_code: String::new(),
            date: String::new(),
            papers: Vec::new(),
            loading: false,
            store,
            notifier,
            sink,
        }
    }

    // ========== 条件编辑 ==========

    pub fn set_subject_name(&mut self, value: impl Into<String>) {
        self.subject_name = value.into();
    }

    pub fn set_course_code(&mut self, value: impl Into<String>) {
        self.course_code = value.into();
    }

    /// 日期条件，格式 YYYY-MM-DD，空串表示不过滤
    pub fn set_date(&mut self, value: impl Into<String>) {
        self.date = value.into();
    }

    // ========== 加载与检索 ==========

    /// 面板挂载时的无条件初始加载
    pub async fn load_initial(&mut self) -> AppResult<()> {
        if self.loading {
            return Ok(());
        }
        self.loading = true;
        info!("📥 正在加载初始试卷列表...");

        let result = self.store.fetch_approved(&SearchFilter::default()).await;
        self.loading = false;

        match result {
            Ok(papers) => {
                info!("✓ 初始加载完成，共 {} 份试卷", papers.len());
                self.papers = papers;
                Ok(())
            }
            Err(e) => {
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    /// 按当前条件检索
    pub async fn search(&mut self) -> AppResult<()> {
        if self.loading {
            // 检索按钮在请求期间是禁用的，重复触发直接忽略
            return Ok(());
        }

        let filter = match self.build_filter() {
            Ok(filter) => filter,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return Err(e);
            }
        };

        self.loading = true;
        info!("🔍 正在检索已审批试卷...");

        let result = self.store.fetch_approved(&filter).await;
        self.loading = false;

        match result {
            Ok(papers) => {
                info!("✓ 检索完成，共 {} 份试卷", papers.len());
                if papers.is_empty() {
                    self.notifier.info("没有找到符合条件的试卷");
                }
                // 空结果同样替换展示列表
                self.papers = papers;
                Ok(())
            }
            Err(e) => {
                // 检索失败时保留上一次的结果
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    /// 解码某条结果的内嵌附件并投递到下载目录
    ///
    /// 索引越界时是空操作；base64 损坏时报解码错误
    pub fn download(&self, index: usize) -> AppResult<Option<PathBuf>> {
        let Some(paper) = self.papers.get(index) else {
            return Ok(None);
        };

        let content = match decode_artifact(&paper.pdf_data) {
            Ok(content) => content,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return Err(e);
            }
        };

        let path = self.sink.deliver(&content, &download_file_name(&paper.title))?;
        Ok(Some(path))
    }

    /// 把三个可选输入拼成过滤器，空串视为不过滤
    fn build_filter(&self) -> AppResult<SearchFilter> {
        let date = match self.date.trim() {
            "" => None,
            raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    return Err(AppError::Validation(ValidationError::BadDate {
                        value: raw.to_string(),
                    }));
                }
            },
        };

        let none_if_empty = |value: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        Ok(SearchFilter {
            subject_name: none_if_empty(&self.subject_name),
            course_code: none_if_empty(&self.course_code),
            date,
        })
    }

    // ========== 状态访问 ==========

    pub fn papers(&self) -> &[ApprovedPaper] {
        &self.papers
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::encode_artifact;
    use crate::models::{Difficulty, ExamType};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 按脚本逐次返回结果的持久层假实现
    enum ScriptedResponse {
        Rows(Vec<ApprovedPaper>),
        Fail(String),
    }

    #[derive(Default)]
    struct FakeStore {
        script: Mutex<VecDeque<ScriptedResponse>>,
        fetch_count: Mutex<usize>,
    }

    impl FakeStore {
        fn push(&self, response: ScriptedResponse) {
            self.script.lock().unwrap().push_back(response);
        }

        fn fetches(&self) -> usize {
            *self.fetch_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl PaperStore for FakeStore {
        async fn fetch_approved(&self, _filter: &SearchFilter) -> AppResult<Vec<ApprovedPaper>> {
            *self.fetch_count.lock().unwrap() += 1;
            match self.script.lock().unwrap().pop_front() {
                Some(ScriptedResponse::Rows(rows)) => Ok(rows),
                Some(ScriptedResponse::Fail(detail)) => {
                    Err(AppError::bad_response("/rest/v1/approved_papers", 500, Some(detail)))
                }
                None => Ok(Vec::new()),
            }
        }

        async fn approve(&self, _draft: &crate::models::PaperDraft) -> AppResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<(&'static str, String)>>,
    }

    impl RecordingNotifier {
        fn levels(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(|(l, _)| *l).collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn success(&self, message: &str) {
            self.events.lock().unwrap().push(("success", message.to_string()));
        }
        fn info(&self, message: &str) {
            self.events.lock().unwrap().push(("info", message.to_string()));
        }
        fn warning(&self, message: &str) {
            self.events.lock().unwrap().push(("warning", message.to_string()));
        }
        fn error(&self, message: &str) {
            self.events.lock().unwrap().push(("error", message.to_string()));
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<(Vec<u8>, String)>>,
    }

    impl ArtifactSink for RecordingSink {
        fn deliver(&self, content: &[u8], file_name: &str) -> AppResult<PathBuf> {
            self.delivered
                .lock()
                .unwrap()
                .push((content.to_vec(), file_name.to_string()));
            Ok(PathBuf::from(file_name))
        }
    }

    fn paper_with(title: &str, pdf_data: &str) -> ApprovedPaper {
        ApprovedPaper {
            id: 1,
            title: title.to_string(),
            subject_name: "Operating Systems".to_string(),
            course_code: "CS101".to_string(),
            exam_type: ExamType::Test,
            total_marks: 50,
            question_difficulty: Difficulty::Easy,
            question_types: vec!["Mixed".to_string()],
            created_at: Utc::now(),
            pdf_data: pdf_data.to_string(),
        }
    }

    fn build_panel(
        store: Arc<FakeStore>,
        notifier: Arc<RecordingNotifier>,
        sink: Arc<RecordingSink>,
    ) -> SearchPanel {
        SearchPanel::new(store, notifier, sink)
    }

    #[tokio::test]
    async fn test_initial_load_populates_results() {
        let store = Arc::new(FakeStore::default());
        store.push(ScriptedResponse::Rows(vec![paper_with("Midterm", "")]));

        let mut panel = build_panel(store, Arc::default(), Arc::default());
        panel.load_initial().await.expect("初始加载应成功");

        assert_eq!(panel.papers().len(), 1);
        assert_eq!(panel.papers()[0].title, "Midterm");
    }

    #[tokio::test]
    async fn test_empty_result_raises_info_and_replaces_list() {
        let store = Arc::new(FakeStore::default());
        store.push(ScriptedResponse::Rows(vec![paper_with("Midterm", "")]));
        store.push(ScriptedResponse::Rows(Vec::new()));

        let notifier = Arc::new(RecordingNotifier::default());
        let mut panel = build_panel(store, notifier.clone(), Arc::default());

        panel.search().await.expect("第一次检索应成功");
        assert_eq!(panel.papers().len(), 1);

        panel.search().await.expect("空结果不算错误");
        assert!(panel.papers().is_empty());
        assert_eq!(notifier.levels(), vec!["info"]);
    }

    #[tokio::test]
    async fn test_query_error_preserves_previous_results() {
        let store = Arc::new(FakeStore::default());
        store.push(ScriptedResponse::Rows(vec![paper_with("Midterm", "")]));
        store.push(ScriptedResponse::Fail("connection reset".to_string()));

        let notifier = Arc::new(RecordingNotifier::default());
        let mut panel = build_panel(store, notifier.clone(), Arc::default());

        panel.search().await.expect("第一次检索应成功");
        let err = panel.search().await.unwrap_err();

        assert!(err.to_string().contains("connection reset"));
        // 上一次的结果仍然在展示
        assert_eq!(panel.papers().len(), 1);
        assert_eq!(notifier.levels(), vec!["error"]);
        assert!(!panel.is_loading());
    }

    #[tokio::test]
    async fn test_bad_date_blocks_query() {
        let store = Arc::new(FakeStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let mut panel = build_panel(store.clone(), notifier.clone(), Arc::default());

        panel.set_date("2025/03/14");
        let err = panel.search().await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(store.fetches(), 0);
        assert_eq!(notifier.levels(), vec!["error"]);
    }

    #[tokio::test]
    async fn test_download_round_trips_embedded_artifact() {
        let original: Vec<u8> = b"%PDF-1.4\nround trip".to_vec();
        let store = Arc::new(FakeStore::default());
        store.push(ScriptedResponse::Rows(vec![paper_with(
            "Midterm",
            &encode_artifact(&original),
        )]));

        let sink = Arc::new(RecordingSink::default());
        let mut panel = build_panel(store, Arc::default(), sink.clone());
        panel.load_initial().await.expect("初始加载应成功");

        let path = panel.download(0).expect("下载应成功").expect("索引 0 存在");
        assert_eq!(path, PathBuf::from("Midterm.pdf"));

        let delivered = sink.delivered.lock().unwrap();
        // 编码入库再解码下载，逐字节一致
        assert_eq!(delivered[0].0, original);
    }

    #[tokio::test]
    async fn test_download_malformed_base64_fails_with_decode_error() {
        let store = Arc::new(FakeStore::default());
        store.push(ScriptedResponse::Rows(vec![paper_with(
            "Broken",
            "不是base64!!!",
        )]));

        let notifier = Arc::new(RecordingNotifier::default());
        let mut panel = build_panel(store, notifier.clone(), Arc::default());
        panel.load_initial().await.expect("初始加载应成功");

        let err = panel.download(0).unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
        assert_eq!(notifier.levels(), vec!["error"]);
    }

    #[tokio::test]
    async fn test_download_out_of_range_is_noop() {
        let panel = build_panel(Arc::default(), Arc::default(), Arc::default());
        assert!(panel.download(5).unwrap().is_none());
    }
}
