//! 上传/组卷表单 - 流程层
//!
//! 核心职责：把表单字段和文件列表拼成一次提交，驱动完整的
//! 校验 → 提交 → 持有产物 → 下载 流程
//!
//! 状态机：Idle → Submitting → Success | Failed →（任何编辑回到 Idle）

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::clients::GeneratePaper;
use crate::error::{AppError, AppResult, ValidationError};
use crate::infrastructure::{download_file_name, ArtifactSink};
use crate::models::{Difficulty, ExamType, QuestionType, SourceFile, SubmissionRequest};
use crate::services::Notifier;

/// 表单提交状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    /// 可编辑、可提交
    Idle,
    /// 请求进行中，提交控件禁用
    Submitting,
    /// 上一次提交成功，产物在内存中
    Success,
    /// 上一次提交失败
    Failed,
}

/// 上传/组卷表单
///
/// 只依赖注入进来的能力（生成、通知、落盘），
/// 文件列表由文件选择组件通过 set_files 汇报进来
pub struct ComposeForm {
    api_key: String,
    college_name: String,
    title: String,
    exam_type: ExamType,
    total_marks: u32,
    question_difficulty: Difficulty,
    selected_question_types: Vec<QuestionType>,
    files: Vec<SourceFile>,
    state: SubmitState,
    artifact: Option<Vec<u8>>,
    generator: Arc<dyn GeneratePaper>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn ArtifactSink>,
}

impl ComposeForm {
    /// 创建新表单，字段取界面上的默认值
    pub fn new(
        generator: Arc<dyn GeneratePaper>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            api_key: String::new(),
            college_name: String::new(),
            title: String::new(),
            exam_type: ExamType::Test,
            total_marks: 100,
            question_difficulty: Difficulty::Mixed,
            selected_question_types: Vec::new(),
            files: Vec::new(),
            state: SubmitState::Idle,
            artifact: None,
            generator,
            notifier,
            sink,
        }
    }

    // ========== 字段编辑 ==========
    // 任何编辑都把状态机拉回 Idle

    pub fn set_api_key(&mut self, value: impl Into<String>) {
        self.api_key = value.into();
        self.touch();
    }

    pub fn set_college_name(&mut self, value: impl Into<String>) {
        self.college_name = value.into();
        self.touch();
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.title = value.into();
        self.touch();
    }

    pub fn set_exam_type(&mut self, value: ExamType) {
        self.exam_type = value;
        self.touch();
    }

    pub fn set_total_marks(&mut self, value: u32) {
        self.total_marks = value;
        self.touch();
    }

    pub fn set_question_difficulty(&mut self, value: Difficulty) {
        self.question_difficulty = value;
        self.touch();
    }

    /// 勾选/取消一个题型
    pub fn toggle_question_type(&mut self, question_type: QuestionType, checked: bool) {
        if checked {
            if !self.selected_question_types.contains(&question_type) {
                self.selected_question_types.push(question_type);
            }
        } else {
            self.selected_question_types.retain(|t| *t != question_type);
        }
        self.touch();
    }

    /// 接收文件选择组件汇报的当前列表
    pub fn set_files(&mut self, files: Vec<SourceFile>) {
        self.files = files;
        self.touch();
    }

    fn touch(&mut self) {
        if self.state != SubmitState::Submitting {
            self.state = SubmitState::Idle;
        }
    }

    // ========== 提交与下载 ==========

    /// 提交一次生成请求
    ///
    /// 文件列表为空时直接拦截，不发请求；
    /// 没选题型时警告并以 "Mixed" 代替；
    /// 失败时清掉旧产物并透出服务端的错误说明
    pub async fn submit(&mut self) -> AppResult<()> {
        if self.state == SubmitState::Submitting {
            // 提交控件在请求期间是禁用的，重复触发直接忽略
            return Ok(());
        }

        if self.files.is_empty() {
            let err = ValidationError::EmptyFileList;
            self.notifier.error(&err.to_string());
            return Err(AppError::Validation(err));
        }

        if self.total_marks == 0 {
            let err = ValidationError::ZeroTotalMarks;
            self.notifier.error(&err.to_string());
            return Err(AppError::Validation(err));
        }

        if self.selected_question_types.is_empty() {
            self.notifier.warning("未选择任何题型，默认使用 \"Mixed\"");
        }

        // 旧产物在新一轮提交开始时即作废
        self.artifact = None;
        self.state = SubmitState::Submitting;

        let request = self.build_request();
        info!("📤 正在提交生成请求: {}", request.title);

        match self.generator.generate(&request).await {
            Ok(content) => {
                self.artifact = Some(content);
                self.state = SubmitState::Success;
                self.notifier.success("试卷生成成功!");
                Ok(())
            }
            Err(e) => {
                self.state = SubmitState::Failed;
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    /// 把内存中的产物投递到下载目录
    ///
    /// 没有产物时是空操作；文件名取试卷标题，标题为空时回退默认名
    pub fn download(&self) -> AppResult<Option<PathBuf>> {
        let Some(artifact) = &self.artifact else {
            return Ok(None);
        };

        let file_name = download_file_name(&self.title);
        let path = self.sink.deliver(artifact, &file_name)?;
        Ok(Some(path))
    }

    /// 每次提交时重新构建请求载荷
    fn build_request(&self) -> SubmissionRequest {
        SubmissionRequest {
            api_key: self.api_key.clone(),
            college_name: self.college_name.clone(),
            title: self.title.clone(),
            exam_type: self.exam_type,
            total_marks: self.total_marks,
            question_difficulty: self.question_difficulty,
            question_types: self.selected_question_types.clone(),
            files: self.files.clone(),
        }
    }

    // ========== 状态访问 ==========

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn artifact(&self) -> Option<&[u8]> {
        self.artifact.as_deref()
    }
}
