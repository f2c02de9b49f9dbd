//! # Request Question Paper
//!
//! 一个用于请求 AI 生成试卷并检索已审批试卷的 Rust 客户端
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 平台能力：附件编解码与落盘
//! - `ArtifactSink` - 附件投递能力，磁盘实现为 `DiskSink`
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - 对外部服务的薄封装
//! - `GeneratorClient` - 生成端点的 multipart 提交
//! - `StoreClient` - 持久层的查询构造器风格访问
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `Notifier` - 向用户冒临时提示的能力
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 三个前端单元的状态与流程
//! - `FileSelection` - 文件选择组件（PDF 过滤、按索引移除、变化回调）
//! - `ComposeForm` - 上传/组卷表单（Idle → Submitting → Success | Failed）
//! - `SearchPanel` - 检索/浏览面板（条件构建、结果保留约定、解码下载）
//!
//! ### ⑤ 编排层（App）
//! - `app` - 扫描提交单目录，按批并发驱动表单流程；检索模式入口
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod services;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{GeneratePaper, GeneratorClient, PaperStore, StoreClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ArtifactSink, DiskSink};
pub use models::{ApprovedPaper, SearchFilter, SubmissionRequest, SubmissionSheet};
pub use services::{Notifier, TracingNotifier};
pub use workflow::{ComposeForm, FileSelection, SearchPanel, SubmitState};
