use crate::clients::{GeneratorClient, StoreClient};
use crate::config::Config;
use crate::infrastructure::DiskSink;
use crate::models::{load_all_toml_files, ApprovedPaper, SubmissionSheet};
use crate::services::TracingNotifier;
use crate::workflow::{ComposeForm, FileSelection, SearchPanel};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    generator: Arc<GeneratorClient>,
    store: Arc<StoreClient>,
    notifier: Arc<TracingNotifier>,
    sink: Arc<DiskSink>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let http = reqwest::Client::new();
        let generator = Arc::new(GeneratorClient::new(
            http.clone(),
            config.generator_base_url.clone(),
        ));
        let store = Arc::new(StoreClient::new(
            http,
            config.store_url.clone(),
            config.store_api_key.clone(),
            config.papers_table.clone(),
        ));
        let notifier = Arc::new(TracingNotifier);
        let sink = Arc::new(DiskSink::new(config.download_dir.clone()));

        Ok(Self {
            config,
            generator,
            store,
            notifier,
            sink,
        })
    }

    /// 运行批量提交主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载所有待处理的提交单
        let all_sheets = load_sheets(&self.config).await?;

        if all_sheets.is_empty() {
            warn!("⚠️ 没有找到待处理的提交单，程序结束");
            return Ok(());
        }

        let total_sheets = all_sheets.len();
        log_sheets_loaded(total_sheets, self.config.max_concurrent_submissions);

        // 处理所有提交单
        let stats = self.process_all_sheets(all_sheets).await?;

        // 输出最终统计
        print_final_stats(&stats, &self.config);

        Ok(())
    }

    /// 运行检索模式
    pub async fn run_search(&self) -> Result<()> {
        info!("🔍 检索模式");

        let mut panel = SearchPanel::new(
            self.store.clone(),
            self.notifier.clone(),
            self.sink.clone(),
        );

        // 挂载时先做一次无条件加载
        panel.load_initial().await?;

        panel.set_subject_name(self.config.search_subject.clone());
        panel.set_course_code(self.config.search_course_code.clone());
        panel.set_date(self.config.search_date.clone());

        let has_filter = !self.config.search_subject.trim().is_empty()
            || !self.config.search_course_code.trim().is_empty()
            || !self.config.search_date.trim().is_empty();

        if has_filter {
            panel.search().await?;
        }

        log_search_results(panel.papers(), self.config.verbose_logging);

        if let Some(index) = self.config.search_download_index {
            match panel.download(index)? {
                Some(path) => info!("✓ 附件已保存: {}", path.display()),
                None => warn!("⚠️ 下载索引 {} 超出结果范围", index),
            }
        }

        Ok(())
    }

    /// 处理所有提交单
    async fn process_all_sheets(&self, all_sheets: Vec<SubmissionSheet>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_submissions));
        let total_sheets = all_sheets.len();
        let max_concurrent = self.config.max_concurrent_submissions;
        let mut stats = ProcessingStats {
            total: total_sheets,
            ..Default::default()
        };

        // 分批处理
        for batch_start in (0..total_sheets).step_by(max_concurrent) {
            let batch_end = (batch_start + max_concurrent).min(total_sheets);
            let batch_num = (batch_start / max_concurrent) + 1;
            let total_batches = (total_sheets + max_concurrent - 1) / max_concurrent;

            log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total_sheets);

            let mut batch_handles = Vec::new();

            // 为本批创建并发任务
            for (idx, sheet) in all_sheets[batch_start..batch_end].iter().enumerate() {
                let submission_index = batch_start + idx + 1;
                let permit = semaphore.clone().acquire_owned().await?;
                let sheet_clone = sheet.clone();
                let generator = self.generator.clone();
                let notifier = self.notifier.clone();
                let sink = self.sink.clone();
                let verbose = self.config.verbose_logging;

                let handle = tokio::spawn(async move {
                    let _permit = permit;
                    process_single_submission(
                        sheet_clone,
                        submission_index,
                        generator,
                        notifier,
                        sink,
                        verbose,
                    )
                    .await
                });
                batch_handles.push((submission_index, handle));
            }

            // 等待本批所有任务完成
            let mut batch_result = BatchResult::default();

            for (submission_index, handle) in batch_handles {
                match handle.await {
                    Ok(Ok(true)) => {
                        batch_result.success += 1;
                    }
                    Ok(Ok(false)) => {
                        batch_result.failed += 1;
                    }
                    Ok(Err(e)) => {
                        error!("[提交 {}] ❌ 处理过程中发生错误: {}", submission_index, e);
                        batch_result.failed += 1;
                    }
                    Err(e) => {
                        error!("[提交 {}] 任务执行失败: {}", submission_index, e);
                        batch_result.failed += 1;
                    }
                }
            }

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(batch_num, &batch_result);
        }

        Ok(stats)
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

/// 加载提交单
async fn load_sheets(config: &Config) -> Result<Vec<SubmissionSheet>> {
    info!("\n📁 正在扫描待处理的提交单...");
    load_all_toml_files(&config.task_folder).await
}

/// 处理单个提交单：选择文件 → 填表 → 提交 → 下载产物
async fn process_single_submission(
    sheet: SubmissionSheet,
    submission_index: usize,
    generator: Arc<GeneratorClient>,
    notifier: Arc<TracingNotifier>,
    sink: Arc<DiskSink>,
    verbose: bool,
) -> Result<bool> {
    info!("[提交 {}] 📋 开始处理: {}", submission_index, sheet.title);

    let mut selection = FileSelection::new();
    selection.set_listener(move |files| {
        debug!("[提交 {}] 当前已选择 {} 个文件", submission_index, files.len());
    });
    selection.add_paths(&sheet.files)?;

    if verbose {
        for file in selection.files() {
            info!("[提交 {}]   · {}", submission_index, file.file_name);
        }
    }

    let mut form = ComposeForm::new(generator, notifier, sink);
    form.set_api_key(sheet.api_key);
    form.set_college_name(sheet.college_name);
    form.set_title(sheet.title.clone());
    form.set_exam_type(sheet.exam_type);
    form.set_total_marks(sheet.total_marks);
    form.set_question_difficulty(sheet.question_difficulty);
    for question_type in &sheet.question_types {
        form.toggle_question_type(*question_type, true);
    }
    form.set_files(selection.files().to_vec());

    match form.submit().await {
        Ok(()) => {
            if let Some(path) = form.download()? {
                info!("[提交 {}] ✓ 试卷已保存: {}", submission_index, path.display());
            }
            Ok(true)
        }
        Err(e) => {
            error!("[提交 {}] ❌ 提交失败: {}", submission_index, e);
            Ok(false)
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 试卷生成请求客户端");
    info!("📡 生成服务: {}", config.generator_base_url);
    info!("📊 最大并发数: {}", config.max_concurrent_submissions);
    info!("{}", "=".repeat(60));
}

fn log_sheets_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的提交单", total);
    info!("📋 将以每批 {} 个的方式处理", max_concurrent);
    info!("💡 每批完成后再开始下一批\n");
}

fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批提交单: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, result: &BatchResult) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: 成功 {}/{}",
        batch_num,
        result.success,
        result.success + result.failed
    );
    info!("{}", "─".repeat(60));
}

fn log_search_results(papers: &[ApprovedPaper], verbose: bool) {
    info!("\n{}", "=".repeat(60));
    info!("📚 共 {} 份已审批试卷", papers.len());
    info!("{}", "=".repeat(60));
    for (idx, paper) in papers.iter().enumerate() {
        info!(
            "{:2}. {} | {} ({}) | {} | {}分 | {}",
            idx + 1,
            paper.title,
            paper.subject_name,
            paper.course_code,
            paper.exam_type,
            paper.total_marks,
            paper.created_at.format("%Y-%m-%d"),
        );
        if verbose {
            info!(
                "     难度: {} | 题型: {}",
                paper.question_difficulty,
                paper.question_types.join(", ")
            );
        }
    }
}

fn print_final_stats(stats: &ProcessingStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("{}", "=".repeat(60));
    info!("\n下载目录: {}", config.download_dir);
}
