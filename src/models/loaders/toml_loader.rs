use crate::models::paper::{Difficulty, ExamType, QuestionType};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 提交单：一次生成请求在磁盘上的 TOML 形态
///
/// 任务目录中一个文件对应一次提交
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionSheet {
    pub api_key: String,
    pub college_name: String,
    pub title: String,
    #[serde(default)]
    pub exam_type: ExamType,
    pub total_marks: u32,
    #[serde(default)]
    pub question_difficulty: Difficulty,
    #[serde(default)]
    pub question_types: Vec<QuestionType>,
    /// 源文档路径列表
    pub files: Vec<String>,
    #[serde(skip)]
    pub file_path: Option<String>,
}

/// 从 TOML 文件加载数据并转换为 SubmissionSheet 对象
pub async fn load_toml_to_sheet(toml_file_path: &Path) -> Result<SubmissionSheet> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut sheet: SubmissionSheet = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    // 设置文件路径
    sheet.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(sheet)
}

/// 从文件夹中加载所有 TOML 文件并转换为 SubmissionSheet 对象列表
pub async fn load_all_toml_files(folder_path: &str) -> Result<Vec<SubmissionSheet>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut sheets = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_toml_to_sheet(&path).await {
                Ok(sheet) => {
                    tracing::info!("成功加载提交单，含 {} 个源文档", sheet.files.len());
                    sheets.push(sheet);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(sheets)
}
