//! 文件选择组件 - 流程层
//!
//! 维护用户选中的源文档有序列表：
//! - 两种加入方式（整批加入、按路径加入）
//! - 只接受 PDF，其他类型直接丢弃
//! - 按索引移除
//! - 每次列表变化后通过回调向上汇报当前列表

use std::path::Path;
use tracing::debug;

use crate::error::AppResult;
use crate::models::SourceFile;

/// 列表变化回调
pub type SelectionListener = Box<dyn Fn(&[SourceFile]) + Send + Sync>;

/// 文件选择组件
///
/// 职责：
/// - 只维护"当前选了哪些文件"这一份状态
/// - 不做去重，不限制数量
/// - 不认识表单和提交流程
#[derive(Default)]
pub struct FileSelection {
    files: Vec<SourceFile>,
    listener: Option<SelectionListener>,
}

impl FileSelection {
    /// 创建空的文件选择组件
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册列表变化回调
    pub fn set_listener(&mut self, listener: impl Fn(&[SourceFile]) + Send + Sync + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// 整批加入文件（拖放场景）
    ///
    /// 非 PDF 的条目被静默丢弃；有条目真正进入列表时才触发回调
    pub fn add_files(&mut self, incoming: Vec<SourceFile>) {
        let mut accepted = Vec::new();
        for file in incoming {
            if file.is_pdf() {
                accepted.push(file);
            } else {
                debug!("已忽略非 PDF 文件: {} ({})", file.file_name, file.media_type);
            }
        }

        if !accepted.is_empty() {
            self.files.extend(accepted);
            self.emit();
        }
    }

    /// 按路径加入文件（浏览选择场景）
    ///
    /// 任何一个路径读取失败时整批放弃，列表保持不变
    pub fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> AppResult<()> {
        let mut incoming = Vec::with_capacity(paths.len());
        for path in paths {
            incoming.push(SourceFile::from_path(path)?);
        }
        self.add_files(incoming);
        Ok(())
    }

    /// 按索引移除文件
    ///
    /// 索引越界时什么都不做
    pub fn remove(&mut self, index: usize) -> Option<SourceFile> {
        if index >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(index);
        self.emit();
        Some(removed)
    }

    /// 当前文件列表
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn emit(&self) {
        if let Some(listener) = &self.listener {
            listener(&self.files);
        }
    }
}
