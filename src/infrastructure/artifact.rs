//! 附件编解码与落盘 - 基础设施层
//!
//! 持有下载目录这一资源，只暴露"保存附件"的能力；
//! 编解码是纯函数，不认识表单和检索流程

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 把二进制附件编码为可入库的文本
pub fn encode_artifact(content: &[u8]) -> String {
    STANDARD.encode(content)
}

/// 把入库的文本还原为二进制附件
///
/// 内容损坏时返回解码错误
pub fn decode_artifact(text: &str) -> AppResult<Vec<u8>> {
    Ok(STANDARD.decode(text)?)
}

/// 由试卷标题推导下载文件名
///
/// 标题为空时回退到默认名
pub fn download_file_name(title: &str) -> String {
    let stem = title.trim();
    if stem.is_empty() {
        "question_paper.pdf".to_string()
    } else {
        format!("{}.pdf", stem)
    }
}

/// 清理文件名中的非法字符和特殊符号（用于本地文件系统）
pub fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| match c {
            // Windows文件系统不支持的字符
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            // 控制字符和不可见字符
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// 附件投递能力
///
/// 浏览器里的 object-URL 下载在这里抽象成一个落盘动作，
/// 写完即释放句柄，不持有任何长期资源
pub trait ArtifactSink: Send + Sync {
    /// 把附件按给定文件名投递出去，返回最终落盘路径
    fn deliver(&self, content: &[u8], file_name: &str) -> AppResult<PathBuf>;
}

/// 写入本地下载目录的投递实现
pub struct DiskSink {
    download_dir: PathBuf,
}

impl DiskSink {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }
}

impl ArtifactSink for DiskSink {
    fn deliver(&self, content: &[u8], file_name: &str) -> AppResult<PathBuf> {
        std::fs::create_dir_all(&self.download_dir)
            .map_err(|e| AppError::file_write_failed(self.download_dir.display().to_string(), e))?;

        let target = self.download_dir.join(sanitize_file_name(file_name));
        std::fs::write(&target, content)
            .map_err(|e| AppError::file_write_failed(target.display().to_string(), e))?;

        debug!("附件已保存: {} ({} 字节)", target.display(), content.len());

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_round_trip_is_byte_identical() {
        // 伪造一段 PDF 字节，编码再解码后必须逐字节一致
        let original: Vec<u8> = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF".to_vec();
        let encoded = encode_artifact(&original);
        let decoded = decode_artifact(&encoded).expect("合法 base64 应能解码");
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_malformed_text_fails() {
        let err = decode_artifact("这不是base64!!!").unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_download_file_name_fallback() {
        assert_eq!(download_file_name("Midterm"), "Midterm.pdf");
        assert_eq!(download_file_name("   "), "question_paper.pdf");
        assert_eq!(download_file_name(""), "question_paper.pdf");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a/b\\c:d.pdf"), "a_b_c_d.pdf");
        assert_eq!(sanitize_file_name("期中试卷.pdf"), "期中试卷.pdf");
    }

    #[test]
    fn test_disk_sink_writes_file() {
        let dir = std::env::temp_dir().join("request_question_paper_sink_test");
        let sink = DiskSink::new(&dir);

        let path = sink
            .deliver(b"%PDF-1.4 test", "Midterm.pdf")
            .expect("写入应成功");

        assert_eq!(path.file_name().unwrap().to_string_lossy(), "Midterm.pdf");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 test");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
