/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 生成服务基础URL
    pub generator_base_url: String,
    /// 持久层基础URL
    pub store_url: String,
    /// 持久层访问密钥
    pub store_api_key: String,
    /// 已审批试卷表名
    pub papers_table: String,
    /// 提交单存放目录
    pub task_folder: String,
    /// 下载目录
    pub download_dir: String,
    /// 同时处理的提交单数量
    pub max_concurrent_submissions: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 检索模式参数 ---
    pub search_subject: String,
    pub search_course_code: String,
    pub search_date: String,
    pub search_download_index: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generator_base_url: "http://127.0.0.1:8000".to_string(),
            store_url: "http://127.0.0.1:54321".to_string(),
            store_api_key: String::new(),
            papers_table: "approved_papers".to_string(),
            task_folder: "submissions".to_string(),
            download_dir: "downloads".to_string(),
            max_concurrent_submissions: 4,
            verbose_logging: false,
            search_subject: String::new(),
            search_course_code: String::new(),
            search_date: String::new(),
            search_download_index: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            generator_base_url: std::env::var("GENERATOR_BASE_URL").unwrap_or(default.generator_base_url),
            store_url: std::env::var("STORE_URL").unwrap_or(default.store_url),
            store_api_key: std::env::var("STORE_API_KEY").unwrap_or(default.store_api_key),
            papers_table: std::env::var("PAPERS_TABLE").unwrap_or(default.papers_table),
            task_folder: std::env::var("TASK_FOLDER").unwrap_or(default.task_folder),
            download_dir: std::env::var("DOWNLOAD_DIR").unwrap_or(default.download_dir),
            max_concurrent_submissions: std::env::var("MAX_CONCURRENT_SUBMISSIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_submissions),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            search_subject: std::env::var("SEARCH_SUBJECT").unwrap_or(default.search_subject),
            search_course_code: std::env::var("SEARCH_COURSE_CODE").unwrap_or(default.search_course_code),
            search_date: std::env::var("SEARCH_DATE").unwrap_or(default.search_date),
            search_download_index: std::env::var("SEARCH_DOWNLOAD_INDEX").ok().and_then(|v| v.parse().ok()),
        }
    }
}
