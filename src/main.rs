use anyhow::Result;
use request_question_paper::app::App;
use request_question_paper::config::Config;
use request_question_paper::logger;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化应用
    let app = App::initialize(config)?;

    // 第一个参数为 search 时进入检索模式，默认批量处理提交单
    match std::env::args().nth(1).as_deref() {
        Some("search") => app.run_search().await?,
        _ => app.run().await?,
    }

    Ok(())
}
