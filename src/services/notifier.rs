//! 通知服务 - 业务能力层
//!
//! 只负责"向用户冒一条临时提示"能力，不关心流程

use tracing::{error, info, warn};

/// 通知接收端
///
/// 职责：
/// - 接收各组件边界上产生的临时提示
/// - 不持有状态，不参与流程编排
///
/// 页面里的全局 toast 在这里变成显式注入的服务
pub trait Notifier: Send + Sync {
    /// 操作成功
    fn success(&self, message: &str);
    /// 中性信息（例如检索结果为空）
    fn info(&self, message: &str);
    /// 警告（可以继续的异常情况）
    fn warning(&self, message: &str);
    /// 错误（当前操作被中止）
    fn error(&self, message: &str);
}

/// 基于 tracing 的通知实现
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!("✅ {}", message);
    }

    fn info(&self, message: &str) {
        info!("💡 {}", message);
    }

    fn warning(&self, message: &str) {
        warn!("⚠️ {}", message);
    }

    fn error(&self, message: &str) {
        error!("❌ {}", message);
    }
}
