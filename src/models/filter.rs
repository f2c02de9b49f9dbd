//! 检索条件
//!
//! 每次检索前重新构建，查询结束后即丢弃

use chrono::{DateTime, NaiveDate, Utc};

/// 已审批试卷的检索条件
///
/// 三个条件都是可选的，全部为空等价于不过滤
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// 科目名称（子串匹配）
    pub subject_name: Option<String>,
    /// 课程代码（精确匹配）
    pub course_code: Option<String>,
    /// 单个日历日期，展开为全天时间范围
    pub date: Option<NaiveDate>,
}

impl SearchFilter {
    /// 把日期条件展开为闭区间 [D 00:00:00.000, D 23:59:59.999]（UTC）
    ///
    /// 与记录的 created_at 比较时两端都包含，次日零点整不在范围内
    pub fn created_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let date = self.date?;
        let start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = date.and_hms_milli_opt(23, 59, 59, 999).unwrap().and_utc();
        Some((start, end))
    }

    /// 是否没有任何过滤条件
    pub fn is_empty(&self) -> bool {
        self.subject_name.is_none() && self.course_code.is_none() && self.date.is_none()
    }
}
