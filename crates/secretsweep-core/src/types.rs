//! 公共类型（对外暴露）
use serde::Serialize;

/// 报告中的单个命中项（按源文件路径分组后序列化）
#[derive(Debug, Clone, Serialize)]
pub struct ReportedFinding<'a> {
    pub rule_id: &'a str,
    pub line: usize,
    pub value: &'a str,
}
