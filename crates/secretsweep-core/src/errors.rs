//! 结构化错误（供调用方匹配的少量错误类型）
use std::path::PathBuf;
use thiserror::Error;

/// 库层面的结构化错误；其余失败一律经 anyhow 原样向上传播
#[derive(Debug, Error)]
pub enum SweepError {
    /// 当前线程没有激活的设置作用域（需先调用 default_settings() 或 Settings::activate()）
    #[error("no active settings scope (call default_settings() first)")]
    NoActiveSettings,

    /// 规则正则编译失败
    #[error("invalid rule `{id}`: {source}")]
    InvalidRule {
        id: String,
        #[source]
        source: regex::Error,
    },

    /// glob 模式没有匹配到任何文件
    #[error("glob pattern `{pattern}` matched no files")]
    NoGlobMatches { pattern: String },

    /// glob 模式本身非法
    #[error("invalid glob pattern `{pattern}`: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// 目标文件不可读
    #[error("cannot read scan target `{}`", path.display())]
    UnreadableTarget {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
