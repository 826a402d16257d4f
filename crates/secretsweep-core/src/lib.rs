//! 项目密钥泄露扫描库
//!
//! 设计要点：
//! - 配置走“作用域”语义：`default_settings()` 返回 RAII 守卫，守卫存活期间
//!   扫描调用使用该配置，离开作用域（含错误路径）自动恢复。
//! - `SecretsCollection` 在多次扫描调用间累积命中，按 (规则, 值) 去重，
//!   末尾一次性序列化为按路径分组、两空格缩进的 JSON。
//! - 检测优先采用“字节级”引擎（AC 锚点预筛 + 窗口内精准正则），
//!   避免 UTF-8 解码失败导致的漏检/退化；Utf8 引擎备选。
//! - 单线程严格顺序执行；任何失败原样向上传播，不做部分恢复。

mod collection;
mod detectors;
mod engine_bytes;
mod engine_utf8;
mod errors;
mod findings;
mod options;
mod prefilter;
mod rules;
mod scan;
mod settings;
mod types;

pub use collection::SecretsCollection;
pub use errors::SweepError;
pub use options::{ScanEngine, ScanOptions, ScanStats};
pub use scan::{report, run, run_with, DEFAULT_FILE_TARGET, DEFAULT_GLOB_TARGET};
pub use settings::{default_settings, Settings, SettingsGuard};
pub use types::ReportedFinding;
