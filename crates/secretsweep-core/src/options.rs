//! 扫描选项与统计信息（模块）

/// 扫描引擎类型
/// - Bytes：基于 `regex::bytes` 的字节级匹配，稳健且避免编码问题（默认）。
/// - Utf8：基于 `String` 的匹配，适合需要 UTF-8 语义的场景。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEngine {
    Bytes,
    Utf8,
}

/// 扫描选项（作为 Settings 的一部分在作用域内生效）
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 最大文件大小（字节）；超过则跳过该文件
    pub max_file_size: Option<u64>,
    /// 扫描引擎：Bytes（字节级）或 Utf8（基于字符串）
    pub engine: ScanEngine,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_file_size: None,
            engine: ScanEngine::Bytes,
        }
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub findings_total: usize,
}
