//! 命中集合：按源文件路径累积检出结果
//!
//! - 进程内唯一归属者是扫描流程，生命周期：建空 → 多次扫描累积 → 末尾序列化。
//! - 同一文件多次扫描按 (规则, 值) 合并去重，保证既不丢失也不重复。
//! - 序列化输出按路径（BTreeMap）与文件内稳定排序，保证可复现。

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::engine_bytes::scan_file_bytes;
use crate::engine_utf8::scan_file_utf8;
use crate::errors::SweepError;
use crate::findings::{sort_findings_stable, Finding};
use crate::options::{ScanEngine, ScanStats};
use crate::settings::Settings;
use crate::types::ReportedFinding;

/// 累积的命中集合
#[derive(Default)]
pub struct SecretsCollection {
    /// 路径 -> 文件内命中（仅保存有命中的文件）
    files: BTreeMap<String, Vec<Finding>>,
    stats: ScanStats,
}

impl SecretsCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在当前设置作用域下扫描单个显式文件路径
    /// 文件缺失/不可读是错误，原样向上传播
    pub fn scan_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let settings = Settings::current()?;
        self.scan_one(path.as_ref(), &settings)
    }

    /// 在当前设置作用域下扫描 glob 匹配到的所有文件
    /// - glob 编译与匹配委托给 globset；遍历顺序排序后稳定
    /// - 裸后缀模式（如 `.password`）归一化为 `*.password`，按扩展名选取
    /// - 零匹配是错误；单个文件的扫描失败同样中止并传播
    pub fn scan_files(&mut self, pattern: &str) -> Result<()> {
        let settings = Settings::current()?;
        let target = GlobTarget::compile(pattern)?;

        let mut matched: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(&target.base).follow_links(false) {
            let entry = match entry {
                Ok(e) => e,
                // 遍历错误（如不可读子目录）不致命，但要留下痕迹
                Err(err) => {
                    tracing::warn!(%err, "skipping unreadable walk entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if target.matches(entry.path()) {
                matched.push(entry.into_path());
            }
        }
        matched.sort();

        if matched.is_empty() {
            return Err(SweepError::NoGlobMatches {
                pattern: pattern.to_string(),
            }
            .into());
        }

        for path in matched {
            self.scan_one(&path, &settings)?;
        }
        Ok(())
    }

    fn scan_one(&mut self, path: &Path, settings: &Settings) -> Result<()> {
        // 大小过滤：超限文件直接跳过（不算错误）
        if let Some(max) = settings.options.max_file_size {
            let md = std::fs::metadata(path).map_err(|source| SweepError::UnreadableTarget {
                path: path.to_path_buf(),
                source,
            })?;
            if md.len() > max {
                return Ok(());
            }
        }

        let findings = match settings.options.engine {
            ScanEngine::Bytes => scan_file_bytes(path, &settings.plan),
            ScanEngine::Utf8 => scan_file_utf8(path, &settings.detectors_utf8),
        }
        .with_context(|| format!("scan {}", path.display()))?;

        self.stats.files_scanned += 1;
        if !findings.is_empty() {
            self.insert(path, findings);
        }
        Ok(())
    }

    /// 合并命中：同一文件按 (规则, 值) 去重，保持文件内稳定排序
    fn insert(&mut self, path: &Path, findings: Vec<Finding>) {
        let entry = self.files.entry(normalize_key(path)).or_default();
        for f in findings {
            let dup = entry
                .iter()
                .any(|e| e.rule_id == f.rule_id && e.value == f.value);
            if !dup {
                self.stats.findings_total += 1;
                entry.push(f);
            }
        }
        sort_findings_stable(entry);
    }

    /// 按路径分组的报告视图（序列化输入）
    pub fn grouped(&self) -> BTreeMap<&str, Vec<ReportedFinding<'_>>> {
        self.files
            .iter()
            .map(|(path, findings)| {
                let items = findings
                    .iter()
                    .map(|f| ReportedFinding {
                        rule_id: &f.rule_id,
                        line: f.line,
                        value: &f.value,
                    })
                    .collect();
                (path.as_str(), items)
            })
            .collect()
    }

    /// JSON 结构（空集合为 `{}`）
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self.grouped()).context("serialize findings")
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_findings(&self) -> usize {
        self.stats.findings_total
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}

/// 编译后的 glob 目标：匹配器 + 遍历起点 + 匹配口径
struct GlobTarget {
    matcher: GlobMatcher,
    /// 遍历起点：模式首个元字符之前的最后一个目录分隔符为界
    base: PathBuf,
    /// true 按完整路径匹配（模式含分隔符），false 按文件名匹配
    full_path: bool,
}

impl GlobTarget {
    fn compile(pattern: &str) -> Result<Self> {
        // 裸后缀模式归一化：`.password` → `*.password`
        let normalized = if pattern.starts_with('.')
            && !pattern.contains('/')
            && !pattern.contains(['*', '?', '[', '{'])
        {
            format!("*{pattern}")
        } else {
            pattern.to_string()
        };

        let matcher = Glob::new(&normalized)
            .map_err(|source| SweepError::InvalidGlob {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();

        Ok(Self {
            matcher,
            base: glob_base(&normalized),
            full_path: normalized.contains('/'),
        })
    }

    fn matches(&self, path: &Path) -> bool {
        if self.full_path {
            self.matcher.is_match(path)
        } else {
            match path.file_name() {
                Some(name) => self.matcher.is_match(Path::new(name)),
                None => false,
            }
        }
    }
}

/// 模式的字面前缀目录（元字符之前），没有则从当前目录遍历
fn glob_base(pattern: &str) -> PathBuf {
    let meta = pattern
        .find(['*', '?', '[', '{'])
        .unwrap_or(pattern.len());
    match pattern[..meta].rfind('/') {
        Some(i) => PathBuf::from(&pattern[..=i]),
        None => PathBuf::from("."),
    }
}

/// 报告键：相对路径去掉 `./` 前缀
fn normalize_key(path: &Path) -> String {
    let s = path.display().to_string();
    s.strip_prefix("./").unwrap_or(&s).to_string()
}
