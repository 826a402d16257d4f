//! 规则文件加载（TOML）与内置默认规则
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// 内置默认规则（编译期嵌入，保证默认配置总是可建立）
pub(crate) const DEFAULT_RULES_TOML: &str = include_str!("../rules/default.toml");

/// 单条规则的配置（支持 pattern 或 regex 字段）
#[derive(Debug, Clone, Deserialize)]
struct RuleEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
}

/// 顶层规则文件结构
#[derive(Debug, Clone, Deserialize)]
struct RuleFile {
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// 归一化后的规则规格（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RuleSpec {
    pub id: String,
    #[allow(dead_code)]
    pub name: Option<String>,
    pub pat: String,
}

impl RuleSpec {
    pub(crate) fn pattern(&self) -> &str {
        &self.pat
    }
}

/// 从 TOML 规则文件加载并归一化为 RuleSpec 列表
pub(crate) fn load_rule_specs(path: &Path) -> Result<Vec<RuleSpec>> {
    let txt = std::fs::read_to_string(path)
        .with_context(|| format!("read rules file {}", path.display()))?;
    parse_rule_specs(&txt).with_context(|| format!("parse rules file {}", path.display()))
}

/// 解析内置默认规则
pub(crate) fn default_rule_specs() -> Result<Vec<RuleSpec>> {
    parse_rule_specs(DEFAULT_RULES_TOML).context("parse built-in default rules")
}

fn parse_rule_specs(txt: &str) -> Result<Vec<RuleSpec>> {
    let parsed: RuleFile = toml::from_str(txt)?;
    let mut out = Vec::new();

    for e in parsed.rules {
        // 兼容两种字段名：pattern 或 regex；二者皆缺视为配置不可建立
        let pat = match (e.pattern, e.regex) {
            (Some(p), _) => p,
            (None, Some(r)) => r,
            (None, None) => bail!("rule `{}` has neither `pattern` nor `regex`", e.id),
        };
        out.push(RuleSpec { id: e.id, name: e.name, pat });
    }

    Ok(out)
}
