//! 扫描主流程：配置 → 扫描 → 报告
//!
//! 严格线性：先扫描显式文件，再扫描 glob，二者共享同一命中集合；
//! 任一步失败立即中止，不输出部分报告。

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::collection::SecretsCollection;
use crate::settings::{default_settings, Settings};

/// 默认显式文件目标
pub const DEFAULT_FILE_TARGET: &str = "test_data/config.ini";
/// 默认 glob 目标（裸后缀，按扩展名选取）
pub const DEFAULT_GLOB_TARGET: &str = ".password";

/// 在默认配置作用域内按固定顺序扫描两个目标，返回累积的命中集合
pub fn run(file: &Path, pattern: &str) -> Result<SecretsCollection> {
    let _scope = default_settings()?;
    run_in_scope(file, pattern)
}

/// 同上，但使用调用方提供的配置（如 --rules 指定的规则文件）
pub fn run_with(settings: Settings, file: &Path, pattern: &str) -> Result<SecretsCollection> {
    let _scope = settings.activate();
    run_in_scope(file, pattern)
}

fn run_in_scope(file: &Path, pattern: &str) -> Result<SecretsCollection> {
    let mut secrets = SecretsCollection::new();
    secrets
        .scan_file(file)
        .with_context(|| format!("scan file target {}", file.display()))?;
    secrets
        .scan_files(pattern)
        .with_context(|| format!("scan glob target `{pattern}`"))?;
    Ok(secrets)
}

/// 将命中集合按两空格缩进的 JSON 写入 `out`（集合的纯函数，重复调用字节一致）
pub fn report(secrets: &SecretsCollection, out: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, &secrets.grouped()).context("serialize report")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ScanOptions;
    use std::fs;
    use tempfile::TempDir;

    fn scenario_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("test_data")).unwrap();
        fs::write(
            dir.path().join("test_data/config.ini"),
            "[auth]\npassword = \"hunter2\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("secret.password"),
            "api_key=ABCD1234\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn scenario_reports_two_findings_grouped_by_path() {
        let dir = scenario_dir();
        let file = dir.path().join("test_data/config.ini");
        let glob = format!("{}/*.password", dir.path().display());

        let secrets = run(&file, &glob).unwrap();
        assert_eq!(secrets.total_findings(), 2);

        let json = secrets.json().unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);

        let config_key = file.display().to_string();
        let config = obj[&config_key].as_array().unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config[0]["value"], "hunter2");
        assert_eq!(config[0]["rule_id"], "keyword-assignment");
        assert_eq!(config[0]["line"], 2);

        let secret_key = dir.path().join("secret.password").display().to_string();
        let secret = obj[&secret_key].as_array().unwrap();
        assert_eq!(secret.len(), 1);
        assert_eq!(secret[0]["value"], "ABCD1234");
    }

    #[test]
    fn report_is_two_space_indented_and_idempotent() {
        let dir = scenario_dir();
        let file = dir.path().join("test_data/config.ini");
        let glob = format!("{}/*.password", dir.path().display());
        let secrets = run(&file, &glob).unwrap();

        let mut first = Vec::new();
        report(&secrets, &mut first).unwrap();
        let mut second = Vec::new();
        report(&secrets, &mut second).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        assert!(text.ends_with("}\n"));
        // serde_json 的 pretty 输出为两空格缩进
        assert!(text.lines().nth(1).unwrap().starts_with("  \""));
    }

    #[test]
    fn empty_targets_report_empty_object() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("clean.ini"), "nothing here\n").unwrap();
        fs::write(dir.path().join("empty.password"), "still nothing\n").unwrap();

        let file = dir.path().join("clean.ini");
        let glob = format!("{}/*.password", dir.path().display());
        let secrets = run(&file, &glob).unwrap();
        assert!(secrets.is_empty());

        let mut out = Vec::new();
        report(&secrets, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{}\n");
    }

    #[test]
    fn missing_file_target_aborts_before_reporting() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.password"), "api_key=ABCD1234\n").unwrap();

        let file = dir.path().join("does-not-exist.ini");
        let glob = format!("{}/*.password", dir.path().display());
        assert!(run(&file, &glob).is_err());
    }

    #[test]
    fn run_with_honors_custom_rules_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("only.ini"), "MAGIC-0001 and api_key=ABCD1234\n").unwrap();
        fs::write(dir.path().join("one.password"), "MAGIC-0002\n").unwrap();
        let rules = dir.path().join("rules.toml");
        fs::write(
            &rules,
            "[[rules]]\nid = \"magic\"\npattern = '\\b(MAGIC-[0-9]{4})\\b'\n",
        )
        .unwrap();

        let settings = Settings::from_rules_file(&rules, ScanOptions::default()).unwrap();
        let file = dir.path().join("only.ini");
        let glob = format!("{}/*.password", dir.path().display());
        let secrets = run_with(settings, &file, &glob).unwrap();

        // 自定义规则集下 api_key 不再命中，MAGIC 各命中一次
        assert_eq!(secrets.total_findings(), 2);
        let json = secrets.json().unwrap();
        let obj = json.as_object().unwrap();
        let ini = obj[&file.display().to_string()].as_array().unwrap();
        assert_eq!(ini[0]["value"], "MAGIC-0001");
    }
}
