//! UTF-8 检测器集合（Utf8 引擎使用；同时充当规则校验）
use crate::errors::SweepError;
use crate::rules::RuleSpec;

/// UTF-8 检测器集合：规则 id 与编译后的正则一一对应
#[derive(Debug)]
pub(crate) struct DetectorSetUtf8 {
    pub(crate) rules: Vec<(String, regex::Regex)>,
}

impl DetectorSetUtf8 {
    /// 从规则条目构建检测器集合；任一规则编译失败即整体失败
    pub(crate) fn from_specs(specs: &[RuleSpec]) -> Result<Self, SweepError> {
        let mut rules = Vec::with_capacity(specs.len());
        for r in specs {
            let rx = regex::Regex::new(r.pattern()).map_err(|source| SweepError::InvalidRule {
                id: r.id.clone(),
                source,
            })?;
            rules.push((r.id.clone(), rx));
        }
        Ok(Self { rules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, pat: &str) -> RuleSpec {
        RuleSpec {
            id: id.to_string(),
            name: None,
            pat: pat.to_string(),
        }
    }

    #[test]
    fn invalid_rule_reports_its_id() {
        let err = DetectorSetUtf8::from_specs(&[spec("broken", "(unclosed")]).unwrap_err();
        match err {
            SweepError::InvalidRule { id, .. } => assert_eq!(id, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn builds_in_spec_order() {
        let set = DetectorSetUtf8::from_specs(&[spec("a", "foo"), spec("b", "bar")]).unwrap();
        assert_eq!(set.rules[0].0, "a");
        assert_eq!(set.rules[1].0, "b");
    }
}
