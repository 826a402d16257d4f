//! 命中项与排序（内部使用）

/// 单次命中的内部表示
#[derive(Debug, Clone)]
pub(crate) struct Finding {
    pub(crate) rule_id: String,
    pub(crate) value: String,
    pub(crate) line: usize,
    pub(crate) start_offset: usize,
}

/// 对单文件命中进行稳定排序：起始偏移升序 → 长度降序 → 值字典序升序
pub(crate) fn sort_findings_stable(findings: &mut Vec<Finding>) {
    findings.sort_by(|a, b| {
        use std::cmp::Ordering;
        match a.start_offset.cmp(&b.start_offset) {
            Ordering::Equal => match b.value.len().cmp(&a.value.len()) {
                Ordering::Equal => a.value.cmp(&b.value),
                o => o,
            },
            o => o,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(value: &str, start: usize) -> Finding {
        Finding {
            rule_id: "r".to_string(),
            value: value.to_string(),
            line: 1,
            start_offset: start,
        }
    }

    #[test]
    fn sort_is_offset_then_longest_then_lexicographic() {
        let mut v = vec![f("bb", 5), f("aaa", 5), f("z", 0), f("aa", 5)];
        sort_findings_stable(&mut v);
        let order: Vec<&str> = v.iter().map(|x| x.value.as_str()).collect();
        assert_eq!(order, vec!["z", "aaa", "aa", "bb"]);
    }
}
