//! 设置作用域（默认检测配置的作用域激活与自动恢复）
//!
//! - `Settings` 是一份编译完成的不可变配置（规则 + 选项 + 预筛计划）。
//! - 激活返回 RAII 守卫：守卫存活期间该配置是当前线程的活动作用域，
//!   离开作用域（包括提前返回的错误路径）自动恢复上一层配置。
//! - 作用域栈是线程本地的，守卫为 !Send，禁止跨线程移动。

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use crate::detectors::DetectorSetUtf8;
use crate::errors::SweepError;
use crate::options::ScanOptions;
use crate::prefilter::{build_prefilter_plan, PrefilterPlan};
use crate::rules::{default_rule_specs, load_rule_specs, RuleSpec};

thread_local! {
    /// 当前线程的作用域栈（LIFO）
    static ACTIVE: RefCell<Vec<Arc<Settings>>> = const { RefCell::new(Vec::new()) };
}

/// 编译完成的扫描配置
#[derive(Debug)]
pub struct Settings {
    pub(crate) options: ScanOptions,
    pub(crate) plan: Arc<PrefilterPlan>,
    pub(crate) detectors_utf8: Arc<DetectorSetUtf8>,
}

impl Settings {
    /// 内置默认规则 + 给定选项
    pub fn default_rules(options: ScanOptions) -> Result<Self> {
        Self::from_specs(default_rule_specs()?, options)
    }

    /// 从 TOML 规则文件构建
    pub fn from_rules_file(path: &Path, options: ScanOptions) -> Result<Self> {
        Self::from_specs(load_rule_specs(path)?, options)
    }

    fn from_specs(specs: Vec<RuleSpec>, options: ScanOptions) -> Result<Self> {
        // UTF-8 检测器集合在此即时编译，顺带完成全部规则的合法性校验
        let detectors_utf8 =
            Arc::new(DetectorSetUtf8::from_specs(&specs).context("compile detection rules")?);
        let plan = build_prefilter_plan(&specs)?;
        Ok(Self {
            options,
            plan,
            detectors_utf8,
        })
    }

    /// 激活为当前线程的活动配置，返回作用域守卫
    pub fn activate(self) -> SettingsGuard {
        ACTIVE.with(|stack| stack.borrow_mut().push(Arc::new(self)));
        SettingsGuard {
            _not_send: PhantomData,
        }
    }

    /// 当前线程的活动配置；没有激活的作用域则报错
    pub(crate) fn current() -> Result<Arc<Settings>> {
        ACTIVE
            .with(|stack| stack.borrow().last().cloned())
            .ok_or_else(|| SweepError::NoActiveSettings.into())
    }
}

/// 建立默认检测配置的作用域（失败当且仅当默认规则无法编译）
pub fn default_settings() -> Result<SettingsGuard> {
    Ok(Settings::default_rules(ScanOptions::default())?.activate())
}

/// 作用域守卫：Drop 时弹出本层配置，恢复上一层
pub struct SettingsGuard {
    // 裸指针 PhantomData 使守卫 !Send，与线程本地栈的生命周期绑定
    _not_send: PhantomData<*const ()>,
}

impl Drop for SettingsGuard {
    fn drop(&mut self) {
        ACTIVE.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ScanEngine;

    #[test]
    fn no_scope_means_error() {
        let err = Settings::current().unwrap_err();
        assert!(err.to_string().contains("no active settings scope"));
    }

    #[test]
    fn guard_restores_previous_scope_on_drop() {
        let outer = Settings::default_rules(ScanOptions {
            engine: ScanEngine::Bytes,
            max_file_size: None,
        })
        .unwrap();
        let _outer_guard = outer.activate();
        assert_eq!(
            Settings::current().unwrap().options.engine,
            ScanEngine::Bytes
        );

        {
            let inner = Settings::default_rules(ScanOptions {
                engine: ScanEngine::Utf8,
                max_file_size: Some(1),
            })
            .unwrap();
            let _inner_guard = inner.activate();
            assert_eq!(
                Settings::current().unwrap().options.engine,
                ScanEngine::Utf8
            );
        }

        // 内层守卫析构后回到外层配置
        assert_eq!(
            Settings::current().unwrap().options.engine,
            ScanEngine::Bytes
        );
    }

    #[test]
    fn default_settings_is_establishable() {
        let guard = default_settings().unwrap();
        assert!(Settings::current().is_ok());
        drop(guard);
        assert!(Settings::current().is_err());
    }
}
