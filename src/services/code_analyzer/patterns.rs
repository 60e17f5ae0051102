//! 语言模式表
//!
//! 每种语言一个静态条目，新增语言只需新增一个模块并在此登记。

use regex::{Captures, Match};

use super::types::{Language, LanguagePatternSet};
use super::{go, javascript, php, python};

impl Language {
    /// 该语言的模式集合
    pub fn patterns(self) -> &'static LanguagePatternSet {
        match self {
            Language::Python => &python::PATTERNS,
            Language::JavaScript => &javascript::PATTERNS,
            Language::Php => &php::PATTERNS,
            Language::Go => &go::PATTERNS,
        }
    }
}

/// 按语言标签查找模式集合，未知语言返回 `None`
pub fn patterns_for(language: &str) -> Option<&'static LanguagePatternSet> {
    Language::from_tag(language).map(Language::patterns)
}

/// 多分支模式中第一个非空的捕获组
pub(super) fn first_capture<'t>(caps: &Captures<'t>) -> Option<Match<'t>> {
    caps.iter().skip(1).flatten().find(|m| !m.as_str().is_empty())
}
