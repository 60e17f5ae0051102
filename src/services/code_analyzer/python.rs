//! Python 语言模式

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{DocStyle, Language, LanguagePatternSet};

pub(super) static PATTERNS: Lazy<LanguagePatternSet> = Lazy::new(|| LanguagePatternSet {
    language: Language::Python,
    display_name: "Python",
    extensions: &["py", "pyw"],
    function_pattern: Regex::new(r"\bdef\s+(\w+)\s*\([^)]*\)\s*(?:->\s*[^:\n]+)?:").unwrap(),
    class_pattern: Regex::new(r"(?m)^[ \t]*class\s+(\w+)").unwrap(),
    // 只匹配文本开头：检查器把声明之后的剩余文本交给它
    docstring_pattern: Regex::new(r#"^\s*[rRuUbB]?(?:"""|''')"#).unwrap(),
    doc_style: DocStyle::FollowingDocstring,
    loop_pattern: Regex::new(r"(?m)^[ \t]*(?:async[ \t]+)?(for|while)\b").unwrap(),
    conditional_pattern: Regex::new(r"(?m)^[ \t]*(if|elif|else)\b").unwrap(),
    exception_pattern: Regex::new(r"(?m)^[ \t]*(try|except|finally|raise)\b").unwrap(),
    assignment_pattern: Regex::new(r"(?m)^[ \t]*([A-Za-z_]\w*)[ \t]*=[ \t]*([^=\s][^\n]*)").unwrap(),
    container_markers: &[("list", &["["]), ("dict", &["{"]), ("tuple", &["tuple("]), ("set", &["set("])],
});
