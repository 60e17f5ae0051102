//! JavaScript / TypeScript 语言模式

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{DocStyle, Language, LanguagePatternSet};

// 三种声明形式：function 声明、变量赋值的函数/箭头函数、类方法
const FUNCTION_PATTERN: &str = concat!(
    r"\bfunction\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(",
    r"|\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)",
    r"|(?m:^[ \t]*(?:static[ \t]+)?(?:async[ \t]+)?([A-Za-z_$][\w$]*)[ \t]*\([^)]*\)[ \t]*\{)",
);

pub(super) static PATTERNS: Lazy<LanguagePatternSet> = Lazy::new(|| LanguagePatternSet {
    language: Language::JavaScript,
    display_name: "JavaScript",
    extensions: &["js", "jsx", "mjs", "cjs", "ts", "tsx"],
    function_pattern: Regex::new(FUNCTION_PATTERN).unwrap(),
    class_pattern: Regex::new(r"\bclass\s+([A-Za-z_$][\w$]*)").unwrap(),
    docstring_pattern: Regex::new(r"/\*\*(?:[^*]|\*+[^*/])*\*+/").unwrap(),
    doc_style: DocStyle::PrecedingComment,
    loop_pattern: Regex::new(r"\b(for|while)\s*\(|\.(forEach)\s*\(|\b(do)\s*\{").unwrap(),
    conditional_pattern: Regex::new(r"\b(if|switch)\s*\(|\b(else)\b").unwrap(),
    exception_pattern: Regex::new(r"\b(try)\s*\{|\b(catch)\s*[({]|\b(finally)\s*\{|\b(throw)\b").unwrap(),
    assignment_pattern: Regex::new(r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*([^;\n]+)").unwrap(),
    container_markers: &[
        ("array", &["["]),
        ("object", &["{"]),
        ("Map", &["new Map"]),
        ("Set", &["new Set"]),
    ],
});
