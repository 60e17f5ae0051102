//! PHP 语言模式

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{DocStyle, Language, LanguagePatternSet};

pub(super) static PATTERNS: Lazy<LanguagePatternSet> = Lazy::new(|| LanguagePatternSet {
    language: Language::Php,
    display_name: "PHP",
    extensions: &["php", "phtml"],
    function_pattern: Regex::new(r"\bfunction\s+&?\s*([A-Za-z_]\w*)\s*\(").unwrap(),
    class_pattern: Regex::new(r"\b(?:class|trait|interface)\s+([A-Za-z_]\w*)").unwrap(),
    docstring_pattern: Regex::new(r"/\*\*(?:[^*]|\*+[^*/])*\*+/").unwrap(),
    doc_style: DocStyle::PrecedingComment,
    loop_pattern: Regex::new(r"\b(for|foreach|while)\s*\(|\b(do)\s*\{").unwrap(),
    conditional_pattern: Regex::new(r"\b(if|elseif|switch|match)\s*\(|\b(else)\b").unwrap(),
    exception_pattern: Regex::new(r"\b(try)\s*\{|\b(catch)\s*\(|\b(finally)\s*\{|\b(throw)\b").unwrap(),
    // 排除 ==、=== 与 =>
    assignment_pattern: Regex::new(r"(\$[A-Za-z_]\w*)\s*=\s*([^=>\s;][^;\n]*)").unwrap(),
    container_markers: &[("array", &["array(", "["]), ("object", &["new stdClass", "->"])],
});
