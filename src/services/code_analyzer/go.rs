//! Go 语言模式

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{DocStyle, Language, LanguagePatternSet};

pub(super) static PATTERNS: Lazy<LanguagePatternSet> = Lazy::new(|| LanguagePatternSet {
    language: Language::Go,
    display_name: "Go",
    extensions: &["go"],
    // 可选的方法接收者与类型参数
    function_pattern: Regex::new(r"(?m)^func\s+(?:\([^)]*\)\s*)?(\w+)\s*(?:\[[^\]]*\]\s*)?\(").unwrap(),
    class_pattern: Regex::new(r"(?m)^type\s+(\w+)\s+(?:struct|interface)\b").unwrap(),
    docstring_pattern: Regex::new(r"(?m)(?:^[ \t]*//[^\n]*\n)+").unwrap(),
    doc_style: DocStyle::PrecedingComment,
    loop_pattern: Regex::new(r"\b(for)\b").unwrap(),
    conditional_pattern: Regex::new(r"\b(if|else|switch|select)\b").unwrap(),
    exception_pattern: Regex::new(r"\b(defer)\b|\b(panic|recover)\s*\(").unwrap(),
    assignment_pattern: Regex::new(r"\b([A-Za-z_]\w*)\s*:=\s*([^\n]+)").unwrap(),
    container_markers: &[("map", &["map["]), ("slice", &["[]"]), ("struct", &["struct{", "struct {"])],
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_pattern_with_receiver() {
        let code = "func (p Person) Introduce() string {\n";
        let caps = PATTERNS.function_pattern.captures(code).unwrap();
        assert_eq!(&caps[1], "Introduce");

        let code = "func Map[T any](xs []T) []T {\n";
        let caps = PATTERNS.function_pattern.captures(code).unwrap();
        assert_eq!(&caps[1], "Map");
    }

    #[test]
    fn test_short_declaration() {
        let caps = PATTERNS.assignment_pattern.captures("\tresult := add(5, 3)").unwrap();
        assert_eq!(&caps[1], "result");
        assert_eq!(&caps[2], "add(5, 3)");
    }
}
