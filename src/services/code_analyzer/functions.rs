//! 函数提取与文档检测

use regex::Regex;
use tracing::warn;

use super::patterns::{first_capture, patterns_for};
use super::types::{DocStyle, FunctionRecord, LanguagePatternSet, RESERVED_KEYWORDS};

/// 按源码出现顺序提取函数名（不去重）
///
/// 未知语言或没有匹配时返回空列表。
pub fn extract_functions(source: &str, language: &str) -> Vec<FunctionRecord> {
    match patterns_for(language) {
        Some(patterns) => extract_with(source, patterns),
        None => Vec::new(),
    }
}

pub(super) fn extract_with(source: &str, patterns: &LanguagePatternSet) -> Vec<FunctionRecord> {
    patterns
        .function_pattern
        .captures_iter(source)
        .filter_map(|caps| first_capture(&caps))
        .map(|m| m.as_str())
        .filter(|name| !RESERVED_KEYWORDS.contains(name))
        .map(|name| FunctionRecord {
            name: name.to_string(),
        })
        .collect()
}

/// 判断函数是否已有文档
///
/// - docstring 风格（Python）：任一同名声明之后紧跟文档块起始标记。
/// - 注释块风格（JS/PHP/Go）：某个文档注释块之后的第一行非空文本中出现该函数名。
///   只看邻近关系，不校验那一行是否就是该函数的声明，调用或同名变量同样会命中。
pub fn is_documented(code: &str, function_name: &str, language: &str) -> bool {
    let Some(patterns) = patterns_for(language) else {
        return false;
    };
    if function_name.is_empty() {
        return false;
    }

    match patterns.doc_style {
        DocStyle::FollowingDocstring => patterns.function_pattern.captures_iter(code).any(|caps| {
            let (Some(whole), Some(name)) = (caps.get(0), first_capture(&caps)) else {
                return false;
            };
            name.as_str() == function_name && patterns.docstring_pattern.is_match(&code[whole.end()..])
        }),
        DocStyle::PrecedingComment => {
            let pattern = format!(
                r"(?:{})\s*(?:[^\n]*?[^\w$\n])?{}(?:[^\w$]|$)",
                patterns.docstring_pattern.as_str(),
                regex::escape(function_name)
            );
            match Regex::new(&pattern) {
                Ok(re) => re.is_match(code),
                Err(e) => {
                    warn!("构建文档检测模式失败 ({}): {}", function_name, e);
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(source: &str, language: &str) -> Vec<String> {
        extract_functions(source, language)
            .into_iter()
            .map(|f| f.name)
            .collect()
    }

    const PY_SAMPLE: &str = "def foo():\n    pass\ndef bar():\n    \"\"\"doc\"\"\"\n    pass";

    #[test]
    fn test_extract_python_in_source_order() {
        assert_eq!(names(PY_SAMPLE, "python"), vec!["foo", "bar"]);
    }

    #[test]
    fn test_extract_keeps_duplicates() {
        let code = "def a():\n    pass\n\ndef a():\n    pass\n";
        assert_eq!(names(code, "python"), vec!["a", "a"]);
    }

    #[test]
    fn test_extract_javascript_mixed_styles() {
        let code = r#"
function add(a, b) {
  return a + b;
}

const mul = (a, b) => a * b;

class Greeter {
  greet(name) {
    if (name) {
      return "hi " + name;
    }
  }
}
"#;
        assert_eq!(names(code, "javascript"), vec!["add", "mul", "greet"]);
    }

    #[test]
    fn test_extract_php_and_go() {
        let php = "<?php\nfunction updateUserRecords($userIds, $updates) {\n}\nclass A {\n  public function save() {}\n}\n";
        assert_eq!(names(php, "php"), vec!["updateUserRecords", "save"]);

        let go = "package main\n\nfunc add(a int, b int) int {\n\treturn a + b\n}\n\nfunc (p Person) Introduce() string {\n\treturn \"\"\n}\n\nfunc main() {\n}\n";
        assert_eq!(names(go, "go"), vec!["add", "Introduce", "main"]);
    }

    #[test]
    fn test_extract_unknown_language_is_empty() {
        assert!(extract_functions("def foo():\n    pass", "ruby").is_empty());
        assert!(extract_functions("", "python").is_empty());
    }

    #[test]
    fn test_python_docstring_detection() {
        assert!(!is_documented(PY_SAMPLE, "foo", "python"));
        assert!(is_documented(PY_SAMPLE, "bar", "python"));
        assert!(!is_documented(PY_SAMPLE, "missing", "python"));
    }

    #[test]
    fn test_python_single_quote_docstring() {
        let code = "def baz(x):\n    '''Returns x.'''\n    return x\n";
        assert!(is_documented(code, "baz", "python"));
    }

    #[test]
    fn test_jsdoc_detection() {
        let code = "/**\n * Adds two numbers.\n */\nfunction add(a, b) {\n  return a + b;\n}\n\nfunction sub(a, b) {\n  return a - b;\n}\n";
        assert!(is_documented(code, "add", "javascript"));
        assert!(!is_documented(code, "sub", "javascript"));
        // 前缀相同的名字不应命中
        assert!(!is_documented(code, "ad", "javascript"));
    }

    #[test]
    fn test_doc_comment_check_is_proximity_based() {
        // 注释块之后一行只是调用 helper，也会被视为已文档化
        let code = "function run() {\n  /** note */\n  helper();\n}\nfunction helper() {}\n";
        assert!(is_documented(code, "helper", "javascript"));
    }

    #[test]
    fn test_phpdoc_and_go_comments() {
        let php = "<?php\n/**\n * Finds a user.\n */\npublic function findUser($id) {}\n";
        assert!(is_documented(php, "findUser", "php"));

        let go = "// add returns the sum.\n// It never fails.\nfunc add(a, b int) int {\n\treturn a + b\n}\n\nfunc sub(a, b int) int {\n\treturn a - b\n}\n";
        assert!(is_documented(go, "add", "go"));
        assert!(!is_documented(go, "sub", "go"));
    }

    #[test]
    fn test_is_documented_unknown_language() {
        assert!(!is_documented(PY_SAMPLE, "bar", "ruby"));
    }
}
