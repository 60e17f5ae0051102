//! 轻量数据流提取：赋值、调用点、容器类型

use once_cell::sync::Lazy;
use regex::Regex;

use super::control_flow::truncate_chars;
use super::patterns::patterns_for;
use super::types::{
    StructureReport, MAX_ASSIGNMENTS, MAX_ASSIGNMENT_VALUE_CHARS, MAX_FUNCTION_CALLS, RESERVED_KEYWORDS,
};

// 跨语言通用：标识符后紧跟左括号，可带成员访问点
static RE_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.?\b([A-Za-z_]\w*)\s*\(").unwrap());

/// 提取结构信息，未知语言返回空报告
pub fn extract_structure(source: &str, language: &str) -> StructureReport {
    let Some(patterns) = patterns_for(language) else {
        return StructureReport::default();
    };

    let assignments = patterns
        .assignment_pattern
        .captures_iter(source)
        .take(MAX_ASSIGNMENTS)
        .map(|caps| {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let value = caps.get(2).map_or("", |m| m.as_str().trim());
            format!("{}={}", name, truncate_chars(value, MAX_ASSIGNMENT_VALUE_CHARS))
        })
        .collect();

    let mut report = StructureReport {
        assignments,
        ..Default::default()
    };

    for caps in RE_CALL.captures_iter(source) {
        if report.function_calls.len() >= MAX_FUNCTION_CALLS {
            break;
        }
        let name = &caps[1];
        if !RESERVED_KEYWORDS.contains(&name) {
            report.function_calls.insert(name.to_string());
        }
    }

    for (label, markers) in patterns.container_markers {
        if markers.iter().any(|marker| source.contains(marker)) {
            report.data_structures.insert(label.to_string());
        }
    }

    report
}
