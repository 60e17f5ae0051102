//! 控制流分析
//!
//! 扫描循环、条件与异常处理关键字，记录所在源码行并按关键字分组。

use regex::Regex;

use super::patterns::{first_capture, patterns_for};
use super::structure::extract_structure;
use super::types::{
    ConstructKind, ControlFlowFinding, ControlFlowReport, LanguagePatternSet, MAX_DETAILS_PER_KEYWORD,
    MAX_SOURCE_LINE_CHARS,
};

/// 按出现顺序列出所有控制流匹配
pub fn scan_constructs(source: &str, language: &str) -> Vec<ControlFlowFinding> {
    let Some(patterns) = patterns_for(language) else {
        return Vec::new();
    };

    let mut findings = Vec::new();
    for kind in [ConstructKind::Loop, ConstructKind::Conditional, ConstructKind::Exception] {
        findings.extend(scan_kind(source, kind, pattern_of(patterns, kind)));
    }
    findings
}

/// 分析控制流并附带结构信息
///
/// 未知语言返回全空报告，`has_control_flow` 为 false。
pub fn analyze_control_flow(source: &str, language: &str) -> ControlFlowReport {
    if patterns_for(language).is_none() {
        return ControlFlowReport::default();
    }

    let findings = scan_constructs(source, language);
    let mut report = ControlFlowReport {
        has_control_flow: !findings.is_empty(),
        structure: extract_structure(source, language),
        ..Default::default()
    };

    for finding in findings {
        let (keywords, details) = match finding.construct_kind {
            ConstructKind::Loop => (&mut report.loops, Some(&mut report.loop_details)),
            ConstructKind::Conditional => (&mut report.conditionals, Some(&mut report.conditional_details)),
            ConstructKind::Exception => (&mut report.exceptions, None),
        };
        keywords.insert(finding.keyword.clone());

        if let (Some(details), Some(line)) = (details, finding.source_line) {
            let lines = details.entry(finding.keyword).or_default();
            if lines.len() < MAX_DETAILS_PER_KEYWORD {
                lines.push(line);
            }
        }
    }

    report
}

fn pattern_of(patterns: &LanguagePatternSet, kind: ConstructKind) -> &Regex {
    match kind {
        ConstructKind::Loop => &patterns.loop_pattern,
        ConstructKind::Conditional => &patterns.conditional_pattern,
        ConstructKind::Exception => &patterns.exception_pattern,
    }
}

fn scan_kind(source: &str, kind: ConstructKind, pattern: &Regex) -> Vec<ControlFlowFinding> {
    pattern
        .captures_iter(source)
        .filter_map(|caps| first_capture(&caps))
        .enumerate()
        .map(|(index, keyword)| {
            // 异常只记录关键字
            let source_line = match kind {
                ConstructKind::Exception => None,
                _ => Some(truncate_chars(line_around(source, keyword.start()).trim(), MAX_SOURCE_LINE_CHARS)),
            };
            ControlFlowFinding {
                construct_kind: kind,
                keyword: keyword.as_str().to_string(),
                source_line,
                occurrence_index: index,
                offset: keyword.start(),
            }
        })
        .collect()
}

/// 偏移所在的整行（不含换行符），文本首尾没有换行时以文本边界为界
fn line_around(source: &str, offset: usize) -> &str {
    let start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = source[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(source.len());
    &source[start..end]
}

/// 按字符截断，避免切断 UTF-8 字符
pub(super) fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
