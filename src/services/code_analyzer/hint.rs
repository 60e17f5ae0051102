//! 控制流提示文本
//!
//! 把分析报告整理成追加到 Prompt 末尾的说明，顺序固定为：循环、条件、异常、数据结构。

use std::collections::{BTreeMap, BTreeSet};

use super::types::{ControlFlowReport, StructureReport};

const HINT_HEADER: &str = "DETECTED CONTROL FLOW (document these explicitly):";
const LOOP_INSTRUCTION: &str =
    "For each loop, explain what it iterates over, what it accumulates and when it stops.";
const CONDITIONAL_INSTRUCTION: &str =
    "For each conditional, describe the condition being tested and what each branch does.";
const EXCEPTION_INSTRUCTION: &str =
    "Document which errors can be raised or handled, and how the code recovers from them.";
const STRUCTURE_INSTRUCTION: &str =
    "Mention the key variables, the calls they depend on and the data structures involved.";

/// 组合提示文本；没有控制流时返回空字符串
pub fn compose_hint(report: &ControlFlowReport) -> String {
    if !report.has_control_flow {
        return String::new();
    }

    let mut sections = vec![HINT_HEADER.to_string()];

    if !report.loops.is_empty() {
        sections.push(keyword_section("Loops", &report.loops, &report.loop_details, LOOP_INSTRUCTION));
    }
    if !report.conditionals.is_empty() {
        sections.push(keyword_section(
            "Conditionals",
            &report.conditionals,
            &report.conditional_details,
            CONDITIONAL_INSTRUCTION,
        ));
    }
    if !report.exceptions.is_empty() {
        let keywords: Vec<&str> = report.exceptions.iter().map(String::as_str).collect();
        sections.push(format!(
            "Exception handling:\n- {}\n{}",
            keywords.join(", "),
            EXCEPTION_INSTRUCTION
        ));
    }
    if !report.structure.is_empty() {
        sections.push(structure_section(&report.structure));
    }

    sections.join("\n\n")
}

fn keyword_section(
    title: &str,
    keywords: &BTreeSet<String>,
    details: &BTreeMap<String, Vec<String>>,
    instruction: &str,
) -> String {
    let mut out = format!("{}:\n", title);
    for keyword in keywords {
        out.push_str(&format!("- `{}`", keyword));
        if let Some(lines) = details.get(keyword) {
            let examples: Vec<String> = lines.iter().take(2).map(|l| format!("`{}`", l)).collect();
            if !examples.is_empty() {
                out.push_str(&format!(" e.g. {}", examples.join(", ")));
            }
        }
        out.push('\n');
    }
    out.push_str(instruction);
    out
}

fn structure_section(structure: &StructureReport) -> String {
    let mut out = String::from("Data flow:\n");
    if !structure.assignments.is_empty() {
        out.push_str(&format!("- Assignments: {}\n", structure.assignments.join("; ")));
    }
    if !structure.function_calls.is_empty() {
        let calls: Vec<&str> = structure.function_calls.iter().map(String::as_str).collect();
        out.push_str(&format!("- Calls: {}\n", calls.join(", ")));
    }
    if !structure.data_structures.is_empty() {
        let kinds: Vec<&str> = structure.data_structures.iter().map(String::as_str).collect();
        out.push_str(&format!("- Data structures: {}\n", kinds.join(", ")));
    }
    out.push_str(STRUCTURE_INSTRUCTION);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::code_analyzer::analyze_control_flow;

    #[test]
    fn test_empty_hint_without_control_flow() {
        for language in ["python", "javascript", "php", "go", "ruby"] {
            let report = analyze_control_flow("x = 1", language);
            assert_eq!(compose_hint(&report), "");
        }
        assert_eq!(compose_hint(&ControlFlowReport::default()), "");
    }

    #[test]
    fn test_section_order() {
        let code = "try:\n    for x in xs:\n        if x:\n            total = x\nexcept KeyError:\n    pass\n";
        let hint = compose_hint(&analyze_control_flow(code, "python"));
        let loops = hint.find("Loops:").unwrap();
        let conds = hint.find("Conditionals:").unwrap();
        let excs = hint.find("Exception handling:").unwrap();
        let data = hint.find("Data flow:").unwrap();
        assert!(hint.starts_with(HINT_HEADER));
        assert!(loops < conds && conds < excs && excs < data);
        assert!(hint.contains("`for` e.g. `for x in xs:`"));
        assert!(hint.contains("except, try"));
        assert!(hint.contains("total=x"));
    }

    #[test]
    fn test_sections_only_for_non_empty_categories() {
        let hint = compose_hint(&analyze_control_flow("while running:\n    pass\n", "python"));
        assert!(hint.contains("Loops:"));
        assert!(hint.contains(LOOP_INSTRUCTION));
        assert!(!hint.contains("Conditionals:"));
        assert!(!hint.contains("Exception handling:"));
        assert!(!hint.contains("Data flow:"));
    }
}
