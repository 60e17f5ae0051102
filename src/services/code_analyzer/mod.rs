//! 代码结构分析器主模块
//!
//! 基于正则的启发式分析：提取函数签名、检测已有文档、识别控制流结构，
//! 并推断简单的数据流信息。结果用于构建 Prompt 和统计文档覆盖率。
//!
//! 这里不是真正的解析器，不构建语法树，也不处理作用域。

mod control_flow;
mod coverage;
mod functions;
mod go;
mod hint;
mod javascript;
mod patterns;
mod php;
mod python;
mod structure;
pub mod types;

pub use control_flow::{analyze_control_flow, scan_constructs};
pub use coverage::{percentage, score};
pub use functions::{extract_functions, is_documented};
pub use hint::compose_hint;
pub use patterns::patterns_for;
pub use structure::extract_structure;

use types::{AnalysisSummary, Language, LanguagePatternSet};

/// 单次请求的代码分析器
pub struct CodeAnalyzer<'a> {
    source: &'a str,
    patterns: Option<&'static LanguagePatternSet>,
}

impl<'a> CodeAnalyzer<'a> {
    /// 创建分析器，未知语言同样可用，只是所有结果为空
    pub fn new(source: &'a str, language: Option<Language>) -> Self {
        Self {
            source,
            patterns: language.map(Language::patterns),
        }
    }

    /// 规范语言标签，未知语言为 "unknown"
    pub fn language_tag(&self) -> &'static str {
        self.patterns.map_or("unknown", |p| p.language.tag())
    }

    /// 生成分析摘要
    pub fn summarize(&self) -> AnalysisSummary {
        let tag = self.language_tag();
        let functions: Vec<String> = extract_functions(self.source, tag)
            .into_iter()
            .map(|f| f.name)
            .collect();
        let classes_count = self
            .patterns
            .map_or(0, |p| p.class_pattern.find_iter(self.source).count());
        let coverage = score(self.source, self.source, tag);
        let control_flow = analyze_control_flow(self.source, tag);
        let hint = compose_hint(&control_flow);

        AnalysisSummary {
            language: tag.to_string(),
            display_name: self.patterns.map_or("Unknown", |p| p.display_name).to_string(),
            total_lines: self.source.lines().count(),
            functions_count: functions.len(),
            functions,
            classes_count,
            documented_functions: coverage.documented_functions,
            documentation_percentage: coverage.percentage,
            control_flow,
            hint,
        }
    }
}

/// 解析请求中的语言：显式标签优先，其次按文件名扩展名
pub fn resolve_language(language: Option<&str>, filename: Option<&str>) -> Option<Language> {
    language
        .and_then(Language::from_tag)
        .or_else(|| filename.and_then(Language::from_filename))
}
