//! 代码结构分析类型定义

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 控制流示例行的最大长度（字符数）
pub const MAX_SOURCE_LINE_CHARS: usize = 80;

/// 每个关键字保留的示例行数
pub const MAX_DETAILS_PER_KEYWORD: usize = 2;

/// 最多记录的赋值语句数量
pub const MAX_ASSIGNMENTS: usize = 5;

/// 赋值右值的最大长度（字符数）
pub const MAX_ASSIGNMENT_VALUE_CHARS: usize = 50;

/// 最多记录的调用点数量
pub const MAX_FUNCTION_CALLS: usize = 10;

/// 不会被当作函数名或调用点的关键字
pub const RESERVED_KEYWORDS: &[&str] = &[
    "if", "elif", "elseif", "else", "for", "foreach", "while", "do", "switch", "case",
    "catch", "try", "return", "function", "def", "func", "new", "typeof", "array",
    "isset", "unset", "await", "yield", "with", "not", "and", "or", "in", "select",
];

/// 支持的语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    Php,
    Go,
}

impl Language {
    /// 所有支持的语言（按固定顺序）
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::JavaScript,
        Language::Php,
        Language::Go,
    ];

    /// 规范的语言标签
    pub fn tag(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Php => "php",
            Language::Go => "go",
        }
    }

    /// 解析语言标签（大小写不敏感，支持常见别名）
    ///
    /// 未知标签返回 `None`，调用方应将其视为空分析而不是错误。
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "javascript" | "js" | "jsx" | "typescript" | "ts" => Some(Language::JavaScript),
            "php" => Some(Language::Php),
            "go" | "golang" => Some(Language::Go),
            _ => None,
        }
    }

    /// 根据文件扩展名检测语言
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.patterns().extensions.contains(&ext.as_str()))
    }
}

/// 文档检测规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStyle {
    /// 声明之后紧跟文档块（Python docstring）
    FollowingDocstring,
    /// 函数名出现之前有文档注释块（JSDoc / PHPDoc / Go 注释）
    PrecedingComment,
}

/// 单个语言的模式集合
///
/// 进程级只读，由各语言模块静态初始化。
pub struct LanguagePatternSet {
    pub language: Language,
    pub display_name: &'static str,
    pub extensions: &'static [&'static str],
    /// 函数签名，每个分支一个名称捕获组
    pub function_pattern: Regex,
    pub class_pattern: Regex,
    /// 文档块起始标记（FollowingDocstring 时锚定在声明之后，PrecedingComment 时为完整注释块）
    pub docstring_pattern: Regex,
    pub doc_style: DocStyle,
    /// 以下三个模式的捕获组即关键字
    pub loop_pattern: Regex,
    pub conditional_pattern: Regex,
    pub exception_pattern: Regex,
    /// 赋值语句：组 1 为名称，组 2 为右值
    pub assignment_pattern: Regex,
    /// 容器类型标签及其语法标记
    pub container_markers: &'static [(&'static str, &'static [&'static str])],
}

/// 提取出的函数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionRecord {
    pub name: String,
}

/// 控制流结构类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructKind {
    Loop,
    Conditional,
    Exception,
}

/// 单次控制流匹配
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlFlowFinding {
    pub construct_kind: ConstructKind,
    pub keyword: String,
    /// 所在源码行（异常类结构不记录）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
    /// 在同类结构中的序号
    pub occurrence_index: usize,
    /// 关键字的字节偏移
    pub offset: usize,
}

/// 变量、调用与数据结构概况
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureReport {
    pub assignments: Vec<String>,
    pub function_calls: BTreeSet<String>,
    pub data_structures: BTreeSet<String>,
}

impl StructureReport {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.function_calls.is_empty() && self.data_structures.is_empty()
    }
}

/// 控制流分析报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControlFlowReport {
    pub loops: BTreeSet<String>,
    pub conditionals: BTreeSet<String>,
    pub exceptions: BTreeSet<String>,
    pub loop_details: BTreeMap<String, Vec<String>>,
    pub conditional_details: BTreeMap<String, Vec<String>>,
    pub structure: StructureReport,
    pub has_control_flow: bool,
}

/// 文档覆盖率统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DocumentationCoverage {
    pub total_functions: usize,
    pub documented_functions: usize,
    #[serde(rename = "documentation_percentage")]
    pub percentage: f64,
}

/// 单个文件的分析摘要
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub language: String,
    pub display_name: String,
    pub total_lines: usize,
    pub functions: Vec<String>,
    pub functions_count: usize,
    pub classes_count: usize,
    pub documented_functions: usize,
    pub documentation_percentage: f64,
    pub control_flow: ControlFlowReport,
    pub hint: String,
}
