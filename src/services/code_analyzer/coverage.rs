//! 文档覆盖率统计

use super::functions::{extract_functions, is_documented};
use super::types::DocumentationCoverage;

/// 计算生成前后的文档覆盖率
///
/// 分母取自原始代码中的函数（重名按出现次数计），分子在生成后的代码上逐个检测。
pub fn score(original_source: &str, documented_source: &str, language: &str) -> DocumentationCoverage {
    let functions = extract_functions(original_source, language);
    let total_functions = functions.len();
    let documented_functions = functions
        .iter()
        .filter(|f| is_documented(documented_source, &f.name, language))
        .count();

    DocumentationCoverage {
        total_functions,
        documented_functions,
        percentage: percentage(documented_functions, total_functions),
    }
}

/// 百分比保留一位小数（恰好一半时取偶），总数为 0 时为 0
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = part as f64 / total as f64 * 100.0;
    (raw * 10.0).round_ties_even() / 10.0
}
