//! LLM Prompt 模板
//!
//! 按语言选择文档风格说明，再拼接源码和控制流提示。

use crate::services::code_analyzer::types::Language;

/// 系统消息
const SYSTEM_PROMPT: &str = "You are an expert {language_name} developer and technical writer. \
You add documentation to source code without changing its behavior, and you reply with code only.";

/// 首次生成 Prompt
const GENERATION_PROMPT: &str = r#"You are an expert {language_name} developer. Your task is to document the following code by adding {doc_format} to every function that does not have documentation yet.

IMPORTANT:
- Keep ALL of the original code exactly as it is
- Only add documentation where it is missing
- {style_rule}
- Do not modify the functional code
- Return ONLY the complete code with the documentation added
"#;

/// 重新生成 Prompt
const REGENERATION_PROMPT: &str = r#"You are an expert {language_name} developer. Generate a NEW version of the documentation for the following code.

IMPORTANT:
- Keep ALL of the original code exactly as it is
- Only add or modify {doc_format}
- {style_rule}
- Be more detailed and clearer than the previous version
- Do not modify the functional code
- Return ONLY the complete code with the documentation
"#;

/// 各语言的文档风格
struct DocTemplate {
    language_name: &'static str,
    doc_format: &'static str,
    style_rule: &'static str,
    fence: &'static str,
}

fn template_for(language: Option<Language>) -> DocTemplate {
    match language {
        Some(Language::Python) => DocTemplate {
            language_name: "Python",
            doc_format: "docstrings in standard Python format (Google style)",
            style_rule: "Use Google-style docstrings directly below the def line, with Args, Returns and Raises sections where they apply",
            fence: "python",
        },
        Some(Language::JavaScript) => DocTemplate {
            language_name: "JavaScript",
            doc_format: "JSDoc comments (/** ... */)",
            style_rule: "Place each JSDoc block directly above its function and use @param, @returns and @throws tags",
            fence: "javascript",
        },
        Some(Language::Php) => DocTemplate {
            language_name: "PHP",
            doc_format: "PHPDoc blocks (/** ... */)",
            style_rule: "Place each PHPDoc block directly above its function and use @param, @return and @throws tags",
            fence: "php",
        },
        Some(Language::Go) => DocTemplate {
            language_name: "Go",
            doc_format: "Go doc comments (// lines)",
            style_rule: "Place each doc comment directly above its func declaration and start it with the function name",
            fence: "go",
        },
        None => DocTemplate {
            language_name: "software",
            doc_format: "documentation comments",
            style_rule: "Follow the documentation conventions of the language the code is written in",
            fence: "",
        },
    }
}

fn fill(template: &str, doc: &DocTemplate) -> String {
    template
        .replace("{language_name}", doc.language_name)
        .replace("{doc_format}", doc.doc_format)
        .replace("{style_rule}", doc.style_rule)
}

/// 拼接源码块和提示；源码最后插入，避免其中的占位符被替换
fn append_code(mut prompt: String, doc: &DocTemplate, code: &str, hint: &str) -> String {
    prompt.push_str("\nCode to document:\n```");
    prompt.push_str(doc.fence);
    prompt.push('\n');
    prompt.push_str(code);
    if !code.ends_with('\n') {
        prompt.push('\n');
    }
    prompt.push_str("```\n");

    if !hint.is_empty() {
        prompt.push('\n');
        prompt.push_str(hint);
        if !hint.ends_with('\n') {
            prompt.push('\n');
        }
    }

    prompt.push_str("\nDocumented code:\n");
    prompt
}

/// 系统消息
pub fn system_prompt(language: Option<Language>) -> String {
    fill(SYSTEM_PROMPT, &template_for(language))
}

/// 首次生成的用户消息
pub fn build_generation_prompt(code: &str, language: Option<Language>, hint: &str) -> String {
    let doc = template_for(language);
    append_code(fill(GENERATION_PROMPT, &doc), &doc, code, hint)
}

/// 重新生成的用户消息，反馈为空白时省略
pub fn build_regeneration_prompt(
    code: &str,
    language: Option<Language>,
    hint: &str,
    feedback: Option<&str>,
) -> String {
    let doc = template_for(language);
    let mut prompt = fill(REGENERATION_PROMPT, &doc);

    if let Some(feedback) = feedback.map(str::trim).filter(|f| !f.is_empty()) {
        prompt.push_str("\nUser feedback: ");
        prompt.push_str(feedback);
        prompt.push('\n');
    }

    append_code(prompt, &doc, code, hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_prompt_per_language() {
        let prompt = build_generation_prompt("def f():\n    pass", Some(Language::Python), "");
        assert!(prompt.contains("Google style"));
        assert!(prompt.contains("```python\ndef f():\n    pass\n```"));
        assert!(prompt.ends_with("Documented code:\n"));

        let prompt = build_generation_prompt("func F() {}", Some(Language::Go), "");
        assert!(prompt.contains("Go doc comments"));
        assert!(prompt.contains("```go\n"));
    }

    #[test]
    fn test_unknown_language_uses_generic_template() {
        let prompt = build_generation_prompt("puts 1", None, "");
        assert!(prompt.contains("documentation conventions of the language"));
        assert!(prompt.contains("```\nputs 1\n```"));
    }

    #[test]
    fn test_hint_only_when_present() {
        let hint = "DETECTED CONTROL FLOW (document these explicitly):\nLoops:\n- `for`";
        let with_hint = build_generation_prompt("x", Some(Language::Python), hint);
        assert!(with_hint.contains("DETECTED CONTROL FLOW"));
        let code_end = with_hint.find("```\n\nDETECTED").unwrap();
        assert!(code_end > 0);

        let without = build_generation_prompt("x", Some(Language::Python), "");
        assert!(!without.contains("DETECTED"));
        assert!(without.contains("```\n\nDocumented code:\n"));
    }

    #[test]
    fn test_placeholders_in_code_are_kept() {
        let code = "fmt.Println(\"{style_rule}\")";
        let prompt = build_generation_prompt(code, Some(Language::Go), "");
        assert!(prompt.contains(code));
    }

    #[test]
    fn test_regeneration_prompt_with_feedback() {
        let prompt = build_regeneration_prompt("x = 1", Some(Language::Python), "", Some("  mention units  "));
        assert!(prompt.contains("NEW version"));
        assert!(prompt.contains("more detailed"));
        assert!(prompt.contains("User feedback: mention units\n"));

        let prompt = build_regeneration_prompt("x = 1", Some(Language::Python), "", Some("   "));
        assert!(!prompt.contains("User feedback"));
    }

    #[test]
    fn test_system_prompt_names_language() {
        assert!(system_prompt(Some(Language::Php)).starts_with("You are an expert PHP developer"));
    }
}
