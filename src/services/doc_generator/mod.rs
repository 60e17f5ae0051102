//! 文档生成器模块
//!
//! 把代码分析结果拼进 Prompt，调用本地 LLM 补充文档，
//! 再用同一套分析器统计生成结果的文档覆盖率。
//!
//! # 使用示例
//!
//! ```ignore
//! let generator = DocumentationGenerator::from_config(&config, logger)?;
//! let request = DocumentationRequest { code, language: Some(Language::Python), filename: None };
//! match generator.generate(&request).await {
//!     GenerationOutcome::Success(doc) => println!("{}", doc.documented_code),
//!     GenerationOutcome::Failure(failure) => eprintln!("{}", failure.message),
//! }
//! ```

mod generator;
pub mod prompts;
pub mod types;

pub use generator::{strip_code_fences, DocumentationGenerator, DocumentationRequest};
pub use types::{
    FailureReason, GeneratedDocumentation, GenerationFailure, GenerationMode, GenerationOutcome,
};
