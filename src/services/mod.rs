//! 服务层模块

pub mod code_analyzer;
pub mod doc_generator;
