//! 业务能力层
//!
//! - `ContentProvider`：编排层唯一依赖的内容生成契约
//! - `LlmService`：OpenAI 兼容接口的传输封装
//! - `LlmContentProvider`：基于 LLM 的 `ContentProvider` 实现
//! - `ScriptedProvider`：按脚本返回结果的实现，用于测试和离线演示

pub mod content_provider;
pub mod llm_provider;
pub mod llm_service;
pub mod mock_provider;
pub mod prompts;
pub mod response_parser;

pub use content_provider::{ContentProvider, GradingRequest, PrimaryRequest};
pub use llm_provider::LlmContentProvider;
pub use llm_service::LlmService;
pub use mock_provider::{IllustrationScript, ScriptedProvider};
