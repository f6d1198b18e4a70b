//! # Study Artifacts
//!
//! 根据一份学习文档生成摘要（含插图）、术语表、抽认卡、思维导图和测验，
//! 并管理测验的作答、批改和重做
//!
//! ## 架构设计
//!
//! ### ① 数据模型（Models）
//! - `models/` - 学习材料、年级、测验题目与批改结果
//!
//! ### ② 能力层（Services）
//! - `services/` - 描述"我能生成什么"
//! - `ContentProvider` - 内容提供方契约
//! - `LlmContentProvider` - 基于 OpenAI 兼容接口的实现
//! - `ScriptedProvider` - 按脚本返回结果，用于测试
//!
//! ### ③ 存储与流程层（Store / Workflow）
//! - `store/` - 每种材料一个槽位，外加按章节的插图状态
//! - `workflow/` - 单次测验的状态机（作答 → 提交 → 批改 → 重做）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - `StudySession`，负责主生成、插图扇出和测验调度
//! - `app` - 命令行驱动，生成全部材料并输出 JSON
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult, ProviderError, SessionError};
pub use models::{Artifact, ArtifactKind, ArtifactRequest, StudyLevel, TestPhase, TestType};
pub use orchestrator::{StudySession, StudySnapshot};
pub use services::{ContentProvider, LlmContentProvider, ScriptedProvider};
pub use store::{ArtifactView, IllustrationStatus};
pub use workflow::TestSession;
