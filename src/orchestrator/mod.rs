//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责单个学习会话的调度，是整个系统的"指挥中心"。
//!
//! ### `study_session` - 学习会话
//! - 持有文档文本、年级和材料存储
//! - 每次生成只发起一次主调用，记录当前激活的材料
//! - 摘要存入后派生插图任务（Semaphore 限制并发），不等待它们结束
//! - 驱动测验的作答、提交、批改和重做
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::StudySession
//!     ↓
//! workflow::TestSession / store::ArtifactStore
//!     ↓
//! services::ContentProvider (LLM / 脚本)
//! ```

pub mod study_session;

// 重新导出主要类型
pub use study_session::{StudySession, StudySnapshot};
