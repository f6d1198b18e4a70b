//! 流程层（Workflow）
//!
//! 定义"一次测验"的完整处理流程：作答 → 提交 → 批改 → 重做。
//! 只维护状态，不调用内容提供方；调用由编排层负责。

pub mod test_session;

pub use test_session::{SubmitTicket, TestSession};
