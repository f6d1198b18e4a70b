//! 内容提供方契约
//!
//! 编排层只通过这个 trait 访问生成服务，不关心提示词和传输细节

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::models::{Artifact, ArtifactRequest, GradeResult, Question, StudyLevel};

/// 主生成请求
#[derive(Debug, Clone)]
pub struct PrimaryRequest {
    pub request: ArtifactRequest,
    pub source_text: String,
    pub level: StudyLevel,
}

/// 批改请求
///
/// `answers` 是稀疏的：未作答的题目不出现在映射中
#[derive(Debug, Clone)]
pub struct GradingRequest {
    pub source_text: String,
    pub questions: Vec<Question>,
    pub answers: BTreeMap<String, String>,
    pub level: StudyLevel,
}

/// 内容提供方
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// 生成一种学习材料；任何无法完整解析的返回都视为失败
    async fn generate_primary(&self, request: &PrimaryRequest) -> ProviderResult<Artifact>;

    /// 为一个章节生成插图
    ///
    /// `Ok(None)` 表示没有插图，和失败不同
    async fn generate_illustration(&self, prompt: &str) -> ProviderResult<Option<String>>;

    /// 批改测验
    async fn grade_test(&self, request: &GradingRequest) -> ProviderResult<GradeResult>;
}
