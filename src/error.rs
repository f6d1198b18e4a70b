//! 错误类型
//!
//! 分层组织：
//! - `ProviderError`：内容提供方（LLM）调用或解析失败
//! - `SessionError`：测验状态机拒绝的操作
//! - `ConfigError`：配置加载失败
//! - `AppError`：编排层对外暴露的统一错误
//!
//! `IllustrationError` 只在单个插图任务内部使用，不会向调用方传播。

use std::time::Duration;

use thiserror::Error;

use crate::models::{ArtifactKind, TestPhase};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 尚未加载文档（或文档内容为空）
    #[error("请先上传文档")]
    NoDocument,

    /// 主生成调用失败，对应类型的已有数据保持不变
    #[error("生成 {kind} 失败: {source}")]
    GenerationFailed {
        kind: ArtifactKind,
        #[source]
        source: ProviderError,
    },

    /// 批改失败，作答内容保留
    #[error("批改测验失败: {source}")]
    GradingFailed {
        #[source]
        source: ProviderError,
    },

    /// 生成过程中文档被替换，结果已丢弃
    #[error("生成 {kind} 期间文档已更换，结果已丢弃")]
    DocumentChanged { kind: ArtifactKind },

    /// 测验状态机错误
    #[error(transparent)]
    Session(#[from] SessionError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 文件读写错误
    #[error("文件错误 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 内容提供方错误
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 请求发送失败
    #[error("请求失败 (模型: {model}): {message}")]
    Request { model: String, message: String },

    /// 返回内容为空
    #[error("返回内容为空 (模型: {model})")]
    EmptyResponse { model: String },

    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// 结构合法但内容不符合约定
    #[error("返回内容不合法: {0}")]
    Malformed(String),

    /// 调用超时
    #[error("调用超时 ({}秒)", .0.as_secs())]
    Timeout(Duration),

    /// 批改结果与题目集合不一致
    #[error("批改结果不完整: 缺少 {missing:?}, 多余 {unexpected:?}, 重复 {duplicated:?}")]
    IncompleteGrading {
        missing: Vec<String>,
        unexpected: Vec<String>,
        duplicated: Vec<String>,
    },
}

impl ProviderError {
    /// 创建请求失败错误
    pub fn request(model: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ProviderError::Request {
            model: model.into(),
            message: err.to_string(),
        }
    }

    /// 创建内容不合法错误
    pub fn malformed(reason: impl Into<String>) -> Self {
        ProviderError::Malformed(reason.into())
    }
}

/// 测验状态机错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 当前没有测验
    #[error("当前没有测验")]
    NoTest,

    /// 正在批改中，重复提交被拒绝
    #[error("测验正在批改中，重复提交已被拒绝")]
    ConcurrentSubmitRejected,

    /// 当前阶段不允许该操作
    #[error("当前阶段 {phase:?} 不允许操作 {action}")]
    InvalidTransition {
        action: &'static str,
        phase: TestPhase,
    },

    /// 批改返回前作答已被重置或测验已被替换
    #[error("本次作答已失效，批改结果被丢弃")]
    AttemptSuperseded,

    /// 题目不存在
    #[error("题目不存在: {id}")]
    UnknownQuestion { id: String },
}

/// 单张插图生成失败（非致命）
#[derive(Debug, Error)]
#[error("第 {index} 节插图生成失败: {source}")]
pub struct IllustrationError {
    pub index: usize,
    #[source]
    pub source: ProviderError,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },

    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 取值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建生成失败错误
    pub fn generation_failed(kind: ArtifactKind, source: ProviderError) -> Self {
        AppError::GenerationFailed { kind, source }
    }

    /// 创建批改失败错误
    pub fn grading_failed(source: ProviderError) -> Self {
        AppError::GradingFailed { source }
    }

    /// 创建文件读取错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 内容提供方结果类型
pub type ProviderResult<T> = Result<T, ProviderError>;
