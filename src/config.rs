use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::StudyLevel;

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    /// 摘要、术语表、卡片、思维导图使用的模型
    pub text_model_name: String,
    /// 出题和批改使用的模型
    pub test_model_name: String,
    /// 插图模型
    pub image_model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,

    // --- 调度配置 ---
    /// 同时进行的插图请求数量上限
    pub max_concurrent_illustrations: usize,
    /// 主生成和批改调用的超时（秒）
    pub request_timeout_secs: u64,
    /// 单张插图调用的超时（秒）
    pub illustration_timeout_secs: u64,

    // --- 运行配置 ---
    /// 默认年级
    pub study_level: StudyLevel,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            text_model_name: "gemini-3-flash-preview".to_string(),
            test_model_name: "gemini-3-pro-preview".to_string(),
            image_model_name: "gemini-2.5-flash-image".to_string(),
            temperature: 0.3,
            max_tokens: 8192,
            max_concurrent_illustrations: 4,
            request_timeout_secs: 120,
            illustration_timeout_secs: 90,
            study_level: StudyLevel::Year1,
            verbose_logging: false,
            output_log_file: "study_artifacts.log".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载（未设置的项使用默认值）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，再用环境变量覆盖
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })?;
        config.with_env_overrides()
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let config = Self {
            llm_api_key: env_string("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            text_model_name: env_string("LLM_TEXT_MODEL").unwrap_or(self.text_model_name),
            test_model_name: env_string("LLM_TEST_MODEL").unwrap_or(self.test_model_name),
            image_model_name: env_string("LLM_IMAGE_MODEL").unwrap_or(self.image_model_name),
            temperature: env_parse("LLM_TEMPERATURE", "f32")?.unwrap_or(self.temperature),
            max_tokens: env_parse("LLM_MAX_TOKENS", "u32")?.unwrap_or(self.max_tokens),
            max_concurrent_illustrations: env_parse("MAX_CONCURRENT_ILLUSTRATIONS", "usize")?
                .unwrap_or(self.max_concurrent_illustrations),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            illustration_timeout_secs: env_parse("ILLUSTRATION_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.illustration_timeout_secs),
            study_level: env_parse("STUDY_LEVEL", "StudyLevel")?.unwrap_or(self.study_level),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
            output_log_file: env_string("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        };
        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_illustrations == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_illustrations",
                reason: "必须大于 0".to_string(),
            });
        }
        if self.request_timeout_secs == 0 || self.illustration_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout",
                reason: "超时时间必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn illustration_timeout(&self) -> Duration {
        Duration::from_secs(self.illustration_timeout_secs)
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(
    var_name: &str,
    expected_type: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            }),
    }
}
