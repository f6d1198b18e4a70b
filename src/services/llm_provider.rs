//! 基于 LLM 的内容提供方
//!
//! 负责：选模型 → 组装提示词 → 调用 `LlmService` → 解析校验

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ProviderResult;
use crate::models::{Artifact, ArtifactRequest, GradeResult};
use crate::services::content_provider::{ContentProvider, GradingRequest, PrimaryRequest};
use crate::services::llm_service::LlmService;
use crate::services::{prompts, response_parser};
use crate::utils::logging::truncate_text;

/// LLM 内容提供方
pub struct LlmContentProvider {
    llm: LlmService,
    text_model: String,
    test_model: String,
    image_model: String,
}

impl LlmContentProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmService::new(config),
            text_model: config.text_model_name.clone(),
            test_model: config.test_model_name.clone(),
            image_model: config.image_model_name.clone(),
        }
    }

    async fn ask(&self, model: &str, prompt: &str) -> ProviderResult<String> {
        self.llm
            .send_to_llm(model, prompt, Some(prompts::SYSTEM_INSTRUCTION))
            .await
    }
}

#[async_trait]
impl ContentProvider for LlmContentProvider {
    async fn generate_primary(&self, request: &PrimaryRequest) -> ProviderResult<Artifact> {
        let text = request.source_text.as_str();
        let level = request.level;

        info!(
            "🤖 请求生成 {} (年级: {})",
            request.request.kind(),
            level.label()
        );

        let artifact = match request.request {
            ArtifactRequest::Summary => {
                let response = self
                    .ask(&self.text_model, &prompts::summary_prompt(text, level))
                    .await?;
                Artifact::Summary(response_parser::parse_summary(&response)?)
            }
            ArtifactRequest::Glossary => {
                let response = self
                    .ask(&self.text_model, &prompts::glossary_prompt(text, level))
                    .await?;
                Artifact::Glossary(response_parser::parse_glossary(&response)?)
            }
            ArtifactRequest::Flashcards => {
                let response = self
                    .ask(&self.text_model, &prompts::flashcards_prompt(text, level))
                    .await?;
                Artifact::Flashcards(response_parser::parse_flashcards(&response)?)
            }
            ArtifactRequest::Mindmap => {
                let response = self
                    .ask(&self.text_model, &prompts::mindmap_prompt(text, level))
                    .await?;
                Artifact::Mindmap(response_parser::parse_mindmap(&response)?)
            }
            ArtifactRequest::Test(test_type) => {
                let response = self
                    .ask(
                        &self.test_model,
                        &prompts::test_prompt(text, level, test_type),
                    )
                    .await?;
                Artifact::Test(response_parser::parse_questions(&response, test_type)?)
            }
        };

        Ok(artifact)
    }

    async fn generate_illustration(&self, prompt: &str) -> ProviderResult<Option<String>> {
        debug!("请求插图: {}", truncate_text(prompt, 60));
        let prompt = prompts::illustration_prompt(prompt);

        let image_error = match self.llm.generate_image(&self.image_model, &prompt).await {
            Ok(image) => return Ok(image),
            Err(e) => e,
        };

        // 图片接口不可用时，退回对话接口并从回复文本中找图片
        debug!("图片接口失败，改用对话接口: {}", image_error);
        match self.llm.send_to_llm(&self.image_model, &prompt, None).await {
            Ok(response) => response_parser::extract_image_reference(&response),
            Err(_) => Err(image_error),
        }
    }

    async fn grade_test(&self, request: &GradingRequest) -> ProviderResult<GradeResult> {
        info!(
            "📝 请求批改: {} 道题，已作答 {} 道",
            request.questions.len(),
            request.answers.len()
        );

        let prompt = prompts::grading_prompt(
            &request.source_text,
            &request.questions,
            &request.answers,
            request.level,
        )?;
        let response = self.ask(&self.test_model, &prompt).await?;

        response_parser::parse_grade(&response)
    }
}
