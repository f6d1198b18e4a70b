//! LLM 服务 - 业务能力层
//!
//! 只负责"把消息发给模型并拿回文本"，不关心提示词内容
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 Gemini 的 OpenAI 兼容端点）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    types::images::{
        CreateImageRequestArgs, Image, ImageModel, ImageOutputFormat, ImageResponseFormat,
        ImagesResponse,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ProviderError, ProviderResult};

/// LLM 服务
///
/// 职责：
/// - 持有 API 客户端
/// - 提供按模型调用的通用接口
/// - 不认识摘要、测验等业务类型
pub struct LlmService {
    client: Client<OpenAIConfig>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `model`: 模型名称
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回去掉首尾空白的响应文本
    pub async fn send_to_llm(
        &self,
        model: &str,
        user_message: &str,
        system_message: Option<&str>,
    ) -> ProviderResult<String> {
        debug!("调用 LLM API，模型: {}", model);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| ProviderError::request(model, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| ProviderError::request(model, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| ProviderError::request(model, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败 (模型: {}): {}", model, e);
            ProviderError::request(model, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderError::EmptyResponse {
                model: model.to_string(),
            })?;

        debug!("响应长度: {} 字符", content.len());

        Ok(content.trim().to_string())
    }

    /// 调用图片生成接口
    ///
    /// 要求以 base64 返回，拼成 `data:` URL；服务只给出链接时返回链接。
    /// 没有任何图片时返回 `None`
    pub async fn generate_image(&self, model: &str, prompt: &str) -> ProviderResult<Option<String>> {
        debug!("调用图片接口，模型: {}", model);

        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(ImageModel::Other(model.to_string()))
            .n(1u8)
            .response_format(ImageResponseFormat::B64Json)
            .build()
            .map_err(|e| ProviderError::request(model, e))?;

        let response = self.client.images().generate(request).await.map_err(|e| {
            warn!("图片接口调用失败 (模型: {}): {}", model, e);
            ProviderError::request(model, e)
        })?;

        Ok(image_reference(&response))
    }
}

/// 取出第一张图片的引用
fn image_reference(response: &ImagesResponse) -> Option<String> {
    let image = response.data.first()?;
    match image.as_ref() {
        Image::B64Json { b64_json, .. } if !b64_json.trim().is_empty() => Some(format!(
            "data:{};base64,{}",
            mime_type(response.output_format.as_ref()),
            b64_json.trim()
        )),
        Image::Url { url, .. } if !url.trim().is_empty() => Some(url.trim().to_string()),
        _ => None,
    }
}

fn mime_type(format: Option<&ImageOutputFormat>) -> &'static str {
    match format {
        Some(ImageOutputFormat::Jpeg) => "image/jpeg",
        Some(ImageOutputFormat::Webp) => "image/webp",
        Some(ImageOutputFormat::Png) | None => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn images_response(data: Vec<Image>, output_format: Option<ImageOutputFormat>) -> ImagesResponse {
        ImagesResponse {
            created: 0,
            data: data.into_iter().map(Arc::new).collect(),
            background: None,
            output_format,
            size: None,
            quality: None,
            usage: None,
        }
    }

    #[test]
    fn test_image_reference_builds_data_url() {
        let response = images_response(
            vec![Image::B64Json {
                b64_json: Arc::new("iVBORw0KGgo=".to_string()),
                revised_prompt: None,
            }],
            None,
        );
        assert_eq!(
            image_reference(&response).as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );

        let webp = images_response(
            vec![Image::B64Json {
                b64_json: Arc::new("UklGRg==".to_string()),
                revised_prompt: None,
            }],
            Some(ImageOutputFormat::Webp),
        );
        assert_eq!(
            image_reference(&webp).as_deref(),
            Some("data:image/webp;base64,UklGRg==")
        );
    }

    #[test]
    fn test_image_reference_accepts_url_and_empty() {
        let linked = images_response(
            vec![Image::Url {
                url: "https://img.example/a.png".to_string(),
                revised_prompt: None,
            }],
            None,
        );
        assert_eq!(
            image_reference(&linked).as_deref(),
            Some("https://img.example/a.png")
        );
        assert_eq!(image_reference(&images_response(vec![], None)), None);
    }

    /// 测试通用 LLM 调用
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_send_to_llm_simple -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_send_to_llm_simple() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().expect("加载配置失败");
        let service = LlmService::new(&config);

        let result = service
            .send_to_llm(
                &config.text_model_name,
                "Wat is fotosynthese? Antwoord in één zin.",
                Some("Je bent een beknopte assistent."),
            )
            .await;

        match result {
            Ok(response) => {
                println!("\n========== LLM 响应 ==========");
                println!("{}", response);
                println!("==============================\n");
                assert!(!response.is_empty());
            }
            Err(e) => panic!("测试失败: {}", e),
        }
    }
}
