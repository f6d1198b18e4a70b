//! LLM 响应解析
//!
//! 模型可能把 JSON 包在 ```json 代码块里，也可能在前后带说明文字。
//! 这里负责提取 JSON、反序列化并校验；任何不完整的结果都返回错误，不会返回部分数据。

use std::collections::HashSet;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::models::{
    Flashcard, GlossaryItem, GradeResult, MindmapNode, Question, QuestionKind, QuestionSet,
    StructuredSummary, TestType,
};

/// 从响应文本中提取 JSON 片段
///
/// 优先取代码块内容；否则取第一个 `{`/`[` 到最后一个 `}`/`]` 之间的内容
pub fn extract_json(response: &str) -> ProviderResult<&str> {
    let fence = Regex::new(r"```(?:json|JSON)?\s*([\s\S]*?)```")
        .map_err(|e| ProviderError::malformed(e.to_string()))?;

    if let Some(body) = fence.captures(response).and_then(|caps| caps.get(1)) {
        let body = body.as_str().trim();
        if !body.is_empty() {
            return Ok(body);
        }
    }

    let start = response
        .find(['{', '['])
        .ok_or_else(|| ProviderError::malformed("响应中没有 JSON"))?;
    let end = response
        .rfind(['}', ']'])
        .filter(|end| *end > start)
        .ok_or_else(|| ProviderError::malformed("响应中的 JSON 不完整"))?;

    Ok(&response[start..=end])
}

fn parse_json<T: DeserializeOwned>(response: &str) -> ProviderResult<T> {
    let json = extract_json(response)?;
    debug!("解析 JSON，长度: {} 字符", json.len());
    Ok(serde_json::from_str(json)?)
}

fn require_text(value: &str, what: &str) -> ProviderResult<()> {
    if value.trim().is_empty() {
        return Err(ProviderError::malformed(format!("{}为空", what)));
    }
    Ok(())
}

/// 解析结构化摘要
pub fn parse_summary(response: &str) -> ProviderResult<StructuredSummary> {
    let summary: StructuredSummary = parse_json(response)?;

    require_text(&summary.title, "摘要标题")?;
    if summary.sections.is_empty() {
        return Err(ProviderError::malformed("摘要没有章节"));
    }
    for (index, section) in summary.sections.iter().enumerate() {
        require_text(&section.title, &format!("第 {} 节标题", index))?;
        require_text(&section.content, &format!("第 {} 节内容", index))?;
    }

    Ok(summary)
}

/// 解析术语表（空列表是合法结果）
pub fn parse_glossary(response: &str) -> ProviderResult<Vec<GlossaryItem>> {
    let items: Vec<GlossaryItem> = parse_json(response)?;

    for item in &items {
        require_text(&item.term, "术语")?;
        require_text(&item.definition, &format!("术语 '{}' 的定义", item.term))?;
    }

    Ok(items)
}

/// 解析记忆卡片（空列表是合法结果）
pub fn parse_flashcards(response: &str) -> ProviderResult<Vec<Flashcard>> {
    let cards: Vec<Flashcard> = parse_json(response)?;

    for card in &cards {
        require_text(&card.front, "卡片正面")?;
        require_text(&card.back, "卡片背面")?;
    }

    Ok(cards)
}

/// 解析思维导图
pub fn parse_mindmap(response: &str) -> ProviderResult<MindmapNode> {
    let root: MindmapNode = parse_json(response)?;

    if root.has_blank_name() {
        return Err(ProviderError::malformed("思维导图存在空节点名称"));
    }

    Ok(root)
}

/// 模型返回的题目
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionWire {
    id: String,
    question: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: String,
}

/// 解析测验题目，并按请求的题型打标签
pub fn parse_questions(response: &str, test_type: TestType) -> ProviderResult<QuestionSet> {
    let wires: Vec<QuestionWire> = parse_json(response)?;

    if wires.is_empty() {
        return Err(ProviderError::malformed("测验没有题目"));
    }

    let mut seen_ids = HashSet::new();
    let mut questions = Vec::with_capacity(wires.len());

    for wire in wires {
        let id = wire.id.trim().to_string();
        require_text(&id, "题目 id")?;
        if !seen_ids.insert(id.clone()) {
            return Err(ProviderError::malformed(format!("题目 id 重复: {}", id)));
        }
        require_text(&wire.question, &format!("题目 {} 的题干", id))?;
        require_text(&wire.correct_answer, &format!("题目 {} 的参考答案", id))?;

        let kind = match test_type {
            TestType::MultipleChoice => {
                if wire.options.len() < 2 {
                    return Err(ProviderError::malformed(format!(
                        "选择题 {} 的选项少于 2 个",
                        id
                    )));
                }
                QuestionKind::MultipleChoice {
                    options: wire.options,
                }
            }
            TestType::OpenQuestions => QuestionKind::Open,
        };

        questions.push(Question {
            id,
            question: wire.question,
            kind,
            correct_answer: wire.correct_answer,
        });
    }

    Ok(QuestionSet {
        test_type,
        questions,
    })
}

/// 解析批改结果（题目完整性由调用方校验）
pub fn parse_grade(response: &str) -> ProviderResult<GradeResult> {
    parse_json(response)
}

/// 从插图模型的响应中提取图片引用
///
/// 支持 data URL、Markdown 图片以及直接给出的图片链接；都没有时返回 `None`
pub fn extract_image_reference(response: &str) -> ProviderResult<Option<String>> {
    let data_url = Regex::new(r"data:image/[A-Za-z0-9.+-]+;base64,[A-Za-z0-9+/=]+")
        .map_err(|e| ProviderError::malformed(e.to_string()))?;
    if let Some(found) = data_url.find(response) {
        return Ok(Some(found.as_str().to_string()));
    }

    let markdown = Regex::new(r"!\[[^\]]*\]\((https?://[^\s)]+)\)")
        .map_err(|e| ProviderError::malformed(e.to_string()))?;
    if let Some(url) = markdown.captures(response).and_then(|caps| caps.get(1)) {
        return Ok(Some(url.as_str().to_string()));
    }

    let image_url = Regex::new(r"(?i)https?://[^\s)\]]+\.(?:png|jpe?g|webp|gif)(?:\?[^\s)\]]*)?")
        .map_err(|e| ProviderError::malformed(e.to_string()))?;
    Ok(image_url.find(response).map(|m| m.as_str().to_string()))
}
