use serde::{Deserialize, Serialize};

/// 结构化摘要
///
/// `sections` 的顺序稳定，插图结果以其下标为键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredSummary {
    pub title: String,
    pub introduction: String,
    pub sections: Vec<SummarySection>,
    pub conclusion: String,
}

/// 摘要中的一个章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySection {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    /// 用于生成插图的提示词
    pub image_prompt: String,
}

impl StructuredSummary {
    /// 按章节顺序取出插图提示词
    pub fn image_prompts(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.sections
            .iter()
            .enumerate()
            .map(|(index, section)| (index, section.image_prompt.as_str()))
    }
}
