use std::fmt;

use serde::{Deserialize, Serialize};

use super::study_items::{Flashcard, GlossaryItem, MindmapNode};
use super::summary::StructuredSummary;
use super::test::QuestionSet;

/// 学习材料类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Summary,
    Glossary,
    Flashcards,
    Mindmap,
    Test,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Summary,
        ArtifactKind::Glossary,
        ArtifactKind::Flashcards,
        ArtifactKind::Mindmap,
        ArtifactKind::Test,
    ];

    /// 界面上显示的荷兰语名称
    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Summary => "Samenvatting",
            ArtifactKind::Glossary => "Begrippenlijst",
            ArtifactKind::Flashcards => "Steekkaarten",
            ArtifactKind::Mindmap => "Mindmap",
            ArtifactKind::Test => "Kennis Test",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 测验题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    MultipleChoice,
    OpenQuestions,
}

impl TestType {
    pub fn label(self) -> &'static str {
        match self {
            TestType::MultipleChoice => "Meerkeuze",
            TestType::OpenQuestions => "Open vragen",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 一次生成请求
///
/// 测验必须带题型，因此题型放在请求里而不是单独的可选参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactRequest {
    Summary,
    Glossary,
    Flashcards,
    Mindmap,
    Test(TestType),
}

impl ArtifactRequest {
    pub fn kind(self) -> ArtifactKind {
        match self {
            ArtifactRequest::Summary => ArtifactKind::Summary,
            ArtifactRequest::Glossary => ArtifactKind::Glossary,
            ArtifactRequest::Flashcards => ArtifactKind::Flashcards,
            ArtifactRequest::Mindmap => ArtifactKind::Mindmap,
            ArtifactRequest::Test(_) => ArtifactKind::Test,
        }
    }

    pub fn test_type(self) -> Option<TestType> {
        match self {
            ArtifactRequest::Test(test_type) => Some(test_type),
            _ => None,
        }
    }
}

/// 主生成调用的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Artifact {
    Summary(StructuredSummary),
    Glossary(Vec<GlossaryItem>),
    Flashcards(Vec<Flashcard>),
    Mindmap(MindmapNode),
    Test(QuestionSet),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Summary(_) => ArtifactKind::Summary,
            Artifact::Glossary(_) => ArtifactKind::Glossary,
            Artifact::Flashcards(_) => ArtifactKind::Flashcards,
            Artifact::Mindmap(_) => ArtifactKind::Mindmap,
            Artifact::Test(_) => ArtifactKind::Test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_kind_mapping() {
        assert_eq!(ArtifactRequest::Summary.kind(), ArtifactKind::Summary);
        assert_eq!(
            ArtifactRequest::Test(TestType::OpenQuestions).kind(),
            ArtifactKind::Test
        );
        assert_eq!(
            ArtifactRequest::Test(TestType::MultipleChoice).test_type(),
            Some(TestType::MultipleChoice)
        );
        assert_eq!(ArtifactRequest::Glossary.test_type(), None);
    }

    #[test]
    fn test_artifact_serializes_with_kind_tag() {
        let artifact = Artifact::Glossary(vec![GlossaryItem {
            term: "Fotosynthese".to_string(),
            definition: "Omzetting van licht in energie".to_string(),
        }]);
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["kind"], "glossary");
        assert_eq!(json["data"][0]["term"], "Fotosynthese");
    }
}
