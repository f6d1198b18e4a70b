use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{
    Artifact, ArtifactKind, Flashcard, GlossaryItem, GradeResult, MindmapNode, QuestionSet,
    StructuredSummary, TestPhase,
};
use crate::store::illustration::{IllustrationBoard, IllustrationStatus};
use crate::workflow::TestSession;

/// 学习材料存储
///
/// 槽位为空表示尚未生成；有值表示来自该类型最近一次成功的主生成调用
#[derive(Debug, Default)]
pub struct ArtifactStore {
    summary: Option<StructuredSummary>,
    illustrations: IllustrationBoard,
    glossary: Option<Vec<GlossaryItem>>,
    flashcards: Option<Vec<Flashcard>>,
    mindmap: Option<MindmapNode>,
    test: Option<TestSession>,
    last_session_id: u64,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换对应槽位
    ///
    /// 存入摘要时会开启新一轮插图，返回该轮次
    pub fn put(&mut self, artifact: Artifact) -> Option<u64> {
        match artifact {
            Artifact::Summary(summary) => {
                let round = self.illustrations.start_round(summary.sections.len());
                self.summary = Some(summary);
                return Some(round);
            }
            Artifact::Glossary(items) => self.glossary = Some(items),
            Artifact::Flashcards(cards) => self.flashcards = Some(cards),
            Artifact::Mindmap(root) => self.mindmap = Some(root),
            Artifact::Test(question_set) => {
                self.last_session_id += 1;
                self.test = Some(TestSession::new(self.last_session_id, question_set));
            }
        }
        None
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Summary => self.summary.is_some(),
            ArtifactKind::Glossary => self.glossary.is_some(),
            ArtifactKind::Flashcards => self.flashcards.is_some(),
            ArtifactKind::Mindmap => self.mindmap.is_some(),
            ArtifactKind::Test => self.test.is_some(),
        }
    }

    /// 清空全部槽位（加载新文档时调用）
    ///
    /// 测验会话编号继续递增，旧会话的批改结果不会落到新会话上
    pub fn clear(&mut self) {
        self.summary = None;
        self.illustrations.reset();
        self.glossary = None;
        self.flashcards = None;
        self.mindmap = None;
        self.test = None;
    }

    pub fn summary(&self) -> Option<&StructuredSummary> {
        self.summary.as_ref()
    }

    pub fn illustrations(&self) -> &IllustrationBoard {
        &self.illustrations
    }

    pub fn illustrations_mut(&mut self) -> &mut IllustrationBoard {
        &mut self.illustrations
    }

    pub fn glossary(&self) -> Option<&[GlossaryItem]> {
        self.glossary.as_deref()
    }

    pub fn flashcards(&self) -> Option<&[Flashcard]> {
        self.flashcards.as_deref()
    }

    pub fn mindmap(&self) -> Option<&MindmapNode> {
        self.mindmap.as_ref()
    }

    pub fn test(&self) -> Option<&TestSession> {
        self.test.as_ref()
    }

    pub fn test_mut(&mut self) -> Option<&mut TestSession> {
        self.test.as_mut()
    }

    pub fn test_phase(&self) -> TestPhase {
        self.test
            .as_ref()
            .map_or(TestPhase::NoTest, TestSession::phase)
    }

    /// 取出某种材料的展示视图
    pub fn view(&self, kind: ArtifactKind) -> Option<ArtifactView> {
        match kind {
            ArtifactKind::Summary => self.summary.as_ref().map(|summary| ArtifactView::Summary {
                summary: summary.clone(),
                illustrations: self.illustrations.statuses().clone(),
            }),
            ArtifactKind::Glossary => self
                .glossary
                .as_ref()
                .map(|items| ArtifactView::Glossary {
                    items: items.clone(),
                }),
            ArtifactKind::Flashcards => {
                self.flashcards
                    .as_ref()
                    .map(|cards| ArtifactView::Flashcards {
                        cards: cards.clone(),
                    })
            }
            ArtifactKind::Mindmap => self
                .mindmap
                .as_ref()
                .map(|root| ArtifactView::Mindmap { root: root.clone() }),
            ArtifactKind::Test => self.test.as_ref().map(|session| ArtifactView::Test {
                questions: session.question_set().clone(),
                answers: session.answers().clone(),
                phase: session.phase(),
                grade: session.grade().cloned(),
            }),
        }
    }
}

/// 展示层使用的材料视图
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactView {
    Summary {
        summary: StructuredSummary,
        illustrations: BTreeMap<usize, IllustrationStatus>,
    },
    Glossary {
        items: Vec<GlossaryItem>,
    },
    Flashcards {
        cards: Vec<Flashcard>,
    },
    Mindmap {
        root: MindmapNode,
    },
    Test {
        questions: QuestionSet,
        answers: BTreeMap<String, String>,
        phase: TestPhase,
        grade: Option<GradeResult>,
    },
}

impl ArtifactView {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactView::Summary { .. } => ArtifactKind::Summary,
            ArtifactView::Glossary { .. } => ArtifactKind::Glossary,
            ArtifactView::Flashcards { .. } => ArtifactKind::Flashcards,
            ArtifactView::Mindmap { .. } => ArtifactKind::Mindmap,
            ArtifactView::Test { .. } => ArtifactKind::Test,
        }
    }
}
