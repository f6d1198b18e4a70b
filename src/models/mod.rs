//! 数据模型
//!
//! 只描述数据本身，不包含任何调用逻辑

pub mod artifact;
pub mod level;
pub mod study_items;
pub mod summary;

pub use artifact::{Artifact, ArtifactKind, ArtifactRequest, TestType};
pub use level::StudyLevel;
pub use study_items::{Flashcard, GlossaryItem, MindmapNode};
pub use summary::{StructuredSummary, SummarySection};
pub use test::{GradeResult, GradedQuestion, Question, QuestionKind, QuestionSet, TestPhase};
