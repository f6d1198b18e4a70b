//! 测验会话 - 流程层
//!
//! 一次测验的完整生命周期：
//!
//! ```text
//! NoTest ──生成──▶ Unanswered ──submit──▶ Submitting ──批改成功──▶ Graded
//!                      ▲                      │                      │
//!                      └──────批改失败─────────┘                      │
//!                      └──────────────────retry──────────────────────┘
//! ```
//!
//! 重新生成测验时，任何阶段都会回到 `Unanswered`。
//! `NoTest` 由存储层的空槽位表示，这里的会话只覆盖后三个阶段。

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::SessionError;
use crate::models::{GradeResult, Question, QuestionSet, TestPhase};

/// 会话内部状态
#[derive(Debug, Clone, PartialEq)]
enum AttemptState {
    Unanswered,
    Submitting,
    Graded(GradeResult),
}

/// 提交凭证
///
/// 批改返回时用它确认结果仍属于当前这次作答
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    session_id: u64,
    attempt: u64,
}

/// 测验会话
#[derive(Debug, Clone)]
pub struct TestSession {
    id: u64,
    question_set: QuestionSet,
    answers: BTreeMap<String, String>,
    state: AttemptState,
    attempt: u64,
}

impl TestSession {
    /// 用新生成的题目创建会话，初始阶段为 `Unanswered`
    pub fn new(id: u64, question_set: QuestionSet) -> Self {
        Self {
            id,
            question_set,
            answers: BTreeMap::new(),
            state: AttemptState::Unanswered,
            attempt: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> TestPhase {
        match self.state {
            AttemptState::Unanswered => TestPhase::Unanswered,
            AttemptState::Submitting => TestPhase::Submitting,
            AttemptState::Graded(_) => TestPhase::Graded,
        }
    }

    pub fn question_set(&self) -> &QuestionSet {
        &self.question_set
    }

    pub fn questions(&self) -> &[Question] {
        &self.question_set.questions
    }

    /// 已作答的题目（稀疏）
    pub fn answers(&self) -> &BTreeMap<String, String> {
        &self.answers
    }

    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn grade(&self) -> Option<&GradeResult> {
        match &self.state {
            AttemptState::Graded(grade) => Some(grade),
            _ => None,
        }
    }

    /// 记录作答
    ///
    /// 只允许在 `Unanswered` 阶段；未知题目 id 会被拒绝。
    /// 去掉空白后为空的答案视为未作答，从映射中移除。
    pub fn record_answer(
        &mut self,
        question_id: &str,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.expect_phase("record_answer", TestPhase::Unanswered)?;

        if !self.question_set.contains(question_id) {
            return Err(SessionError::UnknownQuestion {
                id: question_id.to_string(),
            });
        }

        let text = text.into();
        if text.trim().is_empty() {
            self.answers.remove(question_id);
        } else {
            self.answers.insert(question_id.to_string(), text);
        }
        Ok(())
    }

    /// 进入 `Submitting`，返回本次提交的凭证
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SessionError> {
        match self.state {
            AttemptState::Unanswered => {
                self.state = AttemptState::Submitting;
                debug!(
                    "测验 #{} 第 {} 次作答开始批改，已作答 {}/{}",
                    self.id,
                    self.attempt,
                    self.answers.len(),
                    self.question_set.len()
                );
                Ok(SubmitTicket {
                    session_id: self.id,
                    attempt: self.attempt,
                })
            }
            AttemptState::Submitting => Err(SessionError::ConcurrentSubmitRejected),
            AttemptState::Graded(_) => Err(SessionError::InvalidTransition {
                action: "submit",
                phase: TestPhase::Graded,
            }),
        }
    }

    /// 凭证是否仍对应正在批改的这次作答
    pub fn is_current(&self, ticket: &SubmitTicket) -> bool {
        ticket.session_id == self.id
            && ticket.attempt == self.attempt
            && self.state == AttemptState::Submitting
    }

    /// 批改成功：`Submitting` → `Graded`
    ///
    /// 结果的完整性需要调用方先行校验
    pub fn complete_grading(
        &mut self,
        ticket: &SubmitTicket,
        grade: GradeResult,
    ) -> Result<(), SessionError> {
        if !self.is_current(ticket) {
            return Err(SessionError::AttemptSuperseded);
        }
        self.state = AttemptState::Graded(grade);
        Ok(())
    }

    /// 批改失败：`Submitting` → `Unanswered`，作答保留
    pub fn abort_grading(&mut self, ticket: &SubmitTicket) -> Result<(), SessionError> {
        if !self.is_current(ticket) {
            return Err(SessionError::AttemptSuperseded);
        }
        self.state = AttemptState::Unanswered;
        Ok(())
    }

    /// 重做：`Graded` → `Unanswered`，清空作答和成绩，题目不变
    pub fn retry(&mut self) -> Result<(), SessionError> {
        self.expect_phase("retry", TestPhase::Graded)?;
        self.reset_attempt();
        Ok(())
    }

    /// 放弃当前作答（重新请求测验时调用），任何阶段都回到 `Unanswered`
    ///
    /// 正在进行的批改会因凭证失效而被丢弃
    pub fn discard_attempt(&mut self) {
        self.reset_attempt();
    }

    fn reset_attempt(&mut self) {
        self.answers.clear();
        self.state = AttemptState::Unanswered;
        self.attempt += 1;
    }

    fn expect_phase(&self, action: &'static str, expected: TestPhase) -> Result<(), SessionError> {
        let phase = self.phase();
        if phase == expected {
            return Ok(());
        }
        Err(SessionError::InvalidTransition { action, phase })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GradedQuestion, QuestionKind, TestType};

    fn question_set(ids: &[&str]) -> QuestionSet {
        QuestionSet {
            test_type: TestType::OpenQuestions,
            questions: ids
                .iter()
                .map(|id| Question {
                    id: id.to_string(),
                    question: format!("Vraag {}", id),
                    kind: QuestionKind::Open,
                    correct_answer: "antwoord".to_string(),
                })
                .collect(),
        }
    }

    fn grade_for(ids: &[&str]) -> GradeResult {
        GradeResult {
            score: 0.0,
            max_score: ids.len() as f64,
            feedback: "Oefen nog wat".to_string(),
            graded_questions: ids
                .iter()
                .map(|id| GradedQuestion {
                    question_id: id.to_string(),
                    user_answer: String::new(),
                    is_correct: false,
                    correct_answer: "antwoord".to_string(),
                    feedback: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_new_session_is_unanswered() {
        let session = TestSession::new(1, question_set(&["q1", "q2"]));
        assert_eq!(session.phase(), TestPhase::Unanswered);
        assert!(session.answers().is_empty());
        assert!(session.grade().is_none());
    }

    #[test]
    fn test_record_answer_upserts_and_blank_removes() {
        let mut session = TestSession::new(1, question_set(&["q1", "q2"]));
        session.record_answer("q1", "eerste").unwrap();
        session.record_answer("q1", "tweede").unwrap();
        assert_eq!(session.answer("q1"), Some("tweede"));

        session.record_answer("q1", "   ").unwrap();
        assert_eq!(session.answer("q1"), None);
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_record_answer_rejects_unknown_id() {
        let mut session = TestSession::new(1, question_set(&["q1"]));
        assert_eq!(
            session.record_answer("q9", "x"),
            Err(SessionError::UnknownQuestion {
                id: "q9".to_string()
            })
        );
    }

    #[test]
    fn test_second_submit_is_rejected_while_submitting() {
        let mut session = TestSession::new(1, question_set(&["q1"]));
        session.begin_submit().unwrap();
        assert_eq!(
            session.begin_submit(),
            Err(SessionError::ConcurrentSubmitRejected)
        );
        assert!(matches!(
            session.record_answer("q1", "te laat"),
            Err(SessionError::InvalidTransition {
                phase: TestPhase::Submitting,
                ..
            })
        ));
    }

    #[test]
    fn test_grading_failure_keeps_answers() {
        let mut session = TestSession::new(1, question_set(&["q1", "q2"]));
        session.record_answer("q1", "iets").unwrap();
        let ticket = session.begin_submit().unwrap();
        session.abort_grading(&ticket).unwrap();

        assert_eq!(session.phase(), TestPhase::Unanswered);
        assert_eq!(session.answer("q1"), Some("iets"));
    }

    #[test]
    fn test_retry_clears_answers_and_keeps_questions() {
        let mut session = TestSession::new(1, question_set(&["q1", "q2"]));
        session.record_answer("q2", "iets").unwrap();
        let ticket = session.begin_submit().unwrap();
        session
            .complete_grading(&ticket, grade_for(&["q1", "q2"]))
            .unwrap();
        assert_eq!(session.phase(), TestPhase::Graded);

        session.retry().unwrap();
        assert_eq!(session.phase(), TestPhase::Unanswered);
        assert!(session.answers().is_empty());
        assert!(session.grade().is_none());
        assert_eq!(session.questions().len(), 2);
    }

    #[test]
    fn test_retry_only_after_graded() {
        let mut session = TestSession::new(1, question_set(&["q1"]));
        assert_eq!(
            session.retry(),
            Err(SessionError::InvalidTransition {
                action: "retry",
                phase: TestPhase::Unanswered
            })
        );
    }

    #[test]
    fn test_submit_after_graded_is_invalid() {
        let mut session = TestSession::new(1, question_set(&["q1"]));
        let ticket = session.begin_submit().unwrap();
        session.complete_grading(&ticket, grade_for(&["q1"])).unwrap();
        assert!(matches!(
            session.begin_submit(),
            Err(SessionError::InvalidTransition {
                phase: TestPhase::Graded,
                ..
            })
        ));
    }

    #[test]
    fn test_discarded_attempt_invalidates_ticket() {
        let mut session = TestSession::new(1, question_set(&["q1"]));
        session.record_answer("q1", "iets").unwrap();
        let ticket = session.begin_submit().unwrap();

        session.discard_attempt();
        assert_eq!(session.phase(), TestPhase::Unanswered);
        assert!(session.answers().is_empty());
        assert_eq!(
            session.complete_grading(&ticket, grade_for(&["q1"])),
            Err(SessionError::AttemptSuperseded)
        );
        assert_eq!(session.phase(), TestPhase::Unanswered);
    }
}
