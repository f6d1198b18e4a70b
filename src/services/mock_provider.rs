//! 按脚本返回结果的内容提供方
//!
//! 不访问网络，用于测试编排逻辑：可以指定每种材料的返回值、每个插图提示词的结果、
//! 批改的延迟和失败次数，并记录每类调用的次数

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ProviderError, ProviderResult};
use crate::models::{Artifact, ArtifactKind, GradeResult, GradedQuestion};
use crate::services::content_provider::{ContentProvider, GradingRequest, PrimaryRequest};

/// 单个插图提示词的脚本
#[derive(Debug, Clone)]
pub enum IllustrationScript {
    Image(String),
    NoImage,
    Fail(String),
    Delayed(Duration, Box<IllustrationScript>),
}

/// 脚本化内容提供方
#[derive(Default)]
pub struct ScriptedProvider {
    artifacts: HashMap<ArtifactKind, Result<Artifact, String>>,
    illustrations: HashMap<String, IllustrationScript>,
    grade_override: Option<GradeResult>,
    primary_delay: Duration,
    grading_delay: Duration,
    grading_failures: AtomicUsize,
    primary_calls: AtomicUsize,
    illustration_calls: AtomicUsize,
    active_illustrations: AtomicUsize,
    peak_illustrations: AtomicUsize,
    grading_calls: AtomicUsize,
    last_grading_request: Mutex<Option<GradingRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定某种材料的返回值
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.insert(artifact.kind(), Ok(artifact));
        self
    }

    /// 指定某种材料生成失败
    pub fn with_failure(mut self, kind: ArtifactKind, reason: impl Into<String>) -> Self {
        self.artifacts.insert(kind, Err(reason.into()));
        self
    }

    /// 指定某个插图提示词的结果，未指定的提示词返回 `image://<提示词>`
    pub fn with_illustration(mut self, prompt: impl Into<String>, script: IllustrationScript) -> Self {
        self.illustrations.insert(prompt.into(), script);
        self
    }

    /// 用固定的批改结果代替自动批改
    pub fn with_grade(mut self, grade: GradeResult) -> Self {
        self.grade_override = Some(grade);
        self
    }

    pub fn with_primary_delay(mut self, delay: Duration) -> Self {
        self.primary_delay = delay;
        self
    }

    pub fn with_grading_delay(mut self, delay: Duration) -> Self {
        self.grading_delay = delay;
        self
    }

    /// 前 `count` 次批改失败
    pub fn with_grading_failures(self, count: usize) -> Self {
        self.grading_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn primary_calls(&self) -> usize {
        self.primary_calls.load(Ordering::SeqCst)
    }

    pub fn illustration_calls(&self) -> usize {
        self.illustration_calls.load(Ordering::SeqCst)
    }

    /// 同时进行的插图调用数的峰值
    pub fn peak_concurrent_illustrations(&self) -> usize {
        self.peak_illustrations.load(Ordering::SeqCst)
    }

    pub fn grading_calls(&self) -> usize {
        self.grading_calls.load(Ordering::SeqCst)
    }

    /// 最近一次收到的批改请求
    pub fn last_grading_request(&self) -> Option<GradingRequest> {
        self.last_grading_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 按参考答案逐题比对的自动批改
    fn auto_grade(request: &GradingRequest) -> GradeResult {
        let graded_questions: Vec<GradedQuestion> = request
            .questions
            .iter()
            .map(|question| {
                let user_answer = request
                    .answers
                    .get(&question.id)
                    .cloned()
                    .unwrap_or_default();
                let is_correct = user_answer.trim().eq_ignore_ascii_case(question.correct_answer.trim());
                GradedQuestion {
                    question_id: question.id.clone(),
                    user_answer,
                    is_correct,
                    correct_answer: question.correct_answer.clone(),
                    feedback: if is_correct { "Juist" } else { "Fout" }.to_string(),
                }
            })
            .collect();

        let score = graded_questions.iter().filter(|g| g.is_correct).count() as f64;
        GradeResult {
            score,
            max_score: request.questions.len() as f64,
            feedback: format!("{} van {} juist", score, request.questions.len()),
            graded_questions,
        }
    }
}

/// 调用结束（包括被超时取消）时计数减一
struct ActiveCall<'a>(&'a AtomicUsize);

impl Drop for ActiveCall<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn resolve_illustration(prompt: &str, script: IllustrationScript) -> ProviderResult<Option<String>> {
    let mut script = script;
    loop {
        match script {
            IllustrationScript::Image(reference) => return Ok(Some(reference)),
            IllustrationScript::NoImage => return Ok(None),
            IllustrationScript::Fail(reason) => {
                return Err(ProviderError::request("scripted-image", format!("{}: {}", prompt, reason)))
            }
            IllustrationScript::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                script = *inner;
            }
        }
    }
}

#[async_trait]
impl ContentProvider for ScriptedProvider {
    async fn generate_primary(&self, request: &PrimaryRequest) -> ProviderResult<Artifact> {
        self.primary_calls.fetch_add(1, Ordering::SeqCst);
        if !self.primary_delay.is_zero() {
            tokio::time::sleep(self.primary_delay).await;
        }

        let kind = request.request.kind();
        match self.artifacts.get(&kind) {
            Some(Ok(artifact)) => Ok(artifact.clone()),
            Some(Err(reason)) => Err(ProviderError::malformed(reason.clone())),
            None => Err(ProviderError::malformed(format!("未配置 {} 的脚本", kind))),
        }
    }

    async fn generate_illustration(&self, prompt: &str) -> ProviderResult<Option<String>> {
        self.illustration_calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active_illustrations.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_illustrations.fetch_max(active, Ordering::SeqCst);
        let _active = ActiveCall(&self.active_illustrations);

        let script = self
            .illustrations
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| IllustrationScript::Image(format!("image://{}", prompt)));
        resolve_illustration(prompt, script).await
    }

    async fn grade_test(&self, request: &GradingRequest) -> ProviderResult<GradeResult> {
        self.grading_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_grading_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        if !self.grading_delay.is_zero() {
            tokio::time::sleep(self.grading_delay).await;
        }

        let should_fail = self
            .grading_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(ProviderError::request("scripted-grader", "批改服务不可用"));
        }

        Ok(self
            .grade_override
            .clone()
            .unwrap_or_else(|| Self::auto_grade(request)))
    }
}
