//! 学习会话 - 编排层
//!
//! ## 职责
//!
//! 持有当前文档、年级和全部学习材料，负责：
//!
//! 1. **主生成**：每次 `generate` 只发起一次内容提供方调用，成功后整体替换对应槽位
//! 2. **插图扇出**：摘要存入后，为每个章节派生一个插图任务，用 Semaphore 限制并发，
//!    不阻塞 `generate` 的返回
//! 3. **测验生命周期**：作答、提交、批改、重做，委托给 `workflow::TestSession`
//!
//! ## 并发约定
//!
//! - 状态放在 `Arc<RwLock<..>>` 中，调用内容提供方期间不持有锁
//! - 插图结果带轮次写回，过期轮次的结果直接丢弃
//! - 文档被替换时递增文档版本，进行中的主生成结果不再写入

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, RwLock, Semaphore};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{
    AppError, AppResult, IllustrationError, ProviderError, ProviderResult, SessionError,
};
use crate::models::{
    Artifact, ArtifactKind, ArtifactRequest, GradeResult, QuestionSet, StudyLevel, TestPhase,
    TestType,
};
use crate::services::{ContentProvider, GradingRequest, PrimaryRequest};
use crate::store::{ArtifactStore, ArtifactView, IllustrationStatus};

/// 会话内部状态
#[derive(Debug, Default)]
struct StudyState {
    source_text: String,
    document_name: Option<String>,
    /// 每次加载文档递增
    document_epoch: u64,
    level: StudyLevel,
    active: Option<ArtifactKind>,
    /// 尚未返回的主生成调用数
    in_flight: usize,
    store: ArtifactStore,
}

impl StudyState {
    fn has_document(&self) -> bool {
        !self.source_text.trim().is_empty()
    }
}

/// 展示层可见的会话快照
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySnapshot {
    pub document_name: Option<String>,
    pub has_document: bool,
    pub level: StudyLevel,
    pub active: Option<ArtifactKind>,
    pub busy: bool,
    pub view: Option<ArtifactView>,
    pub illustrations: BTreeMap<usize, IllustrationStatus>,
    pub test_phase: TestPhase,
}

/// 学习会话
pub struct StudySession {
    provider: Arc<dyn ContentProvider>,
    request_timeout: Duration,
    illustration_timeout: Duration,
    state: Arc<RwLock<StudyState>>,
    illustration_permits: Arc<Semaphore>,
    /// 尚未结束的插图任务数
    illustrations_pending: Arc<watch::Sender<usize>>,
}

impl StudySession {
    pub fn new(provider: Arc<dyn ContentProvider>, config: &Config) -> Self {
        let state = StudyState {
            level: config.study_level,
            ..Default::default()
        };
        Self {
            provider,
            request_timeout: config.request_timeout(),
            illustration_timeout: config.illustration_timeout(),
            state: Arc::new(RwLock::new(state)),
            illustration_permits: Arc::new(Semaphore::new(config.max_concurrent_illustrations.max(1))),
            illustrations_pending: Arc::new(watch::Sender::new(0)),
        }
    }

    /// 覆盖超时设置
    pub fn with_timeouts(mut self, request: Duration, illustration: Duration) -> Self {
        self.request_timeout = request;
        self.illustration_timeout = illustration;
        self
    }

    // ========== 文档与年级 ==========

    /// 加载新文档，清空全部学习材料
    pub async fn load_document(&self, name: Option<String>, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.state.write().await;
        info!(
            "📄 加载文档 {}（{} 字）",
            name.as_deref().unwrap_or("<未命名>"),
            text.chars().count()
        );
        state.source_text = text;
        state.document_name = name;
        state.document_epoch += 1;
        state.active = None;
        state.store.clear();
    }

    /// 修改年级，已生成的材料保持不变
    pub async fn set_level(&self, level: StudyLevel) {
        let mut state = self.state.write().await;
        if state.level != level {
            info!("🎓 年级切换为 {}", level.label());
            state.level = level;
        }
    }

    pub async fn level(&self) -> StudyLevel {
        self.state.read().await.level
    }

    // ========== 材料生成 ==========

    /// 生成一种学习材料
    ///
    /// 摘要的插图在后台继续生成，调用 `wait_for_illustrations` 可以等待它们结束
    pub async fn generate(&self, request: ArtifactRequest) -> AppResult<ArtifactKind> {
        let kind = request.kind();

        let (primary, epoch) = {
            let mut state = self.state.write().await;
            if !state.has_document() {
                return Err(AppError::NoDocument);
            }
            state.active = Some(kind);
            state.in_flight += 1;
            match kind {
                ArtifactKind::Summary => state.store.illustrations_mut().reset(),
                ArtifactKind::Test => {
                    if let Some(session) = state.store.test_mut() {
                        session.discard_attempt();
                    }
                }
                _ => {}
            }
            let primary = PrimaryRequest {
                request,
                source_text: state.source_text.clone(),
                level: state.level,
            };
            (primary, state.document_epoch)
        };

        info!("📝 开始生成{}（{}）", kind.label(), primary.level.label());
        let outcome = with_timeout(self.request_timeout, self.provider.generate_primary(&primary))
            .await
            .and_then(|artifact| ensure_matches(request, artifact));

        let mut state = self.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);

        if state.document_epoch != epoch {
            warn!("⚠️ 生成{}期间文档已更换，结果丢弃", kind.label());
            return Err(AppError::DocumentChanged { kind });
        }

        let artifact = match outcome {
            Ok(artifact) => artifact,
            Err(source) => {
                error!("❌ 生成{}失败: {}", kind.label(), source);
                return Err(AppError::generation_failed(kind, source));
            }
        };

        let prompts: Vec<String> = match &artifact {
            Artifact::Summary(summary) => summary
                .image_prompts()
                .map(|(_, prompt)| prompt.to_string())
                .collect(),
            _ => Vec::new(),
        };
        let round = state.store.put(artifact);
        drop(state);

        info!("✅ {}生成完成", kind.label());
        if let Some(round) = round {
            self.spawn_illustrations(round, prompts);
        }
        Ok(kind)
    }

    /// 切换到某种材料，不调用内容提供方；返回是否已有数据
    pub async fn show(&self, kind: ArtifactKind) -> bool {
        let mut state = self.state.write().await;
        state.active = Some(kind);
        state.store.contains(kind)
    }

    pub async fn view(&self, kind: ArtifactKind) -> Option<ArtifactView> {
        self.state.read().await.store.view(kind)
    }

    pub async fn is_busy(&self) -> bool {
        self.state.read().await.in_flight > 0
    }

    pub async fn active(&self) -> Option<ArtifactKind> {
        self.state.read().await.active
    }

    pub async fn illustration_statuses(&self) -> BTreeMap<usize, IllustrationStatus> {
        self.state.read().await.store.illustrations().statuses().clone()
    }

    pub async fn snapshot(&self) -> StudySnapshot {
        let state = self.state.read().await;
        StudySnapshot {
            document_name: state.document_name.clone(),
            has_document: state.has_document(),
            level: state.level,
            active: state.active,
            busy: state.in_flight > 0,
            view: state.active.and_then(|kind| state.store.view(kind)),
            illustrations: state.store.illustrations().statuses().clone(),
            test_phase: state.store.test_phase(),
        }
    }

    // ========== 插图 ==========

    fn spawn_illustrations(&self, round: u64, prompts: Vec<String>) {
        debug!("🖼️ 第 {} 轮插图: {} 个章节", round, prompts.len());
        for (index, prompt) in prompts.into_iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let permits = Arc::clone(&self.illustration_permits);
            let state = Arc::clone(&self.state);
            let timeout = self.illustration_timeout;
            let pending = PendingIllustration::track(&self.illustrations_pending);

            // 不保存句柄：任务在会话之外独立运行到结束
            tokio::spawn(async move {
                let _pending = pending;
                let status = match illustrate(provider.as_ref(), &permits, timeout, index, &prompt).await {
                    Ok(Some(image)) => IllustrationStatus::Ready(image),
                    Ok(None) => IllustrationStatus::NoImage,
                    Err(e) => {
                        warn!("⚠️ {}", e);
                        IllustrationStatus::Failed
                    }
                };

                let mut state = state.write().await;
                if !state.store.illustrations_mut().record(round, index, status) {
                    debug!("丢弃过期插图结果: 第 {} 轮第 {} 节", round, index);
                }
            });
        }
    }

    /// 等待所有已派生的插图任务结束
    ///
    /// 中途放弃等待不会影响任务本身
    pub async fn wait_for_illustrations(&self) {
        let mut pending = self.illustrations_pending.subscribe();
        let _ = pending.wait_for(|count| *count == 0).await;
    }

    // ========== 测验 ==========

    pub async fn test_phase(&self) -> TestPhase {
        self.state.read().await.store.test_phase()
    }

    /// 记录一道题的作答
    pub async fn record_answer(&self, question_id: &str, text: impl Into<String>) -> AppResult<()> {
        let mut state = self.state.write().await;
        let session = state.store.test_mut().ok_or(SessionError::NoTest)?;
        session.record_answer(question_id, text)?;
        Ok(())
    }

    /// 提交测验并等待批改
    ///
    /// 批改失败或结果不完整时回到可作答状态，作答保留
    pub async fn submit(&self) -> AppResult<GradeResult> {
        let (ticket, request) = {
            let mut state = self.state.write().await;
            let level = state.level;
            let source_text = state.source_text.clone();
            let session = state.store.test_mut().ok_or(SessionError::NoTest)?;
            let ticket = session.begin_submit()?;
            let request = GradingRequest {
                source_text,
                questions: session.questions().to_vec(),
                answers: session.answers().clone(),
                level,
            };
            (ticket, request)
        };

        info!(
            "📤 提交测验: 已作答 {}/{}",
            request.answers.len(),
            request.questions.len()
        );
        let outcome = with_timeout(self.request_timeout, self.provider.grade_test(&request))
            .await
            .and_then(|grade| {
                grade.verify_against(&request.questions)?;
                Ok(grade)
            });

        let mut state = self.state.write().await;
        let session = state
            .store
            .test_mut()
            .ok_or(SessionError::AttemptSuperseded)?;

        match outcome {
            Ok(grade) => {
                session.complete_grading(&ticket, grade.clone())?;
                info!("✅ 批改完成: {}/{}", grade.score, grade.max_score);
                Ok(grade)
            }
            Err(source) => {
                session.abort_grading(&ticket)?;
                warn!("⚠️ 批改失败，作答已保留: {}", source);
                Err(AppError::grading_failed(source))
            }
        }
    }

    /// 重做测验：清空作答和成绩，题目不变
    pub async fn retry(&self) -> AppResult<()> {
        let mut state = self.state.write().await;
        let session = state.store.test_mut().ok_or(SessionError::NoTest)?;
        session.retry()?;
        info!("🔁 重新作答测验");
        Ok(())
    }
}

/// 校验返回的材料与请求一致
fn ensure_matches(request: ArtifactRequest, artifact: Artifact) -> ProviderResult<Artifact> {
    if artifact.kind() != request.kind() {
        return Err(ProviderError::malformed(format!(
            "请求 {}，返回 {}",
            request.kind(),
            artifact.kind()
        )));
    }
    if let (Some(expected), Artifact::Test(question_set)) = (request.test_type(), &artifact) {
        ensure_question_set(expected, question_set)?;
    }
    Ok(artifact)
}

/// 题目集合必须非空、id 唯一且非空白、每道题的题型与请求一致
///
/// 批改结果的完整性校验依赖 id 唯一
fn ensure_question_set(expected: TestType, question_set: &QuestionSet) -> ProviderResult<()> {
    if question_set.test_type != expected {
        return Err(ProviderError::malformed(format!(
            "请求{}，返回{}",
            expected.label(),
            question_set.test_type.label()
        )));
    }
    if question_set.is_empty() {
        return Err(ProviderError::malformed("测验没有题目"));
    }

    let mut seen = HashSet::new();
    for question in &question_set.questions {
        if question.id.trim().is_empty() {
            return Err(ProviderError::malformed("题目 id 为空"));
        }
        if !seen.insert(question.id.as_str()) {
            return Err(ProviderError::malformed(format!("题目 id 重复: {}", question.id)));
        }
        if question.test_type() != expected {
            return Err(ProviderError::malformed(format!(
                "题目 {} 的题型为{}，请求{}",
                question.id,
                question.test_type().label(),
                expected.label()
            )));
        }
    }
    Ok(())
}

async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = ProviderResult<T>>,
) -> ProviderResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(ProviderError::Timeout(limit)))
}

async fn illustrate(
    provider: &dyn ContentProvider,
    permits: &Semaphore,
    timeout: Duration,
    index: usize,
    prompt: &str,
) -> Result<Option<String>, IllustrationError> {
    let _permit = permits.acquire().await.map_err(|e| IllustrationError {
        index,
        source: ProviderError::request("illustration", e),
    })?;
    with_timeout(timeout, provider.generate_illustration(prompt))
        .await
        .map_err(|source| IllustrationError { index, source })
}

/// 插图任务计数，任务结束（包括 panic）时自动减一
struct PendingIllustration(Arc<watch::Sender<usize>>);

impl PendingIllustration {
    fn track(counter: &Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|count| *count += 1);
        Self(Arc::clone(counter))
    }
}

impl Drop for PendingIllustration {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count = count.saturating_sub(1));
    }
}
