use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{ArtifactKind, ArtifactRequest, StudyLevel, TestType};
use crate::orchestrator::StudySession;
use crate::services::LlmContentProvider;
use crate::store::ArtifactView;
use crate::utils::logging::{append_to_log_file, init_log_file, log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    document_path: PathBuf,
    test_type: TestType,
    session: StudySession,
}

impl App {
    /// 初始化应用：读取文档并准备学习会话
    pub async fn initialize(config: Config, document_path: impl AsRef<Path>) -> Result<Self> {
        let document_path = document_path.as_ref().to_path_buf();
        let document_name = document_path.display().to_string();

        // 初始化日志文件
        init_log_file(&config.output_log_file, &document_name)?;

        log_startup(&config);

        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 LLM_API_KEY，请求很可能被拒绝");
        }

        let text = tokio::fs::read_to_string(&document_path)
            .await
            .map_err(|e| AppError::io(&document_name, e))?;

        let provider = Arc::new(LlmContentProvider::new(&config));
        let session = StudySession::new(provider, &config);
        session.load_document(Some(document_name), text).await;

        Ok(Self {
            config,
            document_path,
            test_type: TestType::MultipleChoice,
            session,
        })
    }

    pub fn with_test_type(mut self, test_type: TestType) -> Self {
        self.test_type = test_type;
        self
    }

    pub fn session(&self) -> &StudySession {
        &self.session
    }

    /// 运行应用主逻辑：生成全部材料并输出 JSON
    pub async fn run(&self) -> Result<()> {
        let requests = [
            ArtifactRequest::Summary,
            ArtifactRequest::Glossary,
            ArtifactRequest::Flashcards,
            ArtifactRequest::Mindmap,
            ArtifactRequest::Test(self.test_type),
        ];
        let total = requests.len();

        info!("\n📚 开始为 {} 生成 {} 种学习材料", self.document_path.display(), total);
        let results = join_all(requests.iter().map(|request| self.session.generate(*request))).await;

        let mut failures = Vec::new();
        for (request, result) in requests.iter().zip(results) {
            if let Err(e) = result {
                failures.push(GenerationFailure {
                    kind: request.kind(),
                    error: e.to_string(),
                });
            }
        }

        info!("🖼️ 等待插图生成完成...");
        self.session.wait_for_illustrations().await;

        let mut artifacts = Vec::new();
        for kind in ArtifactKind::ALL {
            if let Some(view) = self.session.view(kind).await {
                artifacts.push(view);
            }
        }

        let report = StudyReport {
            document: self.document_path.display().to_string(),
            level: self.session.level().await,
            artifacts,
            failures,
        };
        let json = serde_json::to_string_pretty(&report)?;
        append_to_log_file(&self.config.output_log_file, "学习材料", &json)?;
        println!("{}", json);

        let failed = report.failures.len();
        print_final_stats(total - failed, failed, total, &self.config.output_log_file);

        Ok(())
    }
}

/// 输出报告
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StudyReport {
    document: String,
    level: StudyLevel,
    artifacts: Vec<ArtifactView>,
    failures: Vec<GenerationFailure>,
}

#[derive(Debug, Serialize)]
struct GenerationFailure {
    kind: ArtifactKind,
    error: String,
}
