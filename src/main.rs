use anyhow::{bail, Context, Result};
use study_artifacts::{logger, App, Config, StudyLevel, TestType};

const USAGE: &str = "用法: study_artifacts <文档路径.txt> [年级 1-6] [mc|open]";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(document_path) = args.next() else {
        bail!(USAGE);
    };

    // 加载配置：STUDY_CONFIG 指向 TOML 文件时先读文件，再用环境变量覆盖
    let mut config = match std::env::var("STUDY_CONFIG") {
        Ok(path) => Config::from_file(&path).with_context(|| format!("加载配置 {} 失败", path))?,
        Err(_) => Config::from_env()?,
    };

    if let Some(level) = args.next() {
        config.study_level = level
            .parse::<StudyLevel>()
            .map_err(|e| anyhow::anyhow!("{}\n{}", e, USAGE))?;
    }
    let test_type = match args.next().as_deref() {
        None | Some("mc") => TestType::MultipleChoice,
        Some("open") => TestType::OpenQuestions,
        Some(other) => bail!("未知测验类型: {}\n{}", other, USAGE),
    };

    // 初始化日志
    logger::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config, &document_path)
        .await?
        .with_test_type(test_type)
        .run()
        .await?;

    Ok(())
}
