use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use sxf_config::{AppConfig, ConfigError, OutputConfig};
use sxf_engine::{Numbering, SXF_VERSION};
use sxf_io::{Destination, SfcWriter, WriterOptions};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod demo;

#[derive(Debug, Parser)]
#[command(name = "sxf-app", version, about = "写出 SXF Ver.3.1 示例图面 (.sfc)")]
struct Cli {
    /// 配置文件路径，缺省时按 SXF_CONFIG 或 ./config/default.toml 查找
    #[arg(long)]
    config: Option<PathBuf>,
    /// 输出路径；省略或为 `-` 时写入日志
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// 只做检查，不写出任何内容
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_configuration(cli.config);
    init_logging(&config);
    info!(sxf_version = SXF_VERSION, "启动 SXF 输出示例");

    let mut document =
        demo::build_document(Utc::now().date_naive()).context("构建示例图面失败")?;
    let destination = if cli.dry_run {
        Destination::Null
    } else {
        Destination::from_path(cli.output.as_deref())
    };

    let writer = SfcWriter::new(writer_options(&config.output));
    let summary = writer
        .output(&mut document, &destination)
        .with_context(|| format!("写出到 {destination} 失败"))?;
    info!(
        records = summary.records,
        last_instance = summary.last_instance,
        destination = %summary.destination,
        "已完成"
    );
    Ok(())
}

fn writer_options(config: &OutputConfig) -> WriterOptions {
    WriterOptions {
        numbering: Numbering {
            base: config.instance_base,
            step: config.instance_step,
        },
        author: config.author.clone(),
        organization: config.organization.clone(),
        translator: config.translator.clone(),
    }
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. }
                    | ConfigError::Parse { path, .. }
                    | ConfigError::Invalid { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
