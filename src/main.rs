use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use unice_transcript::utils::logging::{log_startup, log_transcript_summary};
use unice_transcript::{logger, parse_transcript, Config, IntraClient, ParsedTranscript, TranscriptService};

/// Intracursus 成绩单工具
#[derive(Debug, Parser)]
#[command(name = "unice-transcript", version)]
struct Cli {
    /// TOML 配置文件（默认读取环境变量）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 格式化输出 JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 解析本地成绩单 PDF
    Parse { file: PathBuf },
    /// 列出可用学期
    Semesters,
    /// 显示学生姓名
    Whoami,
    /// 获取缺勤、迟到和排除记录
    Absences,
    /// 下载学生头像
    Avatar {
        /// 保存路径
        #[arg(long, default_value = "avatar.png")]
        output: PathBuf,
    },
    /// 登录并下载、解析成绩单
    Fetch {
        /// 学期名称，默认当前学期
        #[arg(long)]
        semester: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::from_toml_file(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display()))?,
        None => Config::from_env(),
    };

    // 初始化日志
    logger::init(config.verbose_logging);

    match cli.command {
        Command::Parse { file } => {
            log_startup("解析本地成绩单");
            let pdf = tokio::fs::read(&file)
                .await
                .with_context(|| format!("无法读取文件: {}", file.display()))?;

            let transcript = parse_transcript(&pdf).unwrap_or_else(|e| {
                warn!("⚠️ 成绩单解析失败: {}", e);
                ParsedTranscript::unavailable()
            });
            log_transcript_summary(&file.display().to_string(), &transcript);
            print_json(&transcript, cli.pretty)?;
        }
        Command::Semesters => {
            log_startup("学期列表");
            let mut client = login(&config).await?;
            for semester in client.semesters().await? {
                println!("{}", semester);
            }
            client.logout().await?;
        }
        Command::Whoami => {
            let client = login(&config).await?;
            println!("{}", client.student_name().await?);
            client.logout().await?;
        }
        Command::Absences => {
            log_startup("缺勤记录");
            let client = login(&config).await?;
            let report = client.absences().await?;
            print_json(&report, cli.pretty)?;
            client.logout().await?;
        }
        Command::Avatar { output } => {
            let client = login(&config).await?;
            match client.avatar().await? {
                Some(image) => {
                    tokio::fs::write(&output, &image)
                        .await
                        .with_context(|| format!("无法写入文件: {}", output.display()))?;
                    info!("✓ 头像已保存: {}", output.display());
                }
                None => warn!("⚠️ 没有可用的头像"),
            }
            client.logout().await?;
        }
        Command::Fetch { semester } => {
            log_startup("下载成绩单");
            let mut client = login(&config).await?;
            if client.is_demo() {
                bail!("演示账号没有真实成绩单");
            }

            client.semesters().await?;
            let semester = match semester.or_else(|| client.current_semester().map(str::to_string)) {
                Some(s) => s,
                None => bail!("没有当前学期，请使用 --semester 指定"),
            };

            let (username, _) = config.credentials()?;
            let service = TranscriptService::new(&config);
            let transcript = service.transcript(&client, username, &semester).await;
            log_transcript_summary(&semester, &transcript);
            print_json(&transcript, cli.pretty)?;
            client.logout().await?;
        }
    }

    Ok(())
}

/// 使用配置中的账号登录
async fn login(config: &Config) -> Result<IntraClient> {
    let (username, password) = config.credentials()?;
    let mut client = IntraClient::new(config)?;
    if !client.login(username, password).await? {
        bail!("登录失败：用户名或密码错误");
    }
    Ok(client)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
