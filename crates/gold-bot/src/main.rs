//! 금 프리미엄 알림 봇 CLI.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gold_bot::{BotConfig, DailyTrigger, PremiumPipeline, Scheduler, SystemClock};
use gold_core::logging::{init_logging, LogConfig};

#[derive(Parser)]
#[command(name = "gold-bot")]
#[command(about = "Daily gold premium notification bot", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로 (기본: config/gold-bot.toml, 있을 때만)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 파이프라인을 한 번 실행하고 종료
    Run {
        /// 텔레그램으로 보내지 않고 메시지를 로그로만 출력
        #[arg(long)]
        dry_run: bool,
    },

    /// 데몬 모드: 매일 설정된 시각에 실행
    Daemon,

    /// 설정을 검증하고 유효 설정을 출력 (자격 증명은 가림)
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // `.env`의 RUST_LOG도 반영되도록 설정 로드(.env 포함)를 로깅 초기화보다 먼저 수행
    let dry_run = matches!(cli.command, Commands::Run { dry_run: true });
    let loaded = BotConfig::load(cli.config.as_deref(), dry_run);

    if let Err(e) = init_logging(LogConfig::from_env(&cli.log_level)) {
        eprintln!("로깅 초기화 실패: {e}");
        return ExitCode::FAILURE;
    }

    let result = match loaded.context("설정을 불러오지 못했습니다") {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: BotConfig) -> anyhow::Result<()> {
    tracing::debug!(source_file = ?config.source_file, "설정 로드 완료");

    match command {
        Commands::CheckConfig => {
            println!("{}", config.redacted());
            tracing::info!("설정 검증 완료");
        }
        Commands::Run { .. } => {
            let pipeline = PremiumPipeline::from_config(&config)?;
            let report = pipeline.run_once().await?;
            report.log_summary();
        }
        Commands::Daemon => {
            let pipeline = Arc::new(PremiumPipeline::from_config(&config)?);
            let clock = Arc::new(SystemClock);
            let trigger = DailyTrigger::new(
                config.schedule.trigger_time,
                config.schedule.timezone,
                clock.clone(),
            );
            let mut scheduler =
                Scheduler::new(pipeline, trigger, clock, config.schedule.timezone);

            let shutdown = scheduler.stop_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("종료 신호 수신, 데몬 종료 중...");
                    shutdown.cancel();
                }
            });

            tracing::info!(
                trigger_time = %config.schedule.trigger_time,
                timezone = %config.schedule.timezone,
                "=== 데몬 모드 시작 ==="
            );
            scheduler.start().await;
        }
    }

    Ok(())
}
