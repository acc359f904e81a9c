use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use taskmill_core::impls::{InMemoryTaskStore, ScriptedWork};
use taskmill_core::ports::SystemClock;
use taskmill_core::{NewTask, Priority, SchedulerBuilder, SchedulerConfig, StatusCounts, TaskService, TaskStatus};

#[derive(Debug, Parser)]
#[command(name = "taskmill", about = "Priority-ordered task scheduler demo")]
struct Args {
    /// TOML config file; missing keys use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override processing_interval_millis
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after this many cycles (runs until Ctrl-C when omitted)
    #[arg(long)]
    cycles: Option<u64>,

    /// Override simulated_work_millis
    #[arg(long)]
    work_ms: Option<u64>,

    /// Print the final status counts as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> anyhow::Result<SchedulerConfig> {
    let mut config = match &args.config {
        Some(path) => SchedulerConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SchedulerConfig {
            processing_interval_millis: 2_000,
            simulated_work_millis: 200,
            ..Default::default()
        },
    };
    if let Some(ms) = args.interval_ms {
        config.processing_interval_millis = ms;
    }
    if let Some(ms) = args.work_ms {
        config.simulated_work_millis = ms;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(?config, "starting taskmill");

    // (A) store と work を用意
    let clock = Arc::new(SystemClock);
    let store = Arc::new(InMemoryTaskStore::with_clock(clock.clone()));
    // "flaky report" は 1 回だけ失敗し、次の cycle で完了する
    let work = Arc::new(ScriptedWork::new().with_delay(config.simulated_work()));
    work.fail_times("flaky report", 1);

    // (B) scheduler と service をつなぐ
    let scheduler = Arc::new(
        SchedulerBuilder::new(store.clone())
            .config(config)
            .work(work)
            .clock(clock.clone())
            .build(),
    );
    let service = TaskService::new(store.clone(), scheduler.clone(), clock);

    // (C) デモ用のタスクを投入
    for (title, priority) in [
        ("write changelog", Priority::Low),
        ("fix login outage", Priority::High),
        ("flaky report", Priority::Medium),
        ("review backlog", Priority::Medium),
    ] {
        service.create_task(NewTask::new(title, priority)).await?;
    }

    // (D) Ctrl-C で停止、もしくは cycle 数の上限で終了
    let cancel = scheduler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("ctrl-c received; shutting down");
            cancel.cancel();
        }
    });
    scheduler.clone().spawn(args.cycles).join().await;

    let counts = StatusCounts::collect(store.as_ref(), scheduler.queue()).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        println!(
            "pending={} active={} completed={} queued={}",
            counts.pending, counts.active, counts.completed, counts.queued
        );
        for task in service.tasks_by_status(TaskStatus::Pending).await? {
            println!("  still pending: {} ({})", task.title, task.id);
        }
    }
    Ok(())
}
