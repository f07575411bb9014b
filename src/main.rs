use std::io;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use jobsched::command::run_command_loop;
use jobsched::config::{SchedulerConfig, Workload, DEFAULT_CAPACITY};
use jobsched::{OrderingPolicy, Scheduler, SchedulerError};

#[derive(Parser, Debug)]
#[command(name = "jobsched")]
#[command(version)]
#[command(about = "In-process job scheduler with FCFS, SJF and priority ordering")]
#[command(long_about = "Reads one command per line from stdin:\n  \
    a <seconds> <priority>  add a job (lower priority value runs first)\n  \
    f | s | p               switch to FCFS, SJF or priority mode\n  \
    m                       show the current mode\n  \
    q                       quit after running every queued job")]
struct Args {
    /// Maximum number of jobs waiting in the queue
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Scheduling mode at startup
    #[arg(long, value_enum, default_value = "fcfs")]
    mode: OrderingPolicy,

    /// How a job occupies the executor
    #[arg(long, value_enum, default_value = "busy-wait")]
    workload: Workload,

    /// Length of one requested second, in milliseconds
    #[arg(long, default_value = "1000")]
    time_unit_ms: u64,

    /// Format of the final summary
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = SchedulerConfig::default()
        .with_capacity(args.capacity)
        .with_policy(args.mode)
        .with_workload(args.workload)
        .with_time_unit(Duration::from_millis(args.time_unit_ms));

    let scheduler = Scheduler::start(config)?;

    // Producer loop runs on its own thread and is joined before the
    // executor, so the report is only read once both have exited.
    let producer_result: jobsched::Result<()> = std::thread::scope(|s| {
        let producer = std::thread::Builder::new()
            .name("producer".to_string())
            .spawn_scoped(s, || {
                run_command_loop(&scheduler, io::stdin().lock(), io::stdout())
            })?;
        producer
            .join()
            .unwrap_or(Err(SchedulerError::ThreadPanicked("producer")))
    });

    if let Err(e) = producer_result {
        tracing::error!(error = %e, "Command loop failed");
    }

    println!("Waiting for jobs still in queue to be executed...");
    let report = scheduler.shutdown()?;

    match args.output {
        OutputFormat::Table => println!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
