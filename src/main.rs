use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use freesia_action::{ActionInvoker, GreetingAction, HttpActionInvoker};
use freesia_config::PipelineConfig;
use freesia_executor::WorkflowExecutor;
use freesia_job::{EchoJob, JobRunner, LocalJobRunner};
use freesia_store::{MemoryStore, Store};
use freesia_trigger::TriggerReceiver;
use freesia_workflow::ExecutionStatus;

mod server;

/// Freesia - a conditional batch-and-invoke workflow pipeline
#[derive(Parser)]
#[command(name = "freesia")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to a pipeline configuration file (JSON)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Trigger one execution and wait for its terminal record
  Run {
    /// The input number; read from the stdin payload when omitted
    #[arg(long)]
    n: Option<i64>,
  },

  /// Serve the HTTP trigger boundary
  Serve {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1:3004")]
    addr: String,
  },
}

fn main() -> Result<()> {
  init_tracing();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Run { n }) => {
      run(cli.config, n)?;
    }
    Some(Commands::Serve { addr }) => {
      serve(cli.config, addr)?;
    }
    None => {
      println!("freesia - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing() {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

  tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(config_path: Option<PathBuf>, n: Option<i64>) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_async(config_path, n).await })
}

async fn run_async(config_path: Option<PathBuf>, n: Option<i64>) -> Result<()> {
  let config = load_config(config_path).await?;

  // Build the trigger payload from --n, falling back to stdin
  let payload = match n {
    Some(n) => serde_json::json!({ "n": n }),
    None => read_payload_from_stdin()?,
  };
  eprintln!("Payload: {}", payload);

  let (receiver, store) = build_pipeline(config)?;

  let response = receiver
    .trigger(&payload)
    .await
    .context("trigger rejected the payload")?;

  eprintln!("Execution accepted: {}", response.execution_id);

  // The acknowledgement is immediate; the record is what we wait for
  receiver.wait_idle().await;

  let record = store
    .get_execution(&response.execution_id)
    .await
    .context("failed to load the execution record")?;

  println!("{}", serde_json::to_string_pretty(&record)?);

  if record.status != ExecutionStatus::Succeeded {
    bail!("execution ended {:?}", record.status);
  }

  Ok(())
}

fn serve(config_path: Option<PathBuf>, addr: String) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { serve_async(config_path, addr).await })
}

async fn serve_async(config_path: Option<PathBuf>, addr: String) -> Result<()> {
  let config = load_config(config_path).await?;
  let (receiver, store) = build_pipeline(config)?;
  server::start(receiver, store, &addr).await
}

/// Wire the pipeline the way the config describes it: the in-process job
/// system with the echo job registered under the configured name, and the
/// HTTP action when an endpoint is configured.
fn build_pipeline(config: PipelineConfig) -> Result<(TriggerReceiver, Arc<dyn Store>)> {
  let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

  let runner = LocalJobRunner::new().register(config.job.name.clone(), Arc::new(EchoJob));

  let action: Arc<dyn ActionInvoker> = match &config.action.endpoint {
    Some(endpoint) => Arc::new(
      HttpActionInvoker::new(endpoint).context("failed to configure the action endpoint")?,
    ),
    None => Arc::new(GreetingAction),
  };

  let executor = WorkflowExecutor::new(
    config,
    Arc::new(runner) as Arc<dyn JobRunner>,
    action,
    Arc::clone(&store),
  );

  let receiver = TriggerReceiver::new(Arc::new(executor), Arc::clone(&store));
  Ok((receiver, store))
}

async fn load_config(path: Option<PathBuf>) -> Result<PipelineConfig> {
  let Some(path) = path else {
    return Ok(PipelineConfig::default());
  };

  let content = tokio::fs::read_to_string(&path)
    .await
    .with_context(|| format!("failed to read config file: {}", path.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse config file: {}", path.display()))
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, use empty object
    Ok(serde_json::json!({}))
  } else {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read payload from stdin")?;

    if input.trim().is_empty() {
      Ok(serde_json::json!({}))
    } else {
      serde_json::from_str(&input).context("failed to parse payload JSON from stdin")
    }
  }
}
