use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kestrel_builder::{Builder, BuiltGraph, StandardBuilder};
use kestrel_config::ExecutionContext;
use kestrel_host::{Capabilities, HttpPriceOracle, PriceOracle, StaticPriceOracle};
use kestrel_workflow::{ChannelNotifier, FailurePolicy, ScheduleConfig, Workflow};

/// Kestrel - declarative price-triggered automation workflows
#[derive(Parser)]
#[command(name = "kestrel")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.kestrel)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a workflow description, once or on a schedule
  Run(RunArgs),

  /// Build a workflow description and report problems without running it
  Check {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// Execution context file (wallet, network)
    #[arg(long)]
    context: Option<PathBuf>,
  },
}

#[derive(Args)]
struct RunArgs {
  /// Path to the workflow file (JSON)
  workflow_file: PathBuf,

  /// Pause between repeat cycles, overriding the description
  #[arg(long)]
  interval_ms: Option<u64>,

  /// Execution context file (wallet, network)
  #[arg(long)]
  context: Option<PathBuf>,

  /// Fixed prices for price feeds, e.g. --prices ETH=2500 BTC=60000
  #[arg(long, value_parser = parse_price, num_args = 1..)]
  prices: Vec<(String, f64)>,

  /// Fetch prices over HTTP instead; `{symbol}` is replaced in the URL
  #[arg(long, conflicts_with = "prices")]
  price_url: Option<String>,

  /// Stop a repeating schedule at the first failed cycle
  #[arg(long)]
  abort_on_failure: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kestrel=info,warn")),
    )
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".kestrel"),
  };

  match cli.command {
    Some(Commands::Run(args)) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(run_workflow(args, data_dir))?;
    }
    Some(Commands::Check {
      workflow_file,
      context,
    }) => {
      check_workflow(workflow_file, context, data_dir)?;
    }
    None => {
      println!("kestrel - use --help to see available commands");
    }
  }

  Ok(())
}

fn parse_price(raw: &str) -> Result<(String, f64), String> {
  let (symbol, price) = raw
    .split_once('=')
    .ok_or_else(|| format!("expected SYMBOL=PRICE, got '{}'", raw))?;
  let price: f64 = price
    .trim()
    .parse()
    .map_err(|e| format!("invalid price for {}: {}", symbol, e))?;
  Ok((symbol.trim().to_string(), price))
}

/// Explicit context file, else `<data-dir>/context.json` when present.
fn load_context(explicit: Option<&Path>, data_dir: &Path) -> Result<ExecutionContext> {
  let path = match explicit {
    Some(path) => path.to_path_buf(),
    None => {
      let default = data_dir.join("context.json");
      if !default.exists() {
        return Ok(ExecutionContext::default());
      }
      default
    }
  };
  let raw = std::fs::read_to_string(&path)
    .with_context(|| format!("failed to read context file: {}", path.display()))?;
  ExecutionContext::from_json(&raw)
    .with_context(|| format!("failed to parse context file: {}", path.display()))
}

/// `<data-dir>/schedule.json` when present, else defaults.
fn load_schedule(data_dir: &Path) -> Result<ScheduleConfig> {
  let path = data_dir.join("schedule.json");
  if !path.exists() {
    return Ok(ScheduleConfig::default());
  }
  let raw = std::fs::read_to_string(&path)
    .with_context(|| format!("failed to read schedule file: {}", path.display()))?;
  serde_json::from_str(&raw)
    .with_context(|| format!("failed to parse schedule file: {}", path.display()))
}

fn build(
  workflow_file: &Path,
  context: ExecutionContext,
  capabilities: Capabilities,
) -> Result<BuiltGraph> {
  let raw = std::fs::read_to_string(workflow_file)
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;
  StandardBuilder::with_context(capabilities, context)
    .build_json(&raw)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))
}

fn price_oracle(args: &RunArgs) -> Result<Arc<dyn PriceOracle>> {
  if let Some(template) = &args.price_url {
    let oracle = HttpPriceOracle::new(template.clone()).context("invalid --price-url")?;
    return Ok(Arc::new(oracle));
  }
  let oracle = args
    .prices
    .iter()
    .fold(StaticPriceOracle::new(), |oracle, (symbol, price)| {
      oracle.with_price(symbol, *price)
    });
  Ok(Arc::new(oracle))
}

async fn run_workflow(args: RunArgs, data_dir: PathBuf) -> Result<()> {
  let context = load_context(args.context.as_deref(), &data_dir)?;
  let mut schedule = load_schedule(&data_dir)?;
  if args.abort_on_failure {
    schedule.failure_policy = FailurePolicy::Abort;
  }

  let capabilities = Capabilities::in_memory().with_prices(price_oracle(&args)?);
  let graph = build(&args.workflow_file, context, capabilities)?;
  for diagnostic in &graph.diagnostics {
    eprintln!(
      "{:?} [{}]: {}",
      diagnostic.severity,
      diagnostic.node_id,
      diagnostic.message
    );
  }

  let interval_ms = args
    .interval_ms
    .or(graph.interval_ms)
    .unwrap_or(schedule.interval_ms);
  schedule.interval_ms = interval_ms;
  let interval = schedule.interval();

  let (notifier, mut entries) = ChannelNotifier::channel();
  let mut workflow = Workflow::new(graph.workflow_type, graph.nodes, graph.edges)
    .with_config(schedule)
    .with_notifier(notifier);

  let printer = tokio::spawn(async move {
    while let Some(entry) = entries.recv().await {
      match serde_json::to_string(&entry) {
        Ok(line) => println!("{}", line),
        Err(e) => warn!(error = %e, "failed to serialize log entry"),
      }
    }
  });

  let stop = workflow.stop_handle();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      info!("stop requested, finishing current cycle");
      stop.stop();
    }
  });

  info!(
    workflow_type = ?workflow.workflow_type(),
    interval_ms,
    nodes = workflow.nodes().len(),
    "starting workflow"
  );
  let result = workflow.start(interval).await;

  // Dropping the workflow closes the channel so the printer drains and exits.
  drop(workflow);
  printer.await.context("log printer task failed")?;

  let summary = result.context("workflow execution failed")?;
  eprintln!(
    "Completed {} cycle(s), {} failed{}",
    summary.cycles,
    summary.failed_cycles,
    if summary.stopped { ", stopped" } else { "" }
  );
  if let Some(report) = &summary.last_report {
    if !report.never_executed.is_empty() {
      eprintln!("Never executed: {}", report.never_executed.join(", "));
    }
  }

  Ok(())
}

fn check_workflow(workflow_file: PathBuf, context: Option<PathBuf>, data_dir: PathBuf) -> Result<()> {
  let context = load_context(context.as_deref(), &data_dir)?;
  let graph = build(&workflow_file, context, Capabilities::in_memory())?;

  for diagnostic in &graph.diagnostics {
    println!("{}", serde_json::to_string(diagnostic)?);
  }
  eprintln!(
    "{} node(s), {} edge(s), {} diagnostic(s)",
    graph.nodes.len(),
    graph.edges.len(),
    graph.diagnostics.len()
  );

  if graph.has_errors() {
    bail!("workflow has construction errors");
  }
  Ok(())
}
