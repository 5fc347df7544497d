use clap::{Args, Parser, Subcommand};
use hoist::config::{load_config, HoistConfig};
use hoist::deploy::{DeployRequest, DeployRunner, Operation};
use hoist::display::{DeployProgress, Spinner};
use hoist::error::{suggestion_for, HoistError};
use hoist::health::WorkflowClient;
use hoist::subprocess::SubprocessManager;
use std::path::PathBuf;
use tracing::{debug, error, trace};

/// Deploy cloud stacks and follow them until they settle
#[derive(Parser)]
#[command(name = "hoist", version)]
#[command(about = "Deploy cloud stacks and follow them until they settle", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update stacks
    Deploy(DeployArgs),
    /// Tear down stacks
    Destroy(DeployArgs),
    /// Operate on a single stack
    Stack {
        #[command(subcommand)]
        command: StackCommands,
    },
    /// Follow a log group until interrupted
    Logs {
        /// Log group to follow
        group: String,

        /// Only follow these streams (repeatable)
        #[arg(long = "stream")]
        streams: Vec<String>,

        /// Provider-side filter pattern
        #[arg(long)]
        filter: Option<String>,

        /// Credential profile
        #[arg(long)]
        profile: Option<String>,
    },
    /// Wait until a workflow service answers its health check
    Health {
        /// Base URL of the service
        endpoint: String,
    },
}

#[derive(Subcommand)]
enum StackCommands {
    /// Delete a stack and wait for the deletion to finish
    Delete {
        /// Stack name or ID
        stack_id: String,

        /// Credential profile
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Args)]
struct DeployArgs {
    /// Stacks to act on (default: all stacks in the app)
    stacks: Vec<String>,

    /// Credential profile passed to the deployment tool
    #[arg(long)]
    profile: Option<String>,

    /// Directory containing the infrastructure app
    #[arg(short = 'C', long, default_value = ".")]
    dir: PathBuf,

    /// Write tool output here instead of a temporary directory; removed afterwards
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the tool's raw output above the progress bar
    #[arg(long)]
    show_output: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,hyper=debug,aws_smithy_runtime=debug", // -vvv shows everything including dependencies
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("Hoist started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli).await {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e:#}");
        if let Some(hint) = suggestion_for(&format!("{e:#}")) {
            eprintln!("Hint: {hint}");
        }
        let code = e
            .downcast_ref::<HoistError>()
            .map(HoistError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())
        .await
        .map_err(HoistError::from)?;

    match cli.command {
        Commands::Deploy(args) => run_deploy(&config, Operation::Deploy, args).await,
        Commands::Destroy(args) => run_deploy(&config, Operation::Destroy, args).await,
        Commands::Stack {
            command: StackCommands::Delete { stack_id, profile },
        } => run_stack_delete(&config, stack_id, profile).await,
        Commands::Logs {
            group,
            streams,
            filter,
            profile,
        } => run_logs(&config, group, streams, filter, profile).await,
        Commands::Health { endpoint } => run_health(&config, endpoint).await,
    }
}

async fn run_deploy(
    config: &HoistConfig,
    operation: Operation,
    args: DeployArgs,
) -> anyhow::Result<()> {
    let runner = DeployRunner::new(
        SubprocessManager::production().runner(),
        config.deploy.clone(),
    )
    .with_capacity(config.queue_capacity);

    let mut request = DeployRequest::new(operation, args.dir).targets(args.stacks);
    if let Some(profile) = args.profile {
        request = request.profile(profile);
    }
    if let Some(output) = args.output {
        request = request.output_dir(output);
    }

    let mut handle = runner.execute(&request).await?;
    let progress = DeployProgress::new(&format!("Running {}", operation), args.show_output);

    // Drain until the queue closes; the scratch directory is removed just before that
    let mut failure = None;
    while let Some(event) = handle.recv().await {
        match event.error {
            Some(err) => failure = Some(err),
            None => progress.update(&event),
        }
    }

    match failure {
        Some(err) => {
            progress.error(&format!("{} failed", operation));
            Err(HoistError::from(err).into())
        }
        None => {
            progress.success(&format!("{} complete", operation));
            Ok(())
        }
    }
}

#[cfg(feature = "aws")]
async fn run_stack_delete(
    config: &HoistConfig,
    stack_id: String,
    profile: Option<String>,
) -> anyhow::Result<()> {
    use hoist::cloud::aws::{load_sdk_config, CloudFormationStacks};
    use hoist::stack::StackPoller;
    use std::sync::Arc;

    let profile = profile.or_else(|| config.deploy.profile.clone());
    let sdk_config = load_sdk_config(profile.as_deref()).await;
    let poller = StackPoller::new(
        Arc::new(CloudFormationStacks::new(&sdk_config)),
        config.stack.clone(),
    )
    .with_capacity(config.queue_capacity);

    let mut handle = poller
        .track_deletion(&stack_id)
        .await
        .map_err(HoistError::from)?;
    let spinner = Spinner::new(&format!("Deleting stack {}", stack_id));

    let result = handle.recv().await.map(|result| result.into_result());
    match result {
        Some(Ok(())) => {
            spinner.success(&format!("Stack {} deleted", stack_id));
            Ok(())
        }
        Some(Err(err)) => {
            spinner.error(&format!("Stack {} was not deleted", stack_id));
            Err(HoistError::from(err).into())
        }
        None => {
            spinner.error("Deletion tracking stopped");
            Err(HoistError::other("stack deletion tracking ended without a result").into())
        }
    }
}

#[cfg(feature = "aws")]
async fn run_logs(
    config: &HoistConfig,
    group: String,
    streams: Vec<String>,
    filter: Option<String>,
    profile: Option<String>,
) -> anyhow::Result<()> {
    use hoist::cloud::aws::{load_sdk_config, CloudWatchLogStore};
    use hoist::error::ErrorCode;
    use hoist::logs::LogTailer;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    let mut tail_config = config.logs.clone();
    if filter.is_some() {
        tail_config.filter_pattern = filter;
    }

    let profile = profile.or_else(|| config.deploy.profile.clone());
    let sdk_config = load_sdk_config(profile.as_deref()).await;
    let tailer = LogTailer::new(Arc::new(CloudWatchLogStore::new(&sdk_config)), tail_config)
        .with_capacity(config.queue_capacity);

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Interrupted, stopping log tail");
                cancel.cancel();
            }
        })
    };

    let mut handle = tailer.tail(cancel, &group, &streams);
    while let Some(event) = handle.recv().await {
        if let Some(err) = event.error {
            interrupt.abort();
            return Err(HoistError::monitor_with_code(
                ErrorCode::MONITOR_LOG_QUERY_FAILED,
                format!("log tail of {} stopped: {}", group, err),
            )
            .with_source(err)
            .into());
        }
        for line in event.logs {
            println!("{line}");
        }
    }

    interrupt.abort();
    Ok(())
}

#[cfg(not(feature = "aws"))]
async fn run_stack_delete(
    _config: &HoistConfig,
    _stack_id: String,
    _profile: Option<String>,
) -> anyhow::Result<()> {
    Err(aws_disabled("stack delete"))
}

#[cfg(not(feature = "aws"))]
async fn run_logs(
    _config: &HoistConfig,
    _group: String,
    _streams: Vec<String>,
    _filter: Option<String>,
    _profile: Option<String>,
) -> anyhow::Result<()> {
    Err(aws_disabled("logs"))
}

#[cfg(not(feature = "aws"))]
fn aws_disabled(command: &str) -> anyhow::Error {
    HoistError::config(format!(
        "`hoist {}` needs AWS support; rebuild with `--features aws`",
        command
    ))
    .into()
}

async fn run_health(config: &HoistConfig, endpoint: String) -> anyhow::Result<()> {
    let spinner = Spinner::new(&format!("Waiting for {}", endpoint));

    match WorkflowClient::connect(&endpoint, &config.health).await {
        Ok(client) => {
            spinner.success(&format!("{} is healthy", client.endpoint()));
            Ok(())
        }
        Err(err) => {
            spinner.error(&format!("{} is not healthy", endpoint));
            Err(HoistError::from(err).into())
        }
    }
}
