//! Deployment tool execution.
//!
//! [`DeployRunner`] launches the external deployment tool and turns its
//! output into [`ProgressEvent`]s. Every output line becomes one event, in
//! arrival order; lines that carry a step counter also fill in
//! `current_step`/`total_steps`. The last event has no lines and reports how
//! the tool exited. A scratch output directory handed to the runner is
//! removed after that last event is queued, whatever the outcome.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::DeployConfig;
use crate::error::codes::ErrorCode;
use crate::error::HoistError;
use crate::monitor::{EventSink, MonitorHandle};
use crate::subprocess::{
    ExitStatus, ProcessCommandBuilder, ProcessError, ProcessRunner, ProcessStream,
};

pub mod progress;
pub mod request;


pub use progress::{parse_line, StepProgress};
pub use request::{DeployRequest, Operation};

/// Prefix of scratch directories created by [`DeployRunner::execute`]
pub const SCRATCH_PREFIX: &str = ".hoist-out-";

/// Why a deployment run failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    #[error("deployment tool exited with code {code}")]
    Exited { code: i32 },

    #[error("deployment tool terminated by signal {0}")]
    Signaled(i32),

    #[error("failed to read deployment tool output: {0}")]
    Output(String),

    #[error("failed to wait for deployment tool: {0}")]
    Wait(String),
}

/// One unit of deployment tool output.
///
/// An event with `error` set is always the last one of its run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressEvent {
    pub current_step: Option<u32>,
    pub total_steps: Option<u32>,
    pub output_lines: Vec<String>,
    pub error: Option<DeployError>,
}

impl ProgressEvent {
    /// Wrap one output line, picking up its step counter if present
    pub fn from_line(line: String) -> Self {
        let step = parse_line(&line);
        Self {
            current_step: step.map(|s| s.current),
            total_steps: step.map(|s| s.total),
            output_lines: vec![line],
            error: None,
        }
    }

    /// The closing event of a run
    pub fn finished(outcome: Result<(), DeployError>) -> Self {
        Self {
            error: outcome.err(),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub struct DeployRunner {
    runner: Arc<dyn ProcessRunner>,
    config: DeployConfig,
    capacity: usize,
}

impl DeployRunner {
    pub fn new(runner: Arc<dyn ProcessRunner>, config: DeployConfig) -> Self {
        Self {
            runner,
            config,
            capacity: crate::monitor::DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Launch the tool with `args` from `working_dir`.
    ///
    /// A tool that cannot be started is reported here, before any background
    /// work exists.
    pub async fn run(
        &self,
        working_dir: &Path,
        args: Vec<String>,
    ) -> Result<MonitorHandle<ProgressEvent>, ProcessError> {
        let process = self.spawn(working_dir, args).await?;
        Ok(self.monitor(process, None))
    }

    /// Like [`run`](Self::run), and remove `scratch` once the tool exits.
    ///
    /// The directory is also removed when the tool fails to start.
    pub async fn run_with_scratch(
        &self,
        working_dir: &Path,
        args: Vec<String>,
        scratch: PathBuf,
    ) -> Result<MonitorHandle<ProgressEvent>, ProcessError> {
        match self.spawn(working_dir, args).await {
            Ok(process) => Ok(self.monitor(process, Some(scratch))),
            Err(err) => {
                remove_scratch(&scratch).await;
                Err(err)
            }
        }
    }

    /// Prepare the output directory for `request` and run it.
    ///
    /// The request's profile wins over the configured default profile.
    pub async fn execute(
        &self,
        request: &DeployRequest,
    ) -> crate::error::Result<MonitorHandle<ProgressEvent>> {
        let mut request = request.clone();
        if request.profile.is_none() {
            request.profile = self.config.profile.clone();
        }

        let scratch = prepare_scratch(&request).await?;
        let args = request.build_args(&scratch);
        debug!(
            "{} of {} in {} (output in {})",
            request.operation,
            describe_targets(&request.targets),
            request.working_dir.display(),
            scratch.display()
        );

        let handle = self
            .run_with_scratch(&request.working_dir, args, scratch)
            .await?;
        Ok(handle)
    }

    async fn spawn(
        &self,
        working_dir: &Path,
        args: Vec<String>,
    ) -> Result<ProcessStream, ProcessError> {
        let command = ProcessCommandBuilder::new(&self.config.program)
            .args(args)
            .current_dir(working_dir)
            .build();
        self.runner.run_streaming(command).await
    }

    fn monitor(&self, process: ProcessStream, scratch: Option<PathBuf>) -> MonitorHandle<ProgressEvent> {
        let (sink, handle) = EventSink::channel(self.capacity, None);
        tokio::spawn(drive(process, sink, scratch));
        handle
    }
}

/// Forward output lines until the tool exits, then report the outcome
async fn drive(process: ProcessStream, sink: EventSink<ProgressEvent>, scratch: Option<PathBuf>) {
    let ProcessStream {
        stdout,
        stderr,
        status,
    } = process;

    let mut output = futures::stream::select(stdout, stderr);
    let mut read_error = None;
    let mut consumer_gone = false;

    while let Some(line) = output.next().await {
        match line {
            Ok(line) => {
                trace!("deploy> {}", line);
                if !sink.send(ProgressEvent::from_line(line)).await {
                    debug!("Progress consumer went away, waiting for the tool to exit");
                    consumer_gone = true;
                    break;
                }
            }
            Err(err) => {
                warn!("Lost deployment tool output: {}", err);
                read_error = Some(DeployError::Output(err.to_string()));
                break;
            }
        }
    }
    // Closing the pipes lets a tool blocked on a full pipe exit
    drop(output);

    let outcome = match (read_error, status.await) {
        (Some(err), _) => Err(err),
        (None, Ok(ExitStatus::Success)) => Ok(()),
        (None, Ok(ExitStatus::Error(code))) => Err(DeployError::Exited { code }),
        (None, Ok(ExitStatus::Signal(signal))) => Err(DeployError::Signaled(signal)),
        (None, Err(err)) => Err(DeployError::Wait(err.to_string())),
    };

    if !consumer_gone {
        sink.send(ProgressEvent::finished(outcome)).await;
    }

    if let Some(dir) = scratch {
        remove_scratch(&dir).await;
    }
}

/// Create the directory the tool writes its output to
async fn prepare_scratch(request: &DeployRequest) -> crate::error::Result<PathBuf> {
    let scratch_error = |dir: &Path, err: std::io::Error| {
        HoistError::execution_with_code(
            ErrorCode::EXEC_GENERIC,
            format!("failed to create scratch directory {}", dir.display()),
            None,
        )
        .with_source(err)
    };

    match &request.output_dir {
        Some(dir) => {
            let dir = if dir.is_absolute() {
                dir.clone()
            } else {
                request.working_dir.join(dir)
            };
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| scratch_error(&dir, e))?;
            Ok(dir)
        }
        None => {
            let temp = tempfile::Builder::new()
                .prefix(SCRATCH_PREFIX)
                .tempdir_in(&request.working_dir)
                .map_err(|e| scratch_error(&request.working_dir, e))?;
            Ok(temp.keep())
        }
    }
}

/// Best-effort removal; failures are logged and otherwise ignored
async fn remove_scratch(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => debug!("Removed scratch directory {}", dir.display()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("Scratch directory {} already gone", dir.display())
        }
        Err(err) => warn!(
            "Failed to remove scratch directory {}: {}",
            dir.display(),
            err
        ),
    }
}

fn describe_targets(targets: &[String]) -> String {
    if targets.is_empty() {
        "all stacks".to_string()
    } else {
        targets.join(", ")
    }
}
