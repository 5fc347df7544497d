use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::error::ProcessError;
use super::runner::{ExitStatus, ProcessCommand, ProcessRunner, ProcessStream};

/// Scripted stand-in for a spawned process.
///
/// Each expectation is consumed by exactly one `run_streaming` call, in the
/// order the expectations were registered.
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    expectations: Arc<Mutex<Vec<MockExpectation>>>,
    call_history: Arc<Mutex<Vec<ProcessCommand>>>,
}

#[derive(Clone)]
struct MockExpectation {
    program: String,
    stdout: Vec<String>,
    stderr: Vec<String>,
    status: ExitStatus,
    spawn_error: bool,
}

pub struct MockCommandConfig {
    runner: MockProcessRunner,
    expectation: MockExpectation,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_command(&self, program: &str) -> MockCommandConfig {
        MockCommandConfig {
            runner: self.clone(),
            expectation: MockExpectation {
                program: program.to_string(),
                stdout: Vec::new(),
                stderr: Vec::new(),
                status: ExitStatus::Success,
                spawn_error: false,
            },
        }
    }

    pub fn verify_called(&self, program: &str, times: usize) -> bool {
        let history = self.call_history.lock().unwrap();
        let count = history.iter().filter(|cmd| cmd.program == program).count();
        count == times
    }

    pub fn get_call_history(&self) -> Vec<ProcessCommand> {
        self.call_history.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run_streaming(&self, command: ProcessCommand) -> Result<ProcessStream, ProcessError> {
        self.call_history.lock().unwrap().push(command.clone());

        let expectation = {
            let mut expectations = self.expectations.lock().unwrap();
            let position = expectations
                .iter()
                .position(|e| e.program == command.program)
                .ok_or_else(|| {
                    ProcessError::MockExpectationNotMet(format!(
                        "No expectation found for command: {}",
                        command.display()
                    ))
                })?;
            expectations.remove(position)
        };

        if expectation.spawn_error {
            return Err(ProcessError::CommandNotFound(command.program));
        }

        let stdout = expectation.stdout.into_iter().map(Ok::<String, ProcessError>);
        let stderr = expectation.stderr.into_iter().map(Ok::<String, ProcessError>);
        let status = expectation.status;

        Ok(ProcessStream {
            stdout: Box::pin(futures::stream::iter(stdout)),
            stderr: Box::pin(futures::stream::iter(stderr)),
            status: Box::pin(async move { Ok(status) }),
        })
    }
}

impl MockCommandConfig {
    pub fn returns_stdout(mut self, lines: &[&str]) -> Self {
        self.expectation.stdout = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn returns_stderr(mut self, lines: &[&str]) -> Self {
        self.expectation.stderr = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn returns_exit_code(mut self, code: i32) -> Self {
        self.expectation.status = if code == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Error(code)
        };
        self
    }

    pub fn fails_to_spawn(mut self) -> Self {
        self.expectation.spawn_error = true;
        self
    }

    pub fn finish(self) {
        self.runner
            .expectations
            .lock()
            .unwrap()
            .push(self.expectation);
    }
}
