use std::fmt;
use std::path::PathBuf;

/// What the deployment tool is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Deploy,
    Destroy,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Deploy => "deploy",
            Operation::Destroy => "destroy",
        }
    }

    /// Flags that keep the tool from stopping for an interactive prompt
    fn unattended_flags(&self) -> &'static [&'static str] {
        match self {
            Operation::Deploy => &["--require-approval", "never"],
            Operation::Destroy => &["--force"],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One invocation of the deployment tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub operation: Operation,
    /// Stacks to act on; empty selects every stack in the app
    pub targets: Vec<String>,
    /// Credential profile passed through to the tool
    pub profile: Option<String>,
    /// Directory holding the infrastructure app
    pub working_dir: PathBuf,
    /// Where the tool writes its synthesized output. A fresh temporary
    /// directory under `working_dir` is used when unset.
    pub output_dir: Option<PathBuf>,
}

impl DeployRequest {
    pub fn new(operation: Operation, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            operation,
            targets: Vec::new(),
            profile: None,
            working_dir: working_dir.into(),
            output_dir: None,
        }
    }

    pub fn target(mut self, stack: impl Into<String>) -> Self {
        self.targets.push(stack.into());
        self
    }

    pub fn targets<I, S>(mut self, stacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.extend(stacks.into_iter().map(Into::into));
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Build the tool's argument vector, writing output to `output_dir`
    pub fn build_args(&self, output_dir: &std::path::Path) -> Vec<String> {
        let mut args = vec![self.operation.as_str().to_string()];

        if self.targets.is_empty() {
            args.push("--all".to_string());
        } else {
            args.extend(self.targets.iter().cloned());
        }

        if let Some(profile) = &self.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }

        args.extend(
            self.operation
                .unattended_flags()
                .iter()
                .map(|flag| flag.to_string()),
        );

        args.push("--output".to_string());
        args.push(output_dir.to_string_lossy().into_owned());
        args
    }
}
