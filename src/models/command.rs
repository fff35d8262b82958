use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One external process invocation: program plus argv, never a shell string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Positions in `args` holding credentials; masked wherever the command is shown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secret_args: Vec<usize>,
}

const MASK: &str = "****";

impl CommandSpec {
    pub fn new<I, S>(name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            secret_args: Vec::new(),
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn secret_arg(mut self, index: usize) -> Self {
        self.secret_args.push(index);
        self
    }

    /// `program arg1 arg2`, for logs and reports. Secret args print as `****`.
    pub fn display_line(&self) -> String {
        let args = self.args.iter().enumerate().map(|(i, arg)| {
            if self.secret_args.contains(&i) {
                MASK
            } else {
                arg.as_str()
            }
        });
        std::iter::once(self.program.as_str())
            .chain(args)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Mask any secret arg value that a process echoed back.
    pub fn scrub(&self, text: &str) -> String {
        self.secret_args
            .iter()
            .filter_map(|&i| self.args.get(i))
            .filter(|secret| !secret.is_empty())
            .fold(text.to_string(), |text, secret| text.replace(secret.as_str(), MASK))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub duration_ms: u64,
}

/// Outcome of one step inside a tool run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: String,
    pub command: String,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolReport {
    pub tool: String,
    pub success: bool,
    pub steps: Vec<StepReport>,
}

impl ToolReport {
    pub fn render(&self) -> String {
        let mut text = format!(
            "{} {}\n",
            self.tool,
            if self.success { "succeeded" } else { "failed" }
        );
        for step in &self.steps {
            let marker = if step.success { "ok" } else { "FAILED" };
            text.push_str(&format!("  [{}] {} ({})\n", marker, step.step, step.command));
            for line in step.output.lines().filter(|l| !l.trim().is_empty()) {
                text.push_str(&format!("      {}\n", line));
            }
        }
        text
    }
}

/// Entry in the tool listing.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
}
