use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ToolsConfig;
use crate::models::{CommandSpec, StepReport, ToolDescriptor, ToolReport};
use crate::services::{CommandExecutor, MigrationService};

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error("{0} is not configured")]
    MissingConfig(&'static str),
}

fn default_true() -> bool {
    true
}

fn default_commit_message() -> String {
    "Deploy latest changes".to_string()
}

fn default_pipeline_message() -> String {
    "Full deployment: GitHub + Vercel + Supabase".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GithubArgs {
    #[serde(default = "default_commit_message")]
    message: String,
    #[serde(default = "default_true", alias = "push_all")]
    push_all: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlutterArgs {
    #[serde(default, alias = "output_dir")]
    output_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VercelArgs {
    #[serde(default = "default_true")]
    build: bool,
    #[serde(default = "default_true")]
    production: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipelineArgs {
    #[serde(default = "default_pipeline_message")]
    message: String,
    #[serde(default = "default_true", alias = "build_flutter")]
    build_flutter: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MigrationArgs {
    #[serde(default, alias = "migration_file")]
    migration_file: Option<String>,
}

/// Named deployment operations over git, flutter, vercel and supabase CLIs.
pub struct DeploymentTools {
    executor: Arc<dyn CommandExecutor>,
    workdir: PathBuf,
    database_url: Option<String>,
    migrations: Option<MigrationService>,
}

impl DeploymentTools {
    pub fn new(executor: Arc<dyn CommandExecutor>, config: &ToolsConfig) -> Self {
        Self {
            executor,
            workdir: config.workdir.clone(),
            database_url: config.database_url.clone(),
            migrations: None,
        }
    }

    pub fn with_migrations(mut self, migrations: MigrationService) -> Self {
        self.migrations = Some(migrations);
        self
    }

    pub fn list_tools() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor {
                name: "deploy_to_github",
                description: "Commit all changes and push to origin",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "message": { "type": "string", "default": "Deploy latest changes" },
                        "pushAll": { "type": "boolean", "default": true }
                    }
                }),
            },
            ToolDescriptor {
                name: "build_flutter_web",
                description: "Build the Flutter web application",
                input_schema: json!({
                    "type": "object",
                    "properties": { "outputDir": { "type": "string" } }
                }),
            },
            ToolDescriptor {
                name: "deploy_to_vercel",
                description: "Deploy the web build to Vercel",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "build": { "type": "boolean", "default": true },
                        "production": { "type": "boolean", "default": true }
                    }
                }),
            },
            ToolDescriptor {
                name: "deploy_to_supabase",
                description: "Push pending Supabase migrations to the configured database",
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            ToolDescriptor {
                name: "full_deployment",
                description: "GitHub push, Flutter build, Vercel deploy and Supabase push in order",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "message": { "type": "string", "default": "Full deployment: GitHub + Vercel + Supabase" },
                        "buildFlutter": { "type": "boolean", "default": true }
                    }
                }),
            },
            ToolDescriptor {
                name: "check_deployment_status",
                description: "Report git working tree state and CLI availability",
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            ToolDescriptor {
                name: "run_database_migration",
                description: "Execute one SQL migration file against the configured database",
                input_schema: json!({
                    "type": "object",
                    "properties": { "migrationFile": { "type": "string" } },
                    "required": ["migrationFile"]
                }),
            },
        ]
    }

    fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, args: &Value) -> Result<T, ToolError> {
        let args = if args.is_null() { json!({}) } else { args.clone() };
        serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
            tool: tool.to_string(),
            reason: e.to_string(),
        })
    }

    fn step(&self, name: &str, program: &str, args: &[&str]) -> CommandSpec {
        CommandSpec::new(name, program, args.iter().copied()).in_dir(&self.workdir)
    }

    fn github_steps(&self, message: &str, push_all: bool) -> Vec<CommandSpec> {
        let mut steps = vec![
            self.step("stage changes", "git", &["add", "-A"]),
            self.step("commit", "git", &["commit", "-m", message]),
        ];
        if push_all {
            steps.push(self.step("push branches", "git", &["push", "origin", "--all"]));
            steps.push(self.step("push tags", "git", &["push", "origin", "--tags"]));
        } else {
            steps.push(self.step("push main", "git", &["push", "origin", "main"]));
        }
        steps
    }

    fn flutter_step(&self, output_dir: Option<&str>) -> CommandSpec {
        match output_dir {
            Some(dir) => self.step("flutter build", "flutter", &["build", "web", "--output", dir]),
            None => self.step("flutter build", "flutter", &["build", "web"]),
        }
    }

    fn vercel_step(&self, production: bool) -> CommandSpec {
        if production {
            self.step("vercel deploy", "npx", &["vercel", "--prod", "--yes"])
        } else {
            self.step("vercel deploy", "npx", &["vercel", "--yes"])
        }
    }

    fn supabase_step(&self) -> Result<CommandSpec, ToolError> {
        let url = self
            .database_url
            .as_deref()
            .ok_or(ToolError::MissingConfig("SUPABASE_DB_URL"))?;
        Ok(self
            .step(
                "supabase db push",
                "npx",
                &["supabase", "db", "push", "--db-url", url, "--include-all"],
            )
            .secret_arg(4))
    }

    /// The ordered commands a pipeline tool would run.
    pub fn plan(&self, tool: &str, args: &Value) -> Result<Vec<CommandSpec>, ToolError> {
        match tool {
            "deploy_to_github" => {
                let args: GithubArgs = Self::parse_args(tool, args)?;
                Ok(self.github_steps(&args.message, args.push_all))
            }
            "build_flutter_web" => {
                let args: FlutterArgs = Self::parse_args(tool, args)?;
                Ok(vec![self.flutter_step(args.output_dir.as_deref())])
            }
            "deploy_to_vercel" => {
                let args: VercelArgs = Self::parse_args(tool, args)?;
                let mut steps = Vec::new();
                if args.build {
                    steps.push(self.flutter_step(None));
                }
                steps.push(self.vercel_step(args.production));
                Ok(steps)
            }
            "deploy_to_supabase" => Ok(vec![self.supabase_step()?]),
            "full_deployment" => {
                let args: PipelineArgs = Self::parse_args(tool, args)?;
                let mut steps = self.github_steps(&args.message, true);
                if args.build_flutter {
                    steps.push(self.flutter_step(None));
                }
                steps.push(self.vercel_step(true));
                steps.push(self.supabase_step()?);
                Ok(steps)
            }
            "check_deployment_status" | "run_database_migration" => Ok(Vec::new()),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    pub async fn call(&self, tool: &str, args: Value, cancel: &CancellationToken) -> Result<ToolReport, ToolError> {
        info!("Running tool {}", tool);
        match tool {
            "check_deployment_status" => Ok(self.check_status(cancel).await),
            "run_database_migration" => {
                let args: MigrationArgs = Self::parse_args(tool, &args)?;
                let file = args.migration_file.ok_or_else(|| ToolError::InvalidArguments {
                    tool: tool.to_string(),
                    reason: "Migration file is required".to_string(),
                })?;
                self.run_migration_file(&file).await
            }
            _ => {
                let steps = self.plan(tool, &args)?;
                Ok(self.run_pipeline(tool, steps, cancel).await)
            }
        }
    }

    /// Runs steps in order and stops at the first one that fails.
    async fn run_pipeline(&self, tool: &str, steps: Vec<CommandSpec>, cancel: &CancellationToken) -> ToolReport {
        let mut reports = Vec::with_capacity(steps.len());
        let mut success = true;

        for spec in steps {
            let report = self.run_step(&spec, cancel).await;
            let failed = !report.success;
            reports.push(report);
            if failed {
                warn!("{} stopped at step '{}'", tool, spec.name);
                success = false;
                break;
            }
        }

        ToolReport {
            tool: tool.to_string(),
            success,
            steps: reports,
        }
    }

    async fn run_step(&self, spec: &CommandSpec, cancel: &CancellationToken) -> StepReport {
        match self.executor.run(spec, cancel).await {
            Ok(output) => {
                let mut text = output.stdout;
                if !output.stderr.trim().is_empty() {
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                    text.push_str(&output.stderr);
                }
                StepReport {
                    step: spec.name.clone(),
                    command: spec.display_line(),
                    success: output.success,
                    exit_code: Some(output.exit_code),
                    output: spec.scrub(&text),
                }
            }
            Err(e) => StepReport {
                step: spec.name.clone(),
                command: spec.display_line(),
                success: false,
                exit_code: None,
                output: spec.scrub(&e.to_string()),
            },
        }
    }

    /// Every check runs regardless of the others.
    async fn check_status(&self, cancel: &CancellationToken) -> ToolReport {
        let checks = [
            self.step("git", "git", &["status", "--porcelain"]),
            self.step("flutter", "flutter", &["--version"]),
            self.step("vercel cli", "npx", &["vercel", "--version"]),
            self.step("supabase cli", "npx", &["supabase", "--version"]),
        ];

        let mut steps = Vec::with_capacity(checks.len());
        for check in &checks {
            let mut report = self.run_step(check, cancel).await;
            if check.program == "git" && report.success {
                report.output = if report.output.trim().is_empty() {
                    "Working directory clean".to_string()
                } else {
                    format!("Uncommitted changes detected\n{}", report.output)
                };
            }
            steps.push(report);
        }

        ToolReport {
            tool: "check_deployment_status".to_string(),
            success: steps.iter().all(|s| s.success),
            steps,
        }
    }

    async fn run_migration_file(&self, file: &str) -> Result<ToolReport, ToolError> {
        let migrations = self
            .migrations
            .as_ref()
            .ok_or(ToolError::MissingConfig("SUPABASE_DB_URL"))?;

        let path = if Path::new(file).is_absolute() {
            PathBuf::from(file)
        } else {
            self.workdir.join(file)
        };

        let report = match migrations.apply_file(&path).await {
            Ok(elapsed) => StepReport {
                step: "apply migration".to_string(),
                command: path.display().to_string(),
                success: true,
                exit_code: None,
                output: format!("Migration {} applied in {:.2}s", file, elapsed.as_secs_f64()),
            },
            Err(e) => StepReport {
                step: "apply migration".to_string(),
                command: path.display().to_string(),
                success: false,
                exit_code: None,
                output: format!("{:#}", e),
            },
        };

        Ok(ToolReport {
            tool: "run_database_migration".to_string(),
            success: report.success,
            steps: vec![report],
        })
    }
}
