// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use netpol_compat::{
    cluster::{ClusterProbe, ClusterSnapshot, KubeProbe, SnapshotProbe},
    compatibility::CompatibilityReport,
    config::Settings,
    constants::{DEFAULT_API_RETRIES, DEFAULT_LOG_FILTER, ENV_LOG_FORMAT, TOKIO_WORKER_THREADS},
    detection::{Detector, EnvironmentInfo},
    matrix::{feature_table, is_recipe_supported, support, supported_recipes, unsupported_recipes},
    planner::{generate_plan_with, should_run, ExecutionPlan},
    recipes::RecipeId,
    report::{load_results, write_reports, TestResult},
    types::{CniPlugin, Provider},
};
use schemars::schema_for;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Environment detection, CNI feature matrix and test planning for
/// Kubernetes NetworkPolicy recipes
#[derive(Parser, Debug)]
#[command(name = "netpol-compat", version, about, long_about = None)]
struct Cli {
    /// Answer cluster queries from a captured snapshot instead of the live cluster
    #[arg(long, global = true, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Output format for structured documents
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Timeout for a single cluster query, in seconds
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    request_timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the detected Kubernetes provider
    Provider,

    /// Print the detected CNI plugin
    Cni,

    /// Print provider, CNI, Kubernetes version and cluster facts
    Environment,

    /// Print the compatibility report for the detected environment
    Report,

    /// Check whether a recipe is supported by a CNI plugin (exit 1 when not)
    Check {
        /// Recipe identifier, e.g. `02a`
        recipe: RecipeId,
        /// CNI plugin, detected when omitted
        cni: Option<CniPlugin>,
    },

    /// List the recipes supported by a CNI plugin
    Supported {
        /// CNI plugin, detected when omitted
        cni: Option<CniPlugin>,
    },

    /// List the recipes not supported by a CNI plugin
    Unsupported {
        /// CNI plugin, detected when omitted
        cni: Option<CniPlugin>,
    },

    /// Print the feature support table of a CNI plugin
    Matrix {
        /// CNI plugin, detected when omitted
        cni: Option<CniPlugin>,
    },

    /// Decide whether a recipe should run here (exit 1 when skipped)
    ShouldRun {
        /// Recipe identifier, `00` for cluster bootstrap
        recipe: RecipeId,
        #[arg(long)]
        provider: Option<Provider>,
        #[arg(long)]
        cni: Option<CniPlugin>,
    },

    /// Print the execution plan for every recipe
    Plan {
        #[arg(long)]
        provider: Option<Provider>,
        #[arg(long)]
        cni: Option<CniPlugin>,
    },

    /// Aggregate recipe test results into report files
    Aggregate {
        /// JSON array of results, or TAP output with --tap
        #[arg(long, short)]
        input: PathBuf,
        /// Read the input as TAP
        #[arg(long)]
        tap: bool,
        /// Report directory, `RESULTS_DIR` or `test-results` when omitted
        #[arg(long, short)]
        output_dir: Option<PathBuf>,
    },

    /// Capture every cluster signal detection uses into a file
    Snapshot {
        /// Target file, YAML for `.yaml`/`.yml` and JSON otherwise
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Print the JSON Schema of a document
    Schema {
        #[arg(value_enum)]
        document: SchemaDocument,
    },

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    fn render<T: Serialize + ?Sized>(self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => serde_json::to_string_pretty(value).context("Failed to encode JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to encode YAML"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SchemaDocument {
    Environment,
    Report,
    Plan,
    Results,
}

/// What a command prints and whether the process exits successfully.
#[derive(Debug)]
struct Outcome {
    stdout: String,
    success: bool,
}

impl Outcome {
    fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            success: true,
        }
    }

    fn failed(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            success: false,
        }
    }
}

/// Settings plus the global flags, with lazy access to the cluster.
struct Session {
    settings: Settings,
    snapshot: Option<PathBuf>,
    format: OutputFormat,
}

impl Session {
    fn new(cli: &Cli, mut settings: Settings) -> Self {
        if let Some(secs) = cli.request_timeout {
            settings.request_timeout = Duration::from_secs(secs);
        }
        Self {
            settings,
            snapshot: cli.snapshot.clone(),
            format: cli.format,
        }
    }

    async fn probe(&self) -> Result<Arc<dyn ClusterProbe>> {
        let probe: Arc<dyn ClusterProbe> = match &self.snapshot {
            Some(path) => {
                debug!(path = %path.display(), "Using cluster snapshot");
                Arc::new(SnapshotProbe::from_file(path).await.with_context(|| {
                    format!("Failed to load cluster snapshot {}", path.display())
                })?)
            }
            None => Arc::new(
                KubeProbe::connect(self.settings.request_timeout, DEFAULT_API_RETRIES)
                    .await
                    .context("Failed to connect to the Kubernetes cluster")?,
            ),
        };
        Ok(probe)
    }

    /// Detector with command-line values taking precedence over the environment.
    async fn detector(
        &self,
        provider: Option<Provider>,
        cni: Option<CniPlugin>,
    ) -> Result<Detector> {
        Ok(Detector::new(self.probe().await?).with_overrides(
            provider.or(self.settings.provider_override),
            cni.or(self.settings.cni_override),
        ))
    }

    async fn resolve_provider(&self) -> Result<Provider> {
        if let Some(provider) = self.settings.provider_override {
            return Ok(provider);
        }
        let detector = self.detector(None, None).await?;
        Ok(detector
            .provider()
            .await
            .context("Provider detection failed")?
            .provider)
    }

    async fn resolve_cni(&self, cni: Option<CniPlugin>) -> Result<CniPlugin> {
        if let Some(cni) = cni.or(self.settings.cni_override) {
            return Ok(cni);
        }
        let detector = self.detector(None, None).await?;
        Ok(detector.cni().await.context("CNI detection failed")?.name)
    }

    /// Provider and CNI, touching the cluster only for what is not given.
    async fn resolve(
        &self,
        provider: Option<Provider>,
        cni: Option<CniPlugin>,
    ) -> Result<(Provider, CniPlugin)> {
        let provider = provider.or(self.settings.provider_override);
        let cni = cni.or(self.settings.cni_override);
        if let (Some(provider), Some(cni)) = (provider, cni) {
            return Ok((provider, cni));
        }

        let detector = self.detector(provider, cni).await?;
        let provider = detector
            .provider()
            .await
            .context("Provider detection failed")?
            .provider;
        let cni = detector.cni().await.context("CNI detection failed")?.name;
        Ok((provider, cni))
    }
}

fn check_recipe(recipe: RecipeId, cni: CniPlugin) -> Outcome {
    match recipe.required_feature() {
        Some(feature) if !is_recipe_supported(recipe, cni) => Outcome::failed(format!(
            "unsupported: {cni} has {} support for {feature}",
            support(cni, feature)
        )),
        _ => Outcome::ok("supported"),
    }
}

fn recipe_list(recipes: &[RecipeId]) -> String {
    recipes
        .iter()
        .map(|recipe| recipe.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

async fn execute(cli: Cli, settings: Settings) -> Result<Outcome> {
    let session = Session::new(&cli, settings);
    let format = session.format;
    debug!(command = ?cli.command, "Executing command");

    let outcome = match cli.command {
        Command::Provider => Outcome::ok(session.resolve_provider().await?.as_str()),
        Command::Cni => Outcome::ok(session.resolve_cni(None).await?.as_str()),
        Command::Environment => {
            let detector = session.detector(None, None).await?;
            let environment = detector
                .environment()
                .await
                .context("Environment detection failed")?;
            Outcome::ok(format.render(&environment)?)
        }
        Command::Report => {
            let (provider, cni) = session.resolve(None, None).await?;
            let report = CompatibilityReport::build(
                provider,
                cni,
                session.settings.plan_overrides(),
                Utc::now(),
            );
            Outcome::ok(format.render(&report)?)
        }
        Command::Check { recipe, cni } => check_recipe(recipe, session.resolve_cni(cni).await?),
        Command::Supported { cni } => {
            Outcome::ok(recipe_list(&supported_recipes(session.resolve_cni(cni).await?)))
        }
        Command::Unsupported { cni } => {
            Outcome::ok(recipe_list(&unsupported_recipes(session.resolve_cni(cni).await?)))
        }
        Command::Matrix { cni } => {
            Outcome::ok(format.render(&feature_table(session.resolve_cni(cni).await?))?)
        }
        Command::ShouldRun {
            recipe,
            provider,
            cni,
        } => {
            let (provider, cni) = session.resolve(provider, cni).await?;
            let decision = should_run(recipe, provider, cni);
            let stdout = format.render(&decision)?;
            if decision.run {
                Outcome::ok(stdout)
            } else {
                Outcome::failed(stdout)
            }
        }
        Command::Plan { provider, cni } => {
            let (provider, cni) = session.resolve(provider, cni).await?;
            let plan = generate_plan_with(provider, cni, session.settings.plan_overrides());
            Outcome::ok(format.render(&plan)?)
        }
        Command::Aggregate {
            input,
            tap,
            output_dir,
        } => {
            let results = load_results(&input, tap)
                .await
                .with_context(|| format!("Failed to load test results from {}", input.display()))?;
            let dir = output_dir.unwrap_or_else(|| session.settings.results_dir.clone());
            let summary = write_reports(&dir, &results, Utc::now())
                .await
                .with_context(|| format!("Failed to write reports to {}", dir.display()))?;
            Outcome::ok(format.render(&summary)?)
        }
        Command::Snapshot { output } => {
            let probe = session.probe().await?;
            let snapshot = ClusterSnapshot::capture(probe.as_ref())
                .await
                .context("Failed to capture cluster snapshot")?;
            snapshot
                .to_file(&output)
                .await
                .with_context(|| format!("Failed to write snapshot to {}", output.display()))?;
            info!(path = %output.display(), nodes = snapshot.nodes.len(), "Captured cluster snapshot");
            Outcome::ok(output.display().to_string())
        }
        Command::Schema { document } => {
            let schema = match document {
                SchemaDocument::Environment => schema_for!(EnvironmentInfo),
                SchemaDocument::Report => schema_for!(CompatibilityReport),
                SchemaDocument::Plan => schema_for!(ExecutionPlan),
                SchemaDocument::Results => schema_for!(Vec<TestResult>),
            };
            Outcome::ok(format.render(&schema)?)
        }
        Command::Completions { shell } => {
            let mut buffer = Vec::new();
            clap_complete::generate(shell, &mut Cli::command(), "netpol-compat", &mut buffer);
            Outcome::ok(String::from_utf8(buffer).context("Completion script is not UTF-8")?)
        }
    };

    Ok(outcome)
}

fn init_tracing() {
    // Documents go to stdout, so logs go to stderr and default to warnings only.
    // RUST_LOG overrides the filter, RUST_LOG_FORMAT=json switches to JSON lines.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    let log_format = std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let settings = Settings::from_env().context("Invalid environment configuration")?;
    debug!(?settings, "Loaded settings");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("netpol-compat")
        .enable_all()
        .build()?;

    let outcome = runtime.block_on(execute(cli, settings))?;
    if !outcome.stdout.is_empty() {
        println!("{}", outcome.stdout.trim_end());
    }

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
