//! Main CLI application structure

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::auth::{self, AuthCommands, AuthContext};
use super::cache_cmd::{self, CacheCommands};
use super::cycle::{self, CycleArgs};
use super::document::{self, DocumentCommands};
use super::issue::{self, IssueCommands};
use super::label::{self, LabelArgs};
use super::milestone::{self, MilestoneCommands};
use super::notification::{self, NotificationArgs};
use super::output::{Output, OutputFormat};
use super::project::{self, ProjectCommands};
use super::roadmap::{self, RoadmapCommands};
use super::saved;
use super::session::{Paging, Session, DEFAULT_LIMIT};
use super::team::{self, TeamCommands};
use super::user::{self, UserArgs};
use crate::api::LinearClient;
use crate::storage::{CacheStore, ConfigDir, Environment, SavedQueryStore};

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "LTUI_LOG";

#[derive(Parser)]
#[command(name = "ltui")]
#[command(author, version, about = "Token-efficient Linear client for coding agents")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Profile to use (overrides .ltui.toml, LTUI_PROFILE and the default)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Output format for lists
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Tsv)]
    pub format: OutputFormat,

    /// Comma-separated column keys, in output order
    #[arg(long, global = true, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Page size for list commands
    #[arg(long, global = true, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Cursor from a previous CURSOR_NEXT line
    #[arg(long, global = true)]
    pub cursor: Option<String>,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage profiles and API keys
    #[command(subcommand)]
    Auth(AuthCommands),

    /// List, view, create and update issues
    #[command(subcommand)]
    Issues(IssueCommands),

    /// Teams and their workflow states
    #[command(subcommand)]
    Teams(TeamCommands),

    /// Projects, progress and directory alignment
    #[command(subcommand)]
    Projects(ProjectCommands),

    /// List issue labels
    Labels(LabelArgs),

    /// List workspace users
    Users(UserArgs),

    /// List cycles
    Cycles(CycleArgs),

    /// Project milestones
    #[command(subcommand)]
    Milestones(MilestoneCommands),

    /// Roadmaps and the projects on them
    #[command(subcommand)]
    Roadmaps(RoadmapCommands),

    /// List and read documents
    #[command(subcommand)]
    Documents(DocumentCommands),

    /// List your notifications
    Notifications(NotificationArgs),

    /// Manage the local reference cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

impl Cli {
    fn output(&self) -> Output {
        let fields = self
            .fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        Output::new(self.format, fields)
    }

    fn paging(&self) -> Paging {
        Paging {
            limit: self.limit,
            cursor: self.cursor.clone(),
        }
    }
}

/// Installs the stderr subscriber; `LTUI_LOG` overrides `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "ltui=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let out = runtime.block_on(execute(cli))?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(out.as_bytes())
        .context("Failed to write output")?;
    stdout.flush().context("Failed to write output")?;
    Ok(())
}

/// Runs one parsed command and returns its stdout text
pub async fn execute(cli: Cli) -> Result<String> {
    let dir = ConfigDir::discover()?;
    let env = Environment::from_process();
    let project_dir = std::env::current_dir().context("Failed to read current directory")?;
    let output = cli.output();
    let paging = cli.paging();
    debug!(config_dir = %dir.path().display(), "starting");

    let profile = cli.profile.as_deref();
    let session = || connect(&dir, profile, &env, &project_dir, output.clone(), paging.clone());

    match cli.command {
        Commands::Auth(cmd) => {
            let ctx = AuthContext {
                dir: &dir,
                profile,
                env: &env,
                project_dir: &project_dir,
            };
            auth::run(cmd, &ctx)
        }
        Commands::Cache(cmd) => cache_cmd::run(cmd, &CacheStore::new(dir.cache_file())),
        Commands::Issues(IssueCommands::Saved(cmd)) => {
            saved::run(cmd, &SavedQueryStore::new(dir.queries_file()), &output)
        }
        Commands::Issues(IssueCommands::Remote(cmd)) => {
            let queries = SavedQueryStore::new(dir.queries_file());
            issue::run(cmd, &session()?, &queries).await
        }
        Commands::Teams(cmd) => team::run(cmd, &session()?).await,
        Commands::Projects(cmd) => project::run(cmd, &session()?, profile).await,
        Commands::Labels(args) => label::run(args, &session()?).await,
        Commands::Users(args) => user::run(args, &session()?).await,
        Commands::Cycles(args) => cycle::run(args, &session()?).await,
        Commands::Milestones(cmd) => milestone::run(cmd, &session()?).await,
        Commands::Roadmaps(cmd) => roadmap::run(cmd, &session()?).await,
        Commands::Documents(cmd) => document::run(cmd, &session()?).await,
        Commands::Notifications(args) => notification::run(args, &session()?).await,
    }
}

/// Resolves credentials and builds the per-invocation session
fn connect(
    dir: &ConfigDir,
    profile: Option<&str>,
    env: &Environment,
    project_dir: &Path,
    output: Output,
    paging: Paging,
) -> Result<Session> {
    let config = dir.resolve(profile, project_dir, env)?;
    debug!(profile = %config.profile_name, "credentials resolved");

    let api = Arc::new(LinearClient::new(config.api_key.clone()));
    Ok(Session::new(
        api,
        CacheStore::new(dir.cache_file()),
        config,
        project_dir,
        output,
        paging,
    ))
}
