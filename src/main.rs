//! presubmit: AI-powered pull request reviewer.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use presubmit::comments;
use presubmit::config;
use presubmit::constants;
use presubmit::diff;
use presubmit::env;
use presubmit::github;
use presubmit::models;
use presubmit::orchestrator;
use presubmit::providers;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::args::{ActionArgs, Cli, Command, OutputFormat, RenderArgs, RenderInput, ReplyArgs, ReviewArgs};
use config::Config;
use env::Env;
use github::{ActionEvent, GithubClient, PullRequestRef};
use providers::rig::RigProvider;

/// Pull request actions that trigger a review.
const REVIEW_ACTIONS: &[&str] = &["opened", "synchronize", "reopened", "ready_for_review"];

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

/// Log to stderr, filtered by `PRESUBMIT_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(constants::ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let overrides = Overrides {
        provider: cli.provider,
        model: cli.model,
    };

    match cli.command {
        Command::Review(args) => run_review(args, &overrides).await,
        Command::Reply(args) => run_reply(args, &overrides).await,
        Command::Action(args) => run_action(args, &overrides).await,
        Command::Render(args) => run_render(args).await,
        Command::Version => run_version(),
    }
}

/// CLI flags that take precedence over every other config layer.
struct Overrides {
    provider: Option<models::ProviderName>,
    model: Option<String>,
}

/// Load layered config from the working directory and apply CLI flags.
fn load_config(repo_root: &Path, overrides: &Overrides) -> Result<Config> {
    let mut config =
        Config::load(Some(repo_root), &Env::real()).context("failed to load configuration")?;
    if let Some(provider) = overrides.provider {
        config.provider.name = provider;
    }
    if let Some(model) = &overrides.model {
        config.provider.model.clone_from(model);
    }
    Ok(config)
}

fn working_dir() -> Result<PathBuf> {
    std::env::current_dir().context("failed to determine working directory")
}

/// Print version information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    Ok(())
}

async fn run_review(args: ReviewArgs, overrides: &Overrides) -> Result<()> {
    let config = load_config(&working_dir()?, overrides)?;
    let pr = PullRequestRef::parse(&args.repo, args.pr)?;
    review(&config, &pr, args.dry_run, args.format).await
}

async fn run_reply(args: ReplyArgs, overrides: &Overrides) -> Result<()> {
    let config = load_config(&working_dir()?, overrides)?;
    let pr = PullRequestRef::parse(&args.repo, args.pr)?;
    reply(&config, &pr, args.comment_id, args.dry_run).await
}

/// Dispatch on the GitHub Actions event that started the workflow.
async fn run_action(args: ActionArgs, overrides: &Overrides) -> Result<()> {
    let env = Env::real();
    let event = ActionEvent::from_env(&env)
        .await
        .context("failed to read the GitHub Actions event")?;

    let repo_root = env
        .var(constants::ENV_WORKSPACE)
        .map(PathBuf::from)
        .or_else(|_| working_dir())?;
    let config = load_config(&repo_root, overrides)?;

    match event {
        ActionEvent::PullRequest { pr, action } => {
            if REVIEW_ACTIONS.contains(&action.as_str()) {
                review(&config, &pr, args.dry_run, OutputFormat::Terminal).await
            } else {
                info!(%pr, %action, "pull request action does not trigger a review");
                Ok(())
            }
        }
        ActionEvent::ReviewComment {
            pr,
            comment_id,
            action,
        } => {
            if action == "created" {
                reply(&config, &pr, comment_id, args.dry_run).await
            } else {
                info!(%pr, comment_id, %action, "comment action does not trigger a reply");
                Ok(())
            }
        }
        ActionEvent::Unsupported(name) => {
            info!(event = %name, "event not handled, nothing to do");
            Ok(())
        }
    }
}

async fn review(
    config: &Config,
    pr: &PullRequestRef,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    config.validate_for_review()?;
    let host = GithubClient::new(&config.github)?;
    let provider = RigProvider::new(config.provider.clone())?;

    let outcome = orchestrator::review_pull_request(&host, &provider, config, pr, dry_run)
        .await
        .with_context(|| format!("review of {pr} failed"))?;

    print!("{}", format.render(&outcome.review));
    eprintln!("{}", cli::review_status(&outcome, dry_run));
    Ok(())
}

async fn reply(config: &Config, pr: &PullRequestRef, comment_id: u64, dry_run: bool) -> Result<()> {
    config.validate_for_review()?;
    let host = GithubClient::new(&config.github)?;
    let provider = RigProvider::new(config.provider.clone())?;

    let outcome =
        orchestrator::reply_to_comment(&host, &provider, config, pr, comment_id, dry_run)
            .await
            .with_context(|| format!("reply to comment {comment_id} on {pr} failed"))?;

    if let orchestrator::ReplyOutcome::Replied(body) = &outcome {
        if dry_run {
            println!("{body}");
        }
    }
    eprintln!("{}", cli::reply_status(&outcome, dry_run));
    Ok(())
}

/// Print the annotated diff for a local change, offline.
async fn run_render(args: RenderArgs) -> Result<()> {
    let repo_root = std::fs::canonicalize(&args.path)
        .with_context(|| format!("--path directory not found: {}", args.path.display()))?;
    let config =
        Config::load(Some(&repo_root), &Env::real()).context("failed to load configuration")?;

    let patches = match args.input() {
        RenderInput::DiffFile(path) => diff::file::read_diff_file(&path).await,
        RenderInput::GitBase(base) => diff::git::git_diff(&repo_root, &base).await,
        RenderInput::Stdin => diff::file::read_diff_stdin().await,
    }
    .context("failed to read diff")?;

    let mut review_comments: Vec<models::ReviewComment> = match &args.comments_file {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid review comments in {}", path.display()))?
        }
        None => Vec::new(),
    };
    comments::normalize_authors(&mut review_comments, &config.bot.identity());
    let threads = comments::generate_comment_threads(&review_comments);

    let files = diff::parse_files(&patches)?;
    if files.is_empty() {
        eprintln!("No changes to render.");
        return Ok(());
    }

    let file_diffs = diff::build_file_diffs(&files, &threads);
    println!("{}", diff::format::generate_files_code_diff(&file_diffs));
    Ok(())
}
