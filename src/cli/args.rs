//! Clap argument types and validation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use presubmit::models::{ProviderName, PullRequestReview};

/// AI-powered pull request reviewer for GitHub.
#[derive(Parser, Debug)]
#[command(
    name = "presubmit",
    version = presubmit::constants::VERSION,
    about = "AI-powered pull request reviewer for GitHub",
)]
pub struct Cli {
    /// LLM provider, overriding config and environment.
    #[arg(long, global = true)]
    pub provider: Option<ProviderName>,

    /// Model name, overriding config and environment.
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Summarize and review a pull request.
    Review(ReviewArgs),

    /// Answer an inline comment the bot was mentioned in.
    Reply(ReplyArgs),

    /// Run from a GitHub Actions workflow, dispatching on the triggering event.
    Action(ActionArgs),

    /// Print the annotated diff the model would see, without calling any API.
    Render(RenderArgs),

    /// Print version information.
    Version,
}

/// Arguments for the `review` subcommand.
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// Repository as `owner/name`.
    #[arg(long, env = presubmit::constants::ENV_REPOSITORY)]
    pub repo: String,

    /// Pull request number.
    #[arg(long)]
    pub pr: u64,

    /// Run the model calls but post nothing.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Output format for the printed review.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,
}

/// Arguments for the `reply` subcommand.
#[derive(Parser, Debug)]
pub struct ReplyArgs {
    /// Repository as `owner/name`.
    #[arg(long, env = presubmit::constants::ENV_REPOSITORY)]
    pub repo: String,

    /// Pull request number.
    #[arg(long)]
    pub pr: u64,

    /// Id of the review comment to answer.
    #[arg(long)]
    pub comment_id: u64,

    /// Generate the reply but do not post it.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// Arguments for the `action` subcommand.
#[derive(Parser, Debug)]
pub struct ActionArgs {
    /// Run the model calls but post nothing.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// Arguments for the `render` subcommand.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Path to the repository (used for `--base` and config lookup).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Pre-computed unified diff file.
    #[arg(long, conflicts_with = "base")]
    pub diff_file: Option<PathBuf>,

    /// Branch or commit to diff against (uses git diff).
    #[arg(long)]
    pub base: Option<String>,

    /// JSON array of review comments, as returned by the GitHub API.
    #[arg(long)]
    pub comments_file: Option<PathBuf>,
}

/// Where `render` reads its diff from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderInput {
    DiffFile(PathBuf),
    GitBase(String),
    Stdin,
}

impl RenderArgs {
    /// The diff source; stdin when neither a file nor a base is given.
    pub fn input(&self) -> RenderInput {
        match (&self.diff_file, &self.base) {
            (Some(path), _) => RenderInput::DiffFile(path.clone()),
            (None, Some(base)) => RenderInput::GitBase(base.clone()),
            (None, None) => RenderInput::Stdin,
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    /// Render a review using the renderer for this format.
    pub fn render(&self, review: &PullRequestReview) -> String {
        use presubmit::output::OutputRenderer;
        match self {
            OutputFormat::Terminal => presubmit::output::terminal::TerminalRenderer.render(review),
            OutputFormat::Json => presubmit::output::json::JsonRenderer.render(review),
        }
    }
}
