//! treesplit - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use dialoguer::Confirm;
use tracing::info;
use tracing_subscriber::EnvFilter;

use treesplit::config::{DEFAULT_UPSTREAM, SplitConfig};
use treesplit::git::{
    SystemGit, changed_files, check_git_installed, current_branch, ensure_clean_working_tree,
    open_repository,
};
use treesplit::report::{OutputFormat, format_outcomes};
use treesplit::{ChangeSet, SplitExecutor, SplitPlan, Strategy};

/// Split a large branch into one branch per directory.
#[derive(Parser, Debug)]
#[command(name = "treesplit")]
#[command(about = "Split a large branch into one branch per directory")]
#[command(version)]
struct Cli {
    /// How to group changed files into branches
    #[arg(long, value_enum, default_value_t = Strategy::Directory)]
    strategy: Strategy,

    /// Marker file name that marks a split boundary (marker-file strategy)
    #[arg(long)]
    marker: Option<String>,

    /// Maximum directory depth of a bucket (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_depth: usize,

    /// Upstream reference to diff against and branch from
    #[arg(long, default_value = DEFAULT_UPSTREAM)]
    upstream: String,

    /// Commit message template for each split branch
    #[arg(short, long)]
    message: Option<String>,

    /// Read the commit message template from a file
    #[arg(long, value_name = "PATH")]
    message_file: Option<PathBuf>,

    /// Dry run - print the planned branches without creating them
    #[arg(long)]
    dry_run: bool,

    /// Output format for the plan
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn split_config(&self) -> SplitConfig {
        SplitConfig {
            strategy: self.strategy,
            marker: self.marker.clone(),
            max_depth: self.max_depth,
            upstream: self.upstream.clone(),
            message: self.message.clone(),
            message_file: self.message_file.clone(),
            dry_run: self.dry_run,
            assume_yes: self.yes,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.split_config();

    // Step 1: Validate configuration before any git interaction
    let validated = match config.validate() {
        Ok(validated) => validated,
        Err(e) => Cli::command()
            .error(ErrorKind::ValueValidation, format!("{e:#}"))
            .exit(),
    };

    // Step 2: Open repository and gather the change
    check_git_installed().context("git is required")?;

    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    let repo = open_repository(&cwd)
        .context("Not a git repository. Run treesplit from within a git repository.")?;
    let workdir = repo
        .workdir()
        .context("Repository has no working directory")?
        .to_path_buf();

    let branch = current_branch(&repo).context("Could not determine the branch to split")?;

    info!("Gathering changed files");
    let files = changed_files(&repo, &config.upstream)
        .with_context(|| format!("Failed to list files changed against {}", config.upstream))?;

    if files.is_empty() {
        println!(
            "No changes found between {} and {}. Nothing to split.",
            branch, config.upstream
        );
        return Ok(());
    }

    // Step 3: Split changed files into groups
    info!("Splitting {} changed files into groups", files.len());
    let change_set = ChangeSet::from_paths(&branch, validated.policy, &workdir, &files);
    let plan = SplitPlan::from_change_set(&change_set, &config.upstream);

    let rendered = plan
        .render(cli.format, config.dry_run)
        .context("Failed to serialize plan")?;
    print!("{rendered}");

    if config.dry_run {
        return Ok(());
    }

    // Step 4: Confirm and create branches
    ensure_clean_working_tree(&repo)?;

    if !config.assume_yes {
        println!();
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Split {} into {} branches?",
                branch,
                change_set.len()
            ))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

        if !confirmed {
            println!("Exiting");
            return Ok(());
        }
    }

    info!("Creating branches for splits");
    let git = SystemGit::new(&workdir);
    let executor = SplitExecutor::new(&git, &config.upstream, &validated.template);
    let outcomes = executor.run(&change_set)?;

    println!();
    print!("{}", format_outcomes(&outcomes));

    let created = outcomes.iter().filter(|o| o.is_created()).count();
    println!();
    println!("Created {} of {} branches.", created, outcomes.len());

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
