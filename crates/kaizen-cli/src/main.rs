mod config;
mod service;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use config::{CliOverrides, Settings};
use service::{KaizenService, RunOptions};

/// Research best practices for a documentation skill and file the findings
#[derive(Debug, Parser)]
#[command(name = "kaizen", version, about = "Dotfiles Kaizen Workflow")]
struct Args {
    /// ID of the domain to analyze
    #[arg(long)]
    domain_id: String,

    /// Path to the domain configuration document (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Base directory that target file patterns are resolved against
    #[arg(long, default_value = ".")]
    content_base: PathBuf,

    /// Repository to file issues in (owner/name); defaults to GITHUB_REPOSITORY
    #[arg(long)]
    issue_repo: Option<String>,

    /// Token for the issue tracker; defaults to GITHUB_TOKEN
    #[arg(long)]
    github_token: Option<String>,

    /// Print the issue instead of filing it
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            github_token: self.github_token.clone(),
            issue_repo: self.issue_repo.clone(),
        }
    }

    fn into_options(self) -> RunOptions {
        RunOptions {
            domain_id: self.domain_id,
            config_path: self.config,
            content_base: self.content_base,
            dry_run: self.dry_run,
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings = Settings::load(&args.overrides())?;
    KaizenService::new(settings, args.into_options()).run().await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => {
            println!("Analysis completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Kaizen run failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
