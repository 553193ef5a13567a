//! Command-line interface for the S3 bucket policy manager.

mod select;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use s3_policy_manager_core::{BucketOutcome, OutcomeStatus, S3PolicyManagerService, TemplateStore};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "s3-policy-manager",
    version,
    about = "Apply, remove, back up, and restore S3 bucket policies from local JSON templates"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a policy template to one or more buckets
    Apply {
        /// Name of the policy template to apply
        #[arg(long)]
        template: String,
        /// Target bucket; repeatable. Omitted: select interactively
        #[arg(long)]
        bucket: Vec<String>,
        /// Skip backing up existing policies
        #[arg(long)]
        no_backup: bool,
    },
    /// Remove the statement with the given Sid from one or more buckets
    Remove {
        /// Statement Sid to remove
        #[arg(long)]
        sid: String,
        /// Target bucket; repeatable. Omitted: select interactively
        #[arg(long)]
        bucket: Vec<String>,
        /// Skip backing up existing policies
        #[arg(long)]
        no_backup: bool,
    },
    /// List available policy templates
    ListTemplates,
    /// List policy backups for this account
    ListBackups {
        /// Only show backups for this bucket
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Restore a bucket policy from a backup file
    Restore {
        /// Bucket to restore onto
        #[arg(long)]
        bucket: String,
        /// Backup file to restore from
        #[arg(long, value_name = "PATH")]
        backup_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        // Pure filesystem read; works without AWS credentials.
        Commands::ListTemplates => list_templates().await,

        Commands::ListBackups { bucket } => {
            let service = init_service().await?;
            list_backups(&service, bucket.as_deref()).await
        }

        Commands::Restore {
            bucket,
            backup_file,
        } => {
            let service = init_service().await?;
            service
                .restore(&bucket, &backup_file)
                .await
                .with_context(|| format!("failed to restore policy for bucket '{bucket}'"))?;
            println!(
                "Restored policy for bucket '{bucket}' from {}",
                backup_file.display()
            );
            Ok(ExitCode::SUCCESS)
        }

        Commands::Apply {
            template,
            bucket,
            no_backup,
        } => {
            ensure_selectable(&bucket)?;
            let service = init_service().await?;
            let targets = resolve_buckets(&service, bucket).await?;
            let outcomes = service.apply(&targets, &template, !no_backup).await?;
            Ok(report(&outcomes))
        }

        Commands::Remove {
            sid,
            bucket,
            no_backup,
        } => {
            ensure_selectable(&bucket)?;
            let service = init_service().await?;
            let targets = resolve_buckets(&service, bucket).await?;
            let outcomes = service.remove(&targets, &sid, !no_backup).await;
            Ok(report(&outcomes))
        }
    }
}

async fn init_service() -> Result<S3PolicyManagerService> {
    S3PolicyManagerService::new()
        .await
        .context("failed to initialize AWS clients")
}

/// Interactive selection needs a terminal; checked before AWS clients are
/// built so the failure is immediate.
fn ensure_selectable(explicit: &[String]) -> Result<()> {
    if explicit.is_empty() && !atty::is(atty::Stream::Stdin) {
        bail!("stdin is not a TTY; pass --bucket to name target buckets non-interactively");
    }
    Ok(())
}

/// Explicit `--bucket` flags win, in flag order; otherwise list the
/// account's buckets and prompt.
async fn resolve_buckets(
    service: &S3PolicyManagerService,
    explicit: Vec<String>,
) -> Result<Vec<String>> {
    if !explicit.is_empty() {
        log::debug!("using {} explicitly named buckets", explicit.len());
        return Ok(explicit);
    }

    let buckets = service
        .list_buckets()
        .await
        .context("failed to list buckets")?;
    if buckets.is_empty() {
        bail!("no S3 buckets found in this account");
    }

    select::prompt_for_buckets(&buckets)
}

async fn list_templates() -> Result<ExitCode> {
    let templates = TemplateStore::default()
        .list()
        .await
        .context("failed to list policy templates")?;

    if templates.is_empty() {
        println!("No policy templates found in policy_templates/");
        println!("Add policy templates as JSON files in that directory.");
    } else {
        println!("Available policy templates:");
        for (i, name) in templates.iter().enumerate() {
            println!("{}. {name}", i + 1);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn list_backups(service: &S3PolicyManagerService, bucket: Option<&str>) -> Result<ExitCode> {
    let backups = service
        .list_backups(bucket)
        .await
        .context("failed to list policy backups")?;

    if backups.is_empty() {
        println!(
            "No policy backups found for account {}",
            service.account_id()
        );
    } else {
        println!("Available policy backups (most recent first):");
        for (i, backup) in backups.iter().enumerate() {
            println!("{}. {}", i + 1, backup.file_name);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn report(outcomes: &[BucketOutcome]) -> ExitCode {
    println!("\nOperation results:");
    let mut failed = 0usize;
    for outcome in outcomes {
        match &outcome.status {
            OutcomeStatus::Applied { backup } => match backup {
                Some(path) => println!(
                    "  {}: applied (backup: {})",
                    outcome.bucket,
                    path.display()
                ),
                None => println!("  {}: applied", outcome.bucket),
            },
            OutcomeStatus::Removed {
                backup,
                policy_deleted,
            } => {
                let action = if *policy_deleted {
                    "statement removed, empty policy deleted"
                } else {
                    "statement removed"
                };
                match backup {
                    Some(path) => {
                        println!("  {}: {action} (backup: {})", outcome.bucket, path.display());
                    }
                    None => println!("  {}: {action}", outcome.bucket),
                }
            }
            OutcomeStatus::Skipped { reason } => {
                println!("  {}: skipped - {reason}", outcome.bucket);
            }
            OutcomeStatus::Failed { error } => {
                failed += 1;
                println!("  {}: failed - {error}", outcome.bucket);
            }
        }
    }

    if failed > 0 {
        println!("\n{failed} of {} bucket(s) failed", outcomes.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
