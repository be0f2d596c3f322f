use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nuke_orphan_buckets::{
    app::{AppBuilder, AppConfig, ProviderBackend},
    AssumeYes, AwsSettings, CleanupOptions, CleanupService, ConfirmationPrompt, ConsolePrompt,
    OutcomeStatus, RunReport,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "nuke-orphan-buckets")]
#[command(
    about = "Delete S3 buckets that no active CloudFormation stack declares",
    long_about = None
)]
struct Cli {
    /// AWS region; defaults to the standard provider chain
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Named profile from the shared AWS config
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Custom S3-compatible endpoint
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long, env = "NUKE_ASSUME_YES")]
    yes: bool,

    /// List orphans without deleting anything
    #[arg(long, env = "NUKE_DRY_RUN")]
    dry_run: bool,

    /// Buckets purged at the same time
    #[arg(long, env = "NUKE_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Attempts per provider call, including the first
    #[arg(long, env = "AWS_MAX_ATTEMPTS", default_value_t = 3)]
    max_attempts: u32,

    /// Timeout of one provider operation, retries included
    #[arg(long, env = "NUKE_OPERATION_TIMEOUT_SECS")]
    operation_timeout_secs: Option<u64>,

    /// Format of the final report on stdout
    #[arg(long, env = "NUKE_OUTPUT", value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        if self.concurrency == 0 {
            anyhow::bail!("--concurrency must be at least 1");
        }
        if self.operation_timeout_secs == Some(0) {
            anyhow::bail!("--operation-timeout-secs must be at least 1");
        }

        let aws = AwsSettings {
            region: self.region.clone(),
            profile: self.profile.clone(),
            endpoint_url: self.endpoint_url.clone(),
            max_attempts: self.max_attempts,
            operation_timeout: self.operation_timeout_secs.map(Duration::from_secs),
        };
        let cleanup = CleanupOptions::builder()
            .dry_run(self.dry_run)
            .purge_concurrency(self.concurrency)
            .build();

        Ok(AppConfig {
            backend: ProviderBackend::Aws(aws),
            cleanup,
        })
    }

    fn init_logging(&self) -> Result<()> {
        let level = match self.log_level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        };
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(format!("nuke_orphan_buckets={level},warn")))
            .context("Invalid log filter")?;

        // stdout carries the report
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to initialise logging")?;

        Ok(())
    }
}

fn render_text(report: &RunReport) -> String {
    let mut out = format!(
        "{} bucket(s) in account, {} declared by active stacks, {} orphan(s)\n",
        report.total_buckets,
        report.declared_buckets,
        report.orphans.len()
    );

    if report.orphans.is_empty() {
        return out;
    }
    if report.dry_run {
        out.push_str("Dry run, nothing deleted:\n");
        for bucket in &report.orphans {
            out.push_str(&format!("  {}\n", bucket));
        }
        return out;
    }
    if !report.confirmed {
        out.push_str("Not confirmed, nothing deleted\n");
        return out;
    }

    for outcome in &report.outcomes {
        let status = match outcome.status {
            OutcomeStatus::Purged => "deleted",
            OutcomeStatus::Failed => "FAILED",
            OutcomeStatus::Skipped => "skipped",
        };
        out.push_str(&format!("  {:<8} {}", status, outcome.bucket));
        if let Some(error) = &outcome.error {
            out.push_str(&format!(" ({})", error));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "{} deleted, {} failed, {} skipped\n",
        report.count(OutcomeStatus::Purged),
        report.count(OutcomeStatus::Failed),
        report.count(OutcomeStatus::Skipped)
    ));
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    let config = cli.to_app_config()?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping after the current purge phase");
            on_interrupt.cancel();
        }
    });

    let app = AppBuilder::new()
        .with_config(config)
        .with_cancellation(cancel)
        .build()
        .await
        .context("Failed to build application")?;

    let prompt: Box<dyn ConfirmationPrompt> = if cli.yes {
        info!("--yes given, skipping confirmation");
        Box::new(AssumeYes)
    } else {
        Box::new(ConsolePrompt::stdio())
    };

    let report = app
        .cleanup_service
        .run(prompt.as_ref())
        .await
        .context("Cleanup run failed")?;

    match cli.output {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        ),
    }

    if report.has_failures() {
        warn!(
            failed = report.count(OutcomeStatus::Failed),
            "some buckets could not be deleted"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nuke_orphan_buckets::{BucketName, OrphanSet};

    fn report(orphans: &[&str]) -> RunReport {
        let now = Utc::now();
        RunReport {
            started_at: now,
            finished_at: now,
            total_buckets: orphans.len() + 1,
            declared_buckets: 1,
            orphans: orphans
                .iter()
                .map(|n| BucketName::new(*n).unwrap())
                .collect::<OrphanSet>(),
            dry_run: false,
            confirmed: false,
            outcomes: Vec::new(),
        }
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "nuke-orphan-buckets",
            "--region",
            "eu-west-1",
            "--yes",
            "--concurrency",
            "4",
            "--output",
            "json",
        ]);

        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert!(cli.yes);
        assert!(!cli.dry_run);
        assert_eq!(cli.concurrency, 4);
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_defaults_match_interactive_sequential_run() {
        let cli = Cli::parse_from(["nuke-orphan-buckets"]);
        let config = cli.to_app_config().unwrap();

        assert!(!config.cleanup.dry_run);
        assert_eq!(config.cleanup.purge_concurrency, 1);
        match config.backend {
            ProviderBackend::Aws(settings) => {
                assert_eq!(settings.max_attempts, 3);
                assert!(settings.operation_timeout.is_none());
            }
            ProviderBackend::InMemory => panic!("Expected AWS backend"),
        }
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let cli = Cli::parse_from(["nuke-orphan-buckets", "--concurrency", "0"]);
        assert!(cli.to_app_config().is_err());
    }

    #[test]
    fn test_text_report_for_declined_run() {
        let text = render_text(&report(&["a", "c"]));
        assert!(text.contains("2 orphan(s)"));
        assert!(text.contains("Not confirmed"));
    }
}
