use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use fwscope_client::{HttpLogSource, LogSource};
use fwscope_types::{ExportFormat, FilterCriteria, PageState, Severity};

mod browse;
mod commands;
mod config;

use config::{FileConfig, Overrides, Settings, TOKEN_ENV};

/// fwscope - A terminal browser for Prompt Firewall decision logs
#[derive(Parser, Debug)]
#[command(name = "fwscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (defaults to ~/.fwscope/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL of the firewall service
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Bearer token for the admin endpoints
    #[arg(long, global = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Records per page (1-1000)
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Most records fetched when filtering by risk type or severity (1-1000)
    #[arg(long, global = true)]
    fetch_ceiling: Option<usize>,

    #[command(flatten)]
    filters: FilterArgs,
}

/// Initial filter criteria
#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Only records with a risk of this type (e.g. PII)
    #[arg(long = "type", global = true, value_name = "TYPE")]
    risk_type: Option<String>,

    /// Only records with a risk of this severity
    #[arg(long, global = true)]
    severity: Option<Severity>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    fn criteria(&self) -> Result<FilterCriteria> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                bail!("--from {} is after --to {}", from, to);
            }
        }

        Ok(FilterCriteria::new()
            .with_risk_type(self.risk_type.clone())
            .with_severity(self.severity)
            .with_date_range(self.from, self.to))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse logs interactively (default)
    Browse,

    /// Print one page of logs
    List {
        /// Index of the first record to show
        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Export every matching record to a file
    Export {
        /// Output format
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Directory to write into (defaults to export_dir, then the current directory)
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing for debugging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let criteria = args.filters.criteria()?;

    let file = FileConfig::load(args.config.as_deref())?;
    let export_override = match &args.command {
        Some(Command::Export { output, .. }) => output.clone(),
        _ => None,
    };
    let overrides = Overrides {
        base_url: args.base_url,
        token: args.token,
        timeout_secs: args.timeout,
        page_size: args.page_size,
        fetch_ceiling: args.fetch_ceiling,
        export_dir: export_override,
    };
    let settings = Settings::resolve(file, overrides, std::env::var(TOKEN_ENV).ok())?;

    let source: Arc<dyn LogSource> = Arc::new(
        HttpLogSource::new(&settings.client).context("failed to build HTTP client")?,
    );
    let page = PageState::new(settings.page_size);

    match args.command.unwrap_or(Command::Browse) {
        Command::Browse => browse::run(source, criteria, &settings).await,
        Command::List { offset } => {
            let output = commands::list(
                source.as_ref(),
                criteria,
                page.with_offset(offset),
                settings.fetch_ceiling,
            )
            .await?;
            print!("{}", output);
            Ok(())
        }
        Command::Export { format, .. } => {
            let summary = commands::export(
                source.as_ref(),
                &criteria,
                format,
                settings.fetch_ceiling,
                &settings.export_dir,
            )
            .await?;
            println!("{}", summary);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_flags_build_criteria() {
        let args = Args::try_parse_from([
            "fwscope", "list", "--type", "PII", "--severity", "HIGH", "--from", "2024-07-01",
        ])
        .unwrap();

        let criteria = args.filters.criteria().unwrap();
        assert_eq!(criteria.risk_type.as_deref(), Some("PII"));
        assert_eq!(criteria.severity, Some(Severity::High));
        assert_eq!(criteria.date_from, NaiveDate::from_ymd_opt(2024, 7, 1));
        assert!(matches!(args.command, Some(Command::List { offset: 0 })));
    }

    #[test]
    fn test_inverted_date_range_is_rejected() {
        let args =
            Args::try_parse_from(["fwscope", "--from", "2024-07-02", "--to", "2024-07-01"]).unwrap();
        assert!(args.filters.criteria().is_err());
    }

    #[test]
    fn test_bad_values_fail_to_parse() {
        assert!(Args::try_parse_from(["fwscope", "--severity", "critical"]).is_err());
        assert!(Args::try_parse_from(["fwscope", "export", "--format", "xml"]).is_err());
        assert!(Args::try_parse_from(["fwscope", "--from", "07/01/2024"]).is_err());
    }

    #[test]
    fn test_export_defaults_to_csv() {
        let args = Args::try_parse_from(["fwscope", "export"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::Export { format: ExportFormat::Csv, output: None })
        ));
    }
}
