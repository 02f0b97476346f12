//! ShieldNet CLI - Entry Point

use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use shieldnet::client::ApiClient;
use shieldnet::config::ResolvedConfig;
use shieldnet::model::{
    AnalysisResult, AppError, InvoiceStatus, SessionError, ThreatReport, TransactionQuery,
    TransactionStatus, UploadRequest,
};
use shieldnet::refresh::{RefreshBus, RefreshTopic};
use shieldnet::stream::SessionOptions;
use shieldnet::view::{self, TerminalReporter};
use std::io::{self, Write};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// ShieldNet - screen invoices for fraud before paying them
#[derive(Parser, Debug)]
#[command(name = "shieldnet")]
#[command(version)]
#[command(about = "Command-line client for the ShieldNet invoice fraud detection service")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the ShieldNet backend
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload an invoice and stream the fraud analysis
    Analyze(AnalyzeArgs),
    /// Show threat network statistics
    Analytics,
    /// List treasury transactions
    Transactions {
        /// Maximum number of entries
        #[arg(long)]
        limit: Option<usize>,
        /// Number of entries to skip
        #[arg(long)]
        offset: Option<usize>,
        /// Only show entries with this status (paid, held, blocked)
        #[arg(long)]
        status: Option<TransactionStatus>,
    },
    /// Show the treasury wallet balance
    Balance,
    /// Report a fraudulent invoice to the threat network
    Report(ReportArgs),
    /// List previously analyzed invoices
    History,
    /// Check that the backend is reachable
    Health,
}

#[derive(ClapArgs, Debug)]
pub struct AnalyzeArgs {
    /// Invoice file (PDF, PNG, JPG or JPEG, at most 10 MiB)
    pub file: PathBuf,

    /// Wait for the verdict without streaming progress
    #[arg(long)]
    pub blocking: bool,

    /// Seconds without data before giving up (0 waits forever)
    #[arg(long, value_name = "SECS")]
    pub idle_timeout: Option<u64>,

    /// Do not report blocked invoices to the threat network
    #[arg(long)]
    pub no_report: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Show the refreshed ledger and analytics after the verdict
    #[arg(long)]
    pub refresh: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ReportArgs {
    #[arg(long)]
    pub invoice_id: String,
    #[arg(long)]
    pub vendor: String,
    /// Fraud score, 0-100
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub fraud_score: u8,
    #[arg(long)]
    pub reason: String,
    #[arg(long)]
    pub amount: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = resolve_config(&args)?;

    shieldnet::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    run(args, config).await?;

    Ok(())
}

/// Load configuration with full precedence chain:
/// Defaults → Config File → Env Vars → CLI Args
fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    let config_file = shieldnet::config::load_config_with_precedence(args.config.clone())?;
    let merged = shieldnet::config::merge_config(config_file);
    let with_env = shieldnet::config::apply_env_overrides(merged);

    let (idle_timeout_override, report_override) = match &args.command {
        Command::Analyze(analyze) => (
            analyze.idle_timeout,
            analyze.no_report.then_some(false),
        ),
        _ => (None, None),
    };

    Ok(shieldnet::config::apply_cli_overrides(
        with_env,
        args.api_url.clone(),
        idle_timeout_override,
        report_override,
    ))
}

async fn run(args: Args, config: ResolvedConfig) -> Result<(), AppError> {
    let client = ApiClient::from_config(&config)?;
    let json = args.json;

    match args.command {
        Command::Analyze(analyze) => run_analyze(&client, &config, analyze, json).await,
        Command::Analytics => {
            let analytics = client.threat_analytics().await?;
            emit(json, &analytics, |a| view::render_analytics(a, "USDC"))
        }
        Command::Transactions {
            limit,
            offset,
            status,
        } => {
            let query = TransactionQuery {
                limit,
                offset,
                status,
            };
            let transactions = client.transactions(&query).await?;
            emit(json, &transactions, |t| view::render_transactions(t))
        }
        Command::Balance => {
            let balance = client.wallet_balance().await?;
            emit(json, &balance, view::render_balance)
        }
        Command::Report(report) => {
            let report = ThreatReport {
                invoice_id: report.invoice_id,
                vendor: report.vendor,
                fraud_score: report.fraud_score,
                reason: report.reason,
                amount: report.amount,
            };
            let receipt = client.report_threat(&report).await?;
            emit(json, &receipt, view::render_report_receipt)
        }
        Command::History => {
            let history = client.invoice_history().await?;
            emit(json, &history, |h| view::render_history(h))
        }
        Command::Health => {
            let health = client.health().await?;
            emit(json, &health, view::render_health)
        }
    }
}

async fn run_analyze(
    client: &ApiClient,
    config: &ResolvedConfig,
    args: AnalyzeArgs,
    json: bool,
) -> Result<(), AppError> {
    let result = if args.blocking {
        let request = UploadRequest::from_path(client.analyze_endpoint(), &args.file).await?;
        client.analyze(request).await?
    } else {
        let request = UploadRequest::from_path(client.stream_endpoint(), &args.file).await?;
        stream_analysis(client, config, request, args.quiet).await?
    };

    emit(json, &result, view::render_verdict)?;

    if result.status == InvoiceStatus::Blocked && config.report_blocked {
        report_blocked(client, &result, args.quiet).await;
    }

    // Only after the server closed the stream; the verdict is saved by now.
    let bus = RefreshBus::new();
    let subscription = args.refresh.then(|| bus.subscribe());
    bus.publish(RefreshTopic::Treasury);
    bus.publish(RefreshTopic::ThreatAnalytics);

    if let Some(mut subscription) = subscription {
        for topic in subscription.drain() {
            show_topic(client, topic, json).await?;
        }
    }

    Ok(())
}

async fn stream_analysis(
    client: &ApiClient,
    config: &ResolvedConfig,
    request: UploadRequest,
    quiet: bool,
) -> Result<AnalysisResult, AppError> {
    let progress: Box<dyn Write> = if quiet {
        Box::new(io::sink())
    } else {
        Box::new(io::stderr())
    };
    let mut reporter = TerminalReporter::new(progress, config.show_thinking);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let options = SessionOptions {
        idle_timeout: config.idle_timeout(),
        cancel: Some(cancel),
    };
    let outcome = client
        .analyze_streaming(request, &mut reporter, options)
        .await;
    interrupt.abort();

    settle(reporter, outcome)
}

/// Close the progress output and hand back the session outcome.
///
/// Progress output is best effort: a failed write is logged and never
/// replaces the verdict or the session error.
fn settle<W: Write>(
    reporter: TerminalReporter<W>,
    outcome: Result<AnalysisResult, SessionError>,
) -> Result<AnalysisResult, AppError> {
    match reporter.finish() {
        Ok(transcript) => info!(transcript_len = transcript.len(), "Streamed analysis finished"),
        Err(e) => warn!("Progress output failed: {}", e),
    }

    Ok(outcome?)
}

async fn report_blocked(client: &ApiClient, result: &AnalysisResult, quiet: bool) {
    match client
        .report_threat(&ThreatReport::from_result(result))
        .await
    {
        Ok(receipt) => {
            if !quiet {
                eprintln!("{}", view::render_report_receipt(&receipt));
            }
        }
        Err(e) => {
            // The verdict stands even if sharing it fails.
            warn!(invoice_id = %result.invoice_id, "Threat report failed: {}", e);
            eprintln!("Could not report threat: {}", e);
        }
    }
}

async fn show_topic(client: &ApiClient, topic: RefreshTopic, json: bool) -> Result<(), AppError> {
    match topic {
        RefreshTopic::Treasury => {
            let balance = client.wallet_balance().await?;
            emit(json, &balance, view::render_balance)?;
            let transactions = client.transactions(&TransactionQuery::default()).await?;
            emit(json, &transactions, |t| view::render_transactions(t))
        }
        RefreshTopic::ThreatAnalytics => {
            let analytics = client.threat_analytics().await?;
            emit(json, &analytics, |a| view::render_analytics(a, "USDC"))
        }
    }
}

/// Print `value` to stdout as JSON or through `render`.
fn emit<T, F>(json: bool, value: &T, render: F) -> Result<(), AppError>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    let text = if json {
        serde_json::to_string_pretty(value)
            .map_err(|e| AppError::Output(io::Error::new(io::ErrorKind::InvalidData, e)))?
    } else {
        render(value)
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    Ok(())
}
