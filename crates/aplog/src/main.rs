mod config;
mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use aplog_logging::{LogFormat, Logger, PipelineEvent, Stage};
use aplog_sessions::{
    check_year, pair_sessions, render_report, sort_sessions, write_report, EventStore, LineParser,
    RunSummary, DEFAULT_YEAR,
};
use config::ProjectConfig;

const DEFAULT_OUTPUT: &str = "processed_wifi_log.txt";

#[derive(Parser, Debug)]
#[command(
    name = "aplog",
    about = "Reconstruct client sessions from WiFi access-point event logs",
    version
)]
struct Cli {
    /// Access-point log file to analyse
    input: PathBuf,

    /// Report path (default: processed_wifi_log.txt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Leave out configuration changes, skip events and other lines
    #[arg(long)]
    no_system_events: bool,

    /// Year assumed for the year-less log timestamps (default: 2000)
    #[arg(long)]
    year: Option<i32>,

    /// Progress log format
    #[arg(long, value_enum)]
    log_format: Option<LogFormatChoice>,

    /// Tracing level filter (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,

    /// Also append JSON progress events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

/// Effective options after merging CLI flags over `aplog.toml`.
#[derive(Debug)]
struct RunSettings {
    input: PathBuf,
    output: PathBuf,
    include_system_events: bool,
    year: i32,
    log_format: LogFormat,
    log_level: String,
    log_file: Option<PathBuf>,
    json: bool,
}

impl RunSettings {
    fn resolve(cli: Cli, config: ProjectConfig) -> Result<Self> {
        let log_format = match (cli.log_format, config.log_format.as_deref()) {
            (Some(choice), _) => choice.into(),
            (None, Some(name)) => name.parse::<LogFormat>().map_err(|e| {
                anyhow::anyhow!("Invalid log_format in {}: {}", config::CONFIG_FILE_NAME, e)
            })?,
            (None, None) => LogFormat::default(),
        };
        let year = cli.year.or(config.year).unwrap_or(DEFAULT_YEAR);
        check_year(year).context("Invalid --year / year setting")?;

        Ok(Self {
            input: cli.input,
            output: cli
                .output
                .or(config.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            include_system_events: !cli.no_system_events
                && config.include_system_events.unwrap_or(true),
            year,
            log_format,
            log_level: cli
                .log_level
                .or(config.log_level)
                .unwrap_or_else(|| "warn".to_string()),
            log_file: cli.log_file.or(config.log_file),
            json: cli.json,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = ProjectConfig::load(&working_dir)?.unwrap_or_default();
    let settings = RunSettings::resolve(cli, config)?;

    aplog_logging::init_tracing(&settings.log_level, settings.log_format);

    let logger = match settings.log_file {
        Some(ref path) => Logger::with_file(settings.log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(settings.log_format),
    };

    let summary = run(&settings, &logger)?;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary::print_summary(&summary, &settings.output);
    }

    Ok(())
}

/// Load, pair, sort and report. Nothing is written unless every earlier
/// stage succeeded.
fn run(settings: &RunSettings, logger: &Logger) -> Result<RunSummary> {
    logger.log(&PipelineEvent::RunStarted {
        input: settings.input.clone(),
        output: settings.output.clone(),
        include_system_events: settings.include_system_events,
        year: settings.year,
    });

    let parser = LineParser::new().with_system_events(settings.include_system_events);
    let store = checked(logger, Stage::Load, EventStore::load(&settings.input, &parser))
        .with_context(|| format!("Failed to load {}", settings.input.display()))?;
    logger.log(&PipelineEvent::LogLoaded {
        client_events: store.client_event_count(),
        clients: store.client_count(),
        system_changes: store.system_changes().len(),
        skip_events: store.skip_events().len(),
        other_events: store.other_events().len(),
    });

    let sessions = checked(logger, Stage::Pair, pair_sessions(&store, settings.year))
        .context("Failed to pair client sessions")?;
    let sessions = sort_sessions(sessions);
    let summary = RunSummary::collect(&sessions, &store);
    logger.log(&PipelineEvent::SessionsPaired {
        sessions: summary.total_sessions,
        clients: summary.unique_clients,
    });

    let report = render_report(
        &sessions,
        store.system_changes(),
        store.skip_events(),
        store.other_events(),
    );
    checked(logger, Stage::Write, write_report(&settings.output, &report))
        .with_context(|| format!("Failed to write report {}", settings.output.display()))?;
    logger.log(&PipelineEvent::ReportWritten {
        path: settings.output.clone(),
        sessions: summary.total_sessions,
    });

    Ok(summary)
}

fn checked<T>(
    logger: &Logger,
    stage: Stage,
    result: aplog_sessions::Result<T>,
) -> aplog_sessions::Result<T> {
    if let Err(ref e) = result {
        logger.log(&PipelineEvent::StageFailed {
            stage,
            error: e.to_string(),
        });
    }
    result
}
