use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Pipeline stage, used when reporting failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Pair,
    Write,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Pair => "pair",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// Structured progress events for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunStarted {
        input: PathBuf,
        output: PathBuf,
        include_system_events: bool,
        year: i32,
    },
    LogLoaded {
        client_events: usize,
        clients: usize,
        system_changes: usize,
        skip_events: usize,
        other_events: usize,
    },
    SessionsPaired {
        sessions: usize,
        clients: usize,
    },
    ReportWritten {
        path: PathBuf,
        sessions: usize,
    },
    StageFailed {
        stage: Stage,
        error: String,
    },
}

impl PipelineEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }

    /// Single-line rendering used by the compact format
    pub fn compact(&self) -> String {
        match self {
            PipelineEvent::RunStarted { input, year, .. } => {
                format!("run:start {} year={}", input.display(), year)
            }
            PipelineEvent::LogLoaded {
                client_events,
                clients,
                system_changes,
                skip_events,
                other_events,
            } => format!(
                "load:done client_events={} clients={} system={} skip={} other={}",
                client_events, clients, system_changes, skip_events, other_events
            ),
            PipelineEvent::SessionsPaired { sessions, clients } => {
                format!("pair:done sessions={} clients={}", sessions, clients)
            }
            PipelineEvent::ReportWritten { path, sessions } => {
                format!("write:done {} sessions={}", path.display(), sessions)
            }
            PipelineEvent::StageFailed { stage, error } => format!("{}:error {}", stage, error),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for pipeline events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &PipelineEvent) {
        // Always JSON in the file
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let _ = writeln!(file, "{}", event.with_timestamp());
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &PipelineEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &PipelineEvent) {
        let mut stderr = std::io::stderr();
        match event {
            PipelineEvent::RunStarted {
                input,
                output,
                include_system_events,
                year,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} {}",
                    "aplog".bold().bright_white(),
                    "access-point session analysis".dimmed()
                );
                let _ = writeln!(stderr, "  {} {}", "Input:".dimmed(), input.display());
                let _ = writeln!(stderr, "  {} {}", "Output:".dimmed(), output.display());
                let _ = writeln!(
                    stderr,
                    "  {} {}  {} {}",
                    "Year:".dimmed(),
                    year,
                    "System events:".dimmed(),
                    if *include_system_events { "on" } else { "off" }
                );
                let _ = writeln!(stderr);
            }
            PipelineEvent::LogLoaded {
                client_events,
                clients,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} Loaded {} client events from {} clients",
                    "▶".bright_cyan(),
                    client_events,
                    clients
                );
            }
            PipelineEvent::SessionsPaired { sessions, clients } => {
                let _ = writeln!(
                    stderr,
                    "  {} Paired {} sessions across {} clients",
                    "▶".bright_cyan(),
                    sessions,
                    clients
                );
            }
            PipelineEvent::ReportWritten { path, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} Report written to {}",
                    "✓".bright_green(),
                    path.display()
                );
                let _ = writeln!(stderr);
            }
            PipelineEvent::StageFailed { stage, error } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} {} failed: {}",
                    "✗".bright_red(),
                    stage,
                    error.bright_red()
                );
            }
        }
    }

    fn log_compact(&self, event: &PipelineEvent) {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let _ = writeln!(std::io::stderr(), "[{}] {}", timestamp, event.compact());
    }
}
