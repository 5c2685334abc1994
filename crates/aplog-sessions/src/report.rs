use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::duration::SessionDuration;
use crate::error::{Error, Result};
use crate::types::{LogLine, Session, SessionSpan, SystemChange};

const HEAVY_RULE_WIDTH: usize = 120;
const CLIENT_RULE_WIDTH: usize = 100;

/// Render sorted sessions and the auxiliary event categories as the text
/// report. Client blocks are split wherever the client id changes, so the
/// sessions should already be in [`sort_sessions`](crate::sort_sessions) order.
pub fn render_report(
    sessions: &[Session],
    system_changes: &[SystemChange],
    skip_events: &[LogLine],
    other_events: &[LogLine],
) -> String {
    let heavy = "=".repeat(HEAVY_RULE_WIDTH);
    let light = "-".repeat(CLIENT_RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", heavy);
    let _ = writeln!(out, "WiFi Client Session Analysis Report");
    let _ = writeln!(out, "{}", heavy);
    let _ = writeln!(out, "Total Sessions: {}", sessions.len());
    let _ = writeln!(out, "Unique Clients: {}", unique_clients(sessions));
    let _ = writeln!(out, "{}", heavy);
    out.push('\n');

    let mut current_client: Option<&str> = None;
    for session in sessions {
        if current_client != Some(session.client_id.as_str()) {
            if current_client.is_some() {
                let _ = write!(out, "\n{}\n\n", light);
            }
            current_client = Some(session.client_id.as_str());
            let _ = writeln!(out, "CLIENT: {}", session.client_id);
            let _ = writeln!(out, "{}", light);
        }

        render_session(&mut out, session);
        out.push('\n');
    }

    render_section(
        &mut out,
        "System Parameter Changes",
        system_changes.iter().map(|c| (c.timestamp.as_str(), c.line.as_str())),
    );
    render_section(
        &mut out,
        "Skip Events",
        skip_events.iter().map(|e| (e.timestamp.as_str(), e.line.as_str())),
    );
    render_section(
        &mut out,
        "Other Events",
        other_events.iter().map(|e| (e.timestamp.as_str(), e.line.as_str())),
    );

    out
}

fn render_session(out: &mut String, session: &Session) {
    match &session.span {
        SessionSpan::Completed {
            associate,
            disassociate,
        } => {
            let duration = session.duration().unwrap_or(SessionDuration::Unknown);
            let _ = writeln!(out, "ASSOC:    {} on {}", associate.timestamp, associate.vap);
            let _ = writeln!(
                out,
                "DISASSOC: {} on {} (reason: {})",
                disassociate.endpoint.timestamp,
                disassociate.endpoint.vap,
                disassociate.reason_code.as_deref().unwrap_or("")
            );
            let _ = writeln!(out, "DURATION: {}", duration);
        }
        SessionSpan::AssociateOnly { associate } => {
            let _ = writeln!(
                out,
                "ASSOC:    {} on {} (No disconnection recorded)",
                associate.timestamp, associate.vap
            );
        }
        SessionSpan::DisassociateOnly { disassociate } => {
            let _ = writeln!(
                out,
                "DISASSOC: {} on {} (reason: {}) (No prior association recorded)",
                disassociate.endpoint.timestamp,
                disassociate.endpoint.vap,
                disassociate.reason_code.as_deref().unwrap_or("")
            );
        }
    }
}

fn render_section<'a>(
    out: &mut String,
    title: &str,
    entries: impl ExactSizeIterator<Item = (&'a str, &'a str)>,
) {
    if entries.len() == 0 {
        return;
    }
    let heavy = "=".repeat(HEAVY_RULE_WIDTH);
    let _ = write!(out, "\n{}\n{}\n{}\n", heavy, title, heavy);
    for (timestamp, line) in entries {
        let _ = writeln!(out, "{}: {}", timestamp, line);
    }
}

fn unique_clients(sessions: &[Session]) -> usize {
    sessions
        .iter()
        .map(|s| s.client_id.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Drop every character outside 7-bit ASCII.
pub fn to_ascii_lossy(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

/// Write the report as ASCII, replacing `path` only once the whole text is on
/// disk.
pub fn write_report(path: &Path, report: &str) -> Result<()> {
    let ascii = to_ascii_lossy(report);
    let staging = staging_path(path);

    std::fs::write(&staging, ascii.as_bytes()).map_err(|source| Error::Io {
        path: staging.clone(),
        source,
    })?;
    if let Err(source) = std::fs::rename(&staging, path) {
        let _ = std::fs::remove_file(&staging);
        return Err(Error::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    debug!(path = %path.display(), bytes = ascii.len(), "Wrote session report");
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "report".into());
    name.push(".partial");
    path.with_file_name(name)
}
