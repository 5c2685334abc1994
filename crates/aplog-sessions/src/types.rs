use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::duration::SessionDuration;

/// Category a log line was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ClientEvent,
    SystemConfigChange,
    SkipDiagnostic,
    Other,
}

/// One classified log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawEvent {
    Client(ClientEvent),
    SystemChange(SystemChange),
    Skip(LogLine),
    Other(LogLine),
}

impl RawEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RawEvent::Client(_) => EventKind::ClientEvent,
            RawEvent::SystemChange(_) => EventKind::SystemConfigChange,
            RawEvent::Skip(_) => EventKind::SkipDiagnostic,
            RawEvent::Other(_) => EventKind::Other,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            RawEvent::Client(e) => &e.timestamp,
            RawEvent::SystemChange(e) => &e.timestamp,
            RawEvent::Skip(e) | RawEvent::Other(e) => &e.timestamp,
        }
    }

    pub fn line(&self) -> &str {
        match self {
            RawEvent::Client(e) => &e.line,
            RawEvent::SystemChange(e) => &e.line,
            RawEvent::Skip(e) | RawEvent::Other(e) => &e.line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAction {
    Associate,
    Disassociate,
}

/// A `reported client=[..] assoc|disassoc` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEvent {
    pub client_id: String,
    pub action: ClientAction,
    /// Radio interface, empty when the line names none.
    pub vap: String,
    /// Only ever set on disassociations.
    pub reason_code: Option<String>,
    pub timestamp: String,
    pub line: String,
}

/// A timestamped line kept verbatim for the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: String,
    pub line: String,
}

/// A channel/power configuration change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemChange {
    pub timestamp: String,
    pub line: String,
    pub channel: Option<ChannelChange>,
}

/// Structured part of `reason=[N], oldCh->newCh=[A]->[B]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelChange {
    pub reason: String,
    pub old_channel: String,
    pub new_channel: String,
}

impl ChannelChange {
    pub fn is_switch(&self) -> bool {
        self.old_channel != self.new_channel
    }
}

/// One half of a session, copied out of the event that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub timestamp: String,
    pub at: NaiveDateTime,
    pub vap: String,
    pub line: String,
}

/// The disassociate half of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disconnect {
    #[serde(flatten)]
    pub endpoint: Endpoint,
    pub reason_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionSpan {
    Completed {
        associate: Endpoint,
        disassociate: Disconnect,
    },
    /// Never disconnected within the log.
    AssociateOnly { associate: Endpoint },
    /// Disconnected without a preceding association in the log.
    DisassociateOnly { disassociate: Disconnect },
}

/// A reconstructed connection episode for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub client_id: String,
    pub span: SessionSpan,
}

impl Session {
    pub fn associate(&self) -> Option<&Endpoint> {
        match &self.span {
            SessionSpan::Completed { associate, .. } | SessionSpan::AssociateOnly { associate } => {
                Some(associate)
            }
            SessionSpan::DisassociateOnly { .. } => None,
        }
    }

    pub fn disassociate(&self) -> Option<&Disconnect> {
        match &self.span {
            SessionSpan::Completed { disassociate, .. }
            | SessionSpan::DisassociateOnly { disassociate } => Some(disassociate),
            SessionSpan::AssociateOnly { .. } => None,
        }
    }

    pub fn reason_code(&self) -> Option<&str> {
        self.disassociate().and_then(|d| d.reason_code.as_deref())
    }

    /// Elapsed time, for completed sessions only.
    pub fn duration(&self) -> Option<SessionDuration> {
        match &self.span {
            SessionSpan::Completed {
                associate,
                disassociate,
            } => Some(SessionDuration::between(associate.at, disassociate.endpoint.at)),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.span, SessionSpan::Completed { .. })
    }
}
