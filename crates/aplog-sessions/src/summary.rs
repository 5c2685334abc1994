use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::store::EventStore;
use crate::types::{Session, SessionSpan};

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_sessions: usize,
    pub unique_clients: usize,
    pub completed_sessions: usize,
    pub associate_only: usize,
    pub disassociate_only: usize,
    pub system_changes: usize,
    /// Config changes that actually moved to another channel.
    pub channel_switches: usize,
    pub skip_events: usize,
    pub other_events: usize,
    /// Disassociations per reason code. Missing codes count under "".
    pub reason_codes: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn collect(sessions: &[Session], store: &EventStore) -> Self {
        let mut summary = RunSummary {
            total_sessions: sessions.len(),
            unique_clients: sessions
                .iter()
                .map(|s| s.client_id.as_str())
                .collect::<BTreeSet<_>>()
                .len(),
            system_changes: store.system_changes().len(),
            channel_switches: store
                .system_changes()
                .iter()
                .filter(|c| c.channel.as_ref().is_some_and(|ch| ch.is_switch()))
                .count(),
            skip_events: store.skip_events().len(),
            other_events: store.other_events().len(),
            ..Default::default()
        };

        for session in sessions {
            match session.span {
                SessionSpan::Completed { .. } => summary.completed_sessions += 1,
                SessionSpan::AssociateOnly { .. } => summary.associate_only += 1,
                SessionSpan::DisassociateOnly { .. } => summary.disassociate_only += 1,
            }
            if let Some(disassociate) = session.disassociate() {
                let code = disassociate.reason_code.clone().unwrap_or_default();
                *summary.reason_codes.entry(code).or_insert(0) += 1;
            }
        }

        summary
    }
}

/// Name of a disassociation reason code, for the codes these access points
/// commonly report.
pub fn reason_description(code: &str) -> Option<&'static str> {
    match code.parse::<u16>().ok()? {
        1 => Some("Unspecified reason"),
        3 => Some("Client leaving"),
        4 => Some("Inactivity timeout"),
        5 => Some("AP overload"),
        15 => Some("4-Way handshake timeout"),
        23 => Some("802.1X auth failed"),
        _ => None,
    }
}
