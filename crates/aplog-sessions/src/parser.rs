use lazy_static::lazy_static;
use regex::Regex;

use crate::timestamp::find_timestamp;
use crate::types::{ChannelChange, ClientAction, ClientEvent, LogLine, RawEvent, SystemChange};

lazy_static! {
    static ref CLIENT_RE: Regex = Regex::new(r"reported client=\[([^\]]+)\] (assoc|disassoc)")
        .expect("client pattern is valid");
    static ref VAP_RE: Regex = Regex::new(r"on vap=\[([^\]]+)\]").expect("vap pattern is valid");
    static ref REASON_CODE_RE: Regex =
        Regex::new(r"reason code=\[(\d+)\]").expect("reason code pattern is valid");
    static ref CHANNEL_RE: Regex =
        Regex::new(r"reason=\[(\d+)\], oldCh->newCh=\[(\d+)\]->\[(\d+)\]")
            .expect("channel pattern is valid");
}

/// Classifies single access-point log lines.
///
/// Client association events are always recognised. Configuration changes,
/// skip diagnostics and the catch-all "other" category are only produced when
/// system events are included.
#[derive(Debug, Clone, Copy)]
pub struct LineParser {
    include_system_events: bool,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            include_system_events: true,
        }
    }

    pub fn with_system_events(mut self, include: bool) -> Self {
        self.include_system_events = include;
        self
    }

    pub fn includes_system_events(&self) -> bool {
        self.include_system_events
    }

    /// Classify one line. Returns `None` for blank lines, lines without a
    /// timestamp, and non-client lines when system events are excluded.
    pub fn parse(&self, line: &str) -> Option<RawEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let timestamp = find_timestamp(line)?.to_string();

        if let Some(caps) = CLIENT_RE.captures(line) {
            let action = if &caps[2] == "assoc" {
                ClientAction::Associate
            } else {
                ClientAction::Disassociate
            };
            let vap = VAP_RE
                .captures(line)
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            let reason_code = match action {
                ClientAction::Associate => None,
                ClientAction::Disassociate => {
                    REASON_CODE_RE.captures(line).map(|c| c[1].to_string())
                }
            };

            return Some(RawEvent::Client(ClientEvent {
                client_id: caps[1].to_string(),
                action,
                vap,
                reason_code,
                timestamp,
                line: line.to_string(),
            }));
        }

        if !self.include_system_events {
            return None;
        }

        let line = line.to_string();
        if is_config_change(&line) {
            let channel = CHANNEL_RE.captures(&line).map(|c| ChannelChange {
                reason: c[1].to_string(),
                old_channel: c[2].to_string(),
                new_channel: c[3].to_string(),
            });
            Some(RawEvent::SystemChange(SystemChange {
                timestamp,
                line,
                channel,
            }))
        } else if line.to_lowercase().contains("skip") {
            Some(RawEvent::Skip(LogLine { timestamp, line }))
        } else {
            Some(RawEvent::Other(LogLine { timestamp, line }))
        }
    }
}

fn is_config_change(line: &str) -> bool {
    line.contains("reason=") && line.contains("oldCh->newCh")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventKind;

    const ASSOC: &str = "Mon Jan 02 10:00:00 | reported client=[aa:bb] assoc on vap=[rai0]";
    const DISASSOC: &str =
        "Mon Jan 02 10:05:30 | reported client=[aa:bb] disassoc on vap=[rai0], reason code=[4]";
    const CONFIG: &str =
        "Mon Jan 02 10:06:00 | acs: reason=[2], oldCh->newCh=[36]->[44], bw=[80]";
    const SKIP: &str = "Mon Jan 02 10:07:00 | acs: SKIP dfs channel 52";
    const OTHER: &str = "Mon Jan 02 10:08:00 | beacon interval updated";

    fn client(event: Option<RawEvent>) -> ClientEvent {
        match event {
            Some(RawEvent::Client(e)) => e,
            other => panic!("Expected client event, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_associate() {
        let event = client(LineParser::new().parse(ASSOC));
        assert_eq!(event.client_id, "aa:bb");
        assert_eq!(event.action, ClientAction::Associate);
        assert_eq!(event.vap, "rai0");
        assert_eq!(event.reason_code, None);
        assert_eq!(event.timestamp, "Mon Jan 02 10:00:00");
        assert_eq!(event.line, ASSOC);
    }

    #[test]
    fn test_parse_disassociate_with_reason() {
        let event = client(LineParser::new().parse(DISASSOC));
        assert_eq!(event.action, ClientAction::Disassociate);
        assert_eq!(event.vap, "rai0");
        assert_eq!(event.reason_code, Some("4".to_string()));
    }

    #[test]
    fn test_parse_disassociate_without_reason_or_vap() {
        let line = "Mon Jan 02 10:05:30 reported client=[cc:dd] disassoc";
        let event = client(LineParser::new().parse(line));
        assert_eq!(event.vap, "");
        assert_eq!(event.reason_code, None);
    }

    #[test]
    fn test_associate_never_carries_reason_code() {
        let line = "Mon Jan 02 10:00:00 reported client=[aa:bb] assoc on vap=[rai0], reason code=[7]";
        let event = client(LineParser::new().parse(line));
        assert_eq!(event.reason_code, None);
    }

    #[test]
    fn test_line_is_trimmed() {
        let padded = format!("   {}  \r\n", ASSOC);
        let event = client(LineParser::new().parse(&padded));
        assert_eq!(event.line, ASSOC);
    }

    #[test]
    fn test_blank_and_untimed_lines_are_dropped() {
        let parser = LineParser::new();
        assert_eq!(parser.parse(""), None);
        assert_eq!(parser.parse("   \t"), None);
        assert_eq!(parser.parse("reported client=[aa:bb] assoc on vap=[rai0]"), None);
    }

    #[test]
    fn test_system_categories() {
        let parser = LineParser::new();

        match parser.parse(CONFIG) {
            Some(RawEvent::SystemChange(change)) => {
                let channel = change.channel.unwrap();
                assert_eq!(channel.reason, "2");
                assert_eq!(channel.old_channel, "36");
                assert_eq!(channel.new_channel, "44");
                assert!(channel.is_switch());
            }
            other => panic!("Expected system change, got {:?}", other),
        }

        assert_eq!(parser.parse(SKIP).map(|e| e.kind()), Some(EventKind::SkipDiagnostic));
        assert_eq!(parser.parse(OTHER).map(|e| e.kind()), Some(EventKind::Other));
    }

    #[test]
    fn test_config_change_without_channel_fields() {
        let line = "Mon Jan 02 10:06:00 reason=dfs oldCh->newCh unknown";
        match LineParser::new().parse(line) {
            Some(RawEvent::SystemChange(change)) => assert_eq!(change.channel, None),
            other => panic!("Expected system change, got {:?}", other),
        }
    }

    #[test]
    fn test_config_change_takes_precedence_over_skip() {
        let line = "Mon Jan 02 10:06:00 reason=[1], oldCh->newCh=[1]->[6] skip dfs";
        assert_eq!(
            LineParser::new().parse(line).map(|e| e.kind()),
            Some(EventKind::SystemConfigChange)
        );
    }

    #[test]
    fn test_client_event_takes_precedence_over_system() {
        let line = "Mon Jan 02 10:00:00 skip reported client=[aa:bb] assoc reason=[1] oldCh->newCh";
        assert_eq!(
            LineParser::new().parse(line).map(|e| e.kind()),
            Some(EventKind::ClientEvent)
        );
    }

    #[test]
    fn test_system_events_excluded() {
        let parser = LineParser::new().with_system_events(false);
        assert!(!parser.includes_system_events());
        assert_eq!(parser.parse(CONFIG), None);
        assert_eq!(parser.parse(SKIP), None);
        assert_eq!(parser.parse(OTHER), None);
        assert_eq!(parser.parse(ASSOC).map(|e| e.kind()), Some(EventKind::ClientEvent));
    }

    #[test]
    fn test_classification_is_exclusive() {
        let parser = LineParser::new();
        let lines = [ASSOC, DISASSOC, CONFIG, SKIP, OTHER, "", "no timestamp here"];
        let expected = [
            Some(EventKind::ClientEvent),
            Some(EventKind::ClientEvent),
            Some(EventKind::SystemConfigChange),
            Some(EventKind::SkipDiagnostic),
            Some(EventKind::Other),
            None,
            None,
        ];

        for (line, kind) in lines.iter().zip(expected) {
            let event = parser.parse(line);
            assert_eq!(event.as_ref().map(|e| e.kind()), kind, "line: {}", line);
            if let Some(event) = event {
                assert_eq!(event.line(), line.trim());
                assert!(line.contains(event.timestamp()));
            }
        }
    }
}
