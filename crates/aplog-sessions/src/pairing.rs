//! Reconstruct per-client sessions from association events.
//!
//! Each client's events are ordered by time, then scanned once: an
//! association claims the nearest later disassociation, skipping any
//! associations in between. Whatever is left unclaimed becomes a half
//! session.

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::EventStore;
use crate::timestamp::{parse_timestamp, SUPPORTED_YEARS};
use crate::types::{ClientAction, ClientEvent, Disconnect, Endpoint, Session, SessionSpan};

/// Pair every client's events in the store. Sessions come back grouped by
/// client; use [`sort_sessions`] for report order.
pub fn pair_sessions(store: &EventStore, year: i32) -> Result<Vec<Session>> {
    check_year(year)?;
    let mut sessions = Vec::new();
    for (client_id, events) in store.by_client() {
        sessions.extend(pair_client(client_id, events, year)?);
    }
    debug!(
        sessions = sessions.len(),
        clients = store.client_count(),
        "Paired client sessions"
    );
    Ok(sessions)
}

/// Reject assumed years no timestamp can resolve against, so the error names
/// the year instead of the first log line.
pub fn check_year(year: i32) -> Result<()> {
    if SUPPORTED_YEARS.contains(&year) {
        Ok(())
    } else {
        Err(Error::UnsupportedYear {
            year,
            min: *SUPPORTED_YEARS.start(),
            max: *SUPPORTED_YEARS.end(),
        })
    }
}

/// Pair one client's events, given in any order.
///
/// Fails if any event's timestamp cannot be resolved against `year`, since
/// the ordering the scan relies on would be meaningless.
pub fn pair_client(client_id: &str, events: &[ClientEvent], year: i32) -> Result<Vec<Session>> {
    let mut timed: Vec<(NaiveDateTime, &ClientEvent)> = events
        .iter()
        .map(|event| {
            parse_timestamp(&event.timestamp, year)
                .map(|at| (at, event))
                .map_err(|source| Error::InvalidTimestamp {
                    client: client_id.to_string(),
                    timestamp: event.timestamp.clone(),
                    source,
                })
        })
        .collect::<Result<_>>()?;
    // Stable, so same-second events keep file order.
    timed.sort_by_key(|(at, _)| *at);

    let mut sessions = Vec::new();
    let mut i = 0;
    while i < timed.len() {
        let (at, event) = timed[i];
        match event.action {
            ClientAction::Associate => {
                let associate = endpoint(at, event);
                let next_disassoc = timed[i + 1..]
                    .iter()
                    .position(|(_, e)| e.action == ClientAction::Disassociate)
                    .map(|offset| i + 1 + offset);

                match next_disassoc {
                    Some(j) => {
                        let (end_at, end) = timed[j];
                        sessions.push(Session {
                            client_id: client_id.to_string(),
                            span: SessionSpan::Completed {
                                associate,
                                disassociate: disconnect(end_at, end),
                            },
                        });
                        i = j + 1;
                    }
                    None => {
                        sessions.push(Session {
                            client_id: client_id.to_string(),
                            span: SessionSpan::AssociateOnly { associate },
                        });
                        i += 1;
                    }
                }
            }
            ClientAction::Disassociate => {
                sessions.push(Session {
                    client_id: client_id.to_string(),
                    span: SessionSpan::DisassociateOnly {
                        disassociate: disconnect(at, event),
                    },
                });
                i += 1;
            }
        }
    }

    Ok(sessions)
}

/// Order sessions by client id, then association time. Sessions without an
/// association sort first within their client.
pub fn sort_sessions(mut sessions: Vec<Session>) -> Vec<Session> {
    sessions.sort_by(compare_sessions);
    sessions
}

fn compare_sessions(a: &Session, b: &Session) -> Ordering {
    a.client_id.cmp(&b.client_id).then_with(|| {
        // `None < Some(_)`, so missing associations behave as the minimum.
        let a_at = a.associate().map(|e| e.at);
        let b_at = b.associate().map(|e| e.at);
        a_at.cmp(&b_at)
    })
}

fn endpoint(at: NaiveDateTime, event: &ClientEvent) -> Endpoint {
    Endpoint {
        timestamp: event.timestamp.clone(),
        at,
        vap: event.vap.clone(),
        line: event.line.clone(),
    }
}

fn disconnect(at: NaiveDateTime, event: &ClientEvent) -> Disconnect {
    Disconnect {
        endpoint: endpoint(at, event),
        reason_code: event.reason_code.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::LineParser;
    use crate::timestamp::DEFAULT_YEAR;
    use crate::types::RawEvent;

    fn assoc(client: &str, time: &str) -> ClientEvent {
        event(client, time, ClientAction::Associate)
    }

    fn disassoc(client: &str, time: &str) -> ClientEvent {
        event(client, time, ClientAction::Disassociate)
    }

    fn event(client: &str, time: &str, action: ClientAction) -> ClientEvent {
        let verb = match action {
            ClientAction::Associate => "assoc",
            ClientAction::Disassociate => "disassoc",
        };
        let line = format!(
            "Mon Jan 02 {} reported client=[{}] {} on vap=[rai0], reason code=[3]",
            time, client, verb
        );
        match LineParser::new().parse(&line) {
            Some(RawEvent::Client(e)) => e,
            other => panic!("Expected client event, got {:?}", other),
        }
    }

    fn times(session: &Session) -> (Option<&str>, Option<&str>) {
        (
            session.associate().map(|e| e.timestamp.as_str()),
            session.disassociate().map(|d| d.endpoint.timestamp.as_str()),
        )
    }

    #[test]
    fn test_simple_pair() {
        let events = vec![assoc("aa", "10:00:00"), disassoc("aa", "10:05:30")];
        let sessions = pair_client("aa", &events, DEFAULT_YEAR).unwrap();

        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].is_completed());
        assert_eq!(sessions[0].reason_code(), Some("3"));
    }

    #[test]
    fn test_out_of_order_events_are_time_sorted() {
        let events = vec![disassoc("aa", "10:05:00"), assoc("aa", "10:00:00")];
        let sessions = pair_client("aa", &events, DEFAULT_YEAR).unwrap();

        assert_eq!(sessions.len(), 1);
        assert_eq!(
            times(&sessions[0]),
            (Some("Mon Jan 02 10:00:00"), Some("Mon Jan 02 10:05:00"))
        );
    }

    #[test]
    fn test_nearest_disassociation_is_claimed() {
        let events = vec![
            assoc("aa", "10:00:00"),
            disassoc("aa", "10:01:00"),
            disassoc("aa", "10:02:00"),
        ];
        let sessions = pair_client("aa", &events, DEFAULT_YEAR).unwrap();

        assert_eq!(sessions.len(), 2);
        assert_eq!(
            times(&sessions[0]),
            (Some("Mon Jan 02 10:00:00"), Some("Mon Jan 02 10:01:00"))
        );
        assert_eq!(times(&sessions[1]), (None, Some("Mon Jan 02 10:02:00")));
    }

    #[test]
    fn test_intervening_associations_are_skipped() {
        let events = vec![
            assoc("aa", "10:00:00"),
            assoc("aa", "10:01:00"),
            disassoc("aa", "10:02:00"),
        ];
        let sessions = pair_client("aa", &events, DEFAULT_YEAR).unwrap();

        // The skipped association is consumed by the scan and emits nothing.
        assert_eq!(sessions.len(), 1);
        assert_eq!(
            times(&sessions[0]),
            (Some("Mon Jan 02 10:00:00"), Some("Mon Jan 02 10:02:00"))
        );
    }

    #[test]
    fn test_trailing_association_is_open() {
        let events = vec![
            assoc("aa", "10:00:00"),
            disassoc("aa", "10:01:00"),
            assoc("aa", "10:02:00"),
        ];
        let sessions = pair_client("aa", &events, DEFAULT_YEAR).unwrap();

        assert_eq!(sessions.len(), 2);
        assert!(matches!(sessions[1].span, SessionSpan::AssociateOnly { .. }));
    }

    #[test]
    fn test_leading_disassociation_is_orphaned() {
        let events = vec![disassoc("aa", "09:00:00"), assoc("aa", "10:00:00")];
        let sessions = pair_client("aa", &events, DEFAULT_YEAR).unwrap();

        assert_eq!(sessions.len(), 2);
        assert!(matches!(sessions[0].span, SessionSpan::DisassociateOnly { .. }));
        assert!(matches!(sessions[1].span, SessionSpan::AssociateOnly { .. }));
    }

    #[test]
    fn test_equal_timestamps_keep_file_order() {
        let events = vec![assoc("aa", "10:00:00"), disassoc("aa", "10:00:00")];
        let sessions = pair_client("aa", &events, DEFAULT_YEAR).unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].is_completed());
    }

    #[test]
    fn test_unsupported_year_names_the_year() {
        let mut store = EventStore::new();
        store.push(RawEvent::Client(assoc("aa", "10:00:00")));

        let err = pair_sessions(&store, 999_999).unwrap_err();
        assert!(matches!(err, Error::UnsupportedYear { year: 999_999, .. }));
        assert!(err.to_string().contains("999999"));
        assert!(check_year(0).is_err());
        assert!(check_year(2024).is_ok());
    }

    #[test]
    fn test_invalid_timestamp_is_fatal() {
        let mut bad = assoc("aa", "10:00:00");
        bad.timestamp = "Mon Foo 02 10:00:00".to_string();
        let events = vec![bad, disassoc("aa", "10:05:00")];

        let err = pair_client("aa", &events, DEFAULT_YEAR).unwrap_err();
        match err {
            Error::InvalidTimestamp {
                client, timestamp, ..
            } => {
                assert_eq!(client, "aa");
                assert_eq!(timestamp, "Mon Foo 02 10:00:00");
            }
            other => panic!("Expected InvalidTimestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_orders_by_client_then_association() {
        let mut sessions = pair_client(
            "bb",
            &[assoc("bb", "08:00:00"), disassoc("bb", "08:30:00")],
            DEFAULT_YEAR,
        )
        .unwrap();
        sessions.extend(
            pair_client(
                "aa",
                &[
                    assoc("aa", "11:00:00"),
                    assoc("aa", "10:00:00"),
                    disassoc("aa", "10:10:00"),
                    disassoc("aa", "12:00:00"),
                    disassoc("aa", "09:00:00"),
                ],
                DEFAULT_YEAR,
            )
            .unwrap(),
        );

        let sorted = sort_sessions(sessions.clone());
        let order: Vec<(&str, Option<&str>)> = sorted
            .iter()
            .map(|s| (s.client_id.as_str(), s.associate().map(|e| e.timestamp.as_str())))
            .collect();

        assert_eq!(
            order,
            vec![
                ("aa", None),
                ("aa", Some("Mon Jan 02 10:00:00")),
                ("aa", Some("Mon Jan 02 11:00:00")),
                ("bb", Some("Mon Jan 02 08:00:00")),
            ]
        );

        assert_eq!(sort_sessions(sorted.clone()), sorted);
    }
}
