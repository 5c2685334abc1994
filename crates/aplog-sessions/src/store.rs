use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::parser::LineParser;
use crate::types::{ClientEvent, LogLine, RawEvent, SystemChange};

/// Parsed events of a single run, grouped for pairing and reporting.
#[derive(Debug, Default)]
pub struct EventStore {
    by_client: BTreeMap<String, Vec<ClientEvent>>,
    system_changes: Vec<SystemChange>,
    skip_events: Vec<LogLine>,
    other_events: Vec<LogLine>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a whole log file and ingest it.
    ///
    /// Bytes that are not valid UTF-8 are dropped rather than rejected.
    /// Lines may end in `\n`, `\r\n` or a bare `\r`.
    pub fn load(path: &Path, parser: &LineParser) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = decode_ignoring_invalid(&bytes);

        let mut store = Self::new();
        store.ingest(
            content.split(['\r', '\n']).filter(|line| !line.is_empty()),
            parser,
        );
        debug!(
            path = %path.display(),
            clients = store.client_count(),
            client_events = store.client_event_count(),
            "Loaded access-point log"
        );
        Ok(store)
    }

    /// Classify lines in order and file each event under its category.
    pub fn ingest<I, S>(&mut self, lines: I, parser: &LineParser)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            if let Some(event) = parser.parse(line.as_ref()) {
                self.push(event);
            }
        }
    }

    pub fn push(&mut self, event: RawEvent) {
        match event {
            RawEvent::Client(e) => self.by_client.entry(e.client_id.clone()).or_default().push(e),
            RawEvent::SystemChange(e) => self.system_changes.push(e),
            RawEvent::Skip(e) => self.skip_events.push(e),
            RawEvent::Other(e) => self.other_events.push(e),
        }
    }

    /// Client events keyed by client id, each list in file order.
    pub fn by_client(&self) -> &BTreeMap<String, Vec<ClientEvent>> {
        &self.by_client
    }

    pub fn client_events(&self, client_id: &str) -> &[ClientEvent] {
        self.by_client
            .get(client_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn system_changes(&self) -> &[SystemChange] {
        &self.system_changes
    }

    pub fn skip_events(&self) -> &[LogLine] {
        &self.skip_events
    }

    pub fn other_events(&self) -> &[LogLine] {
        &self.other_events
    }

    pub fn client_count(&self) -> usize {
        self.by_client.len()
    }

    pub fn client_event_count(&self) -> usize {
        self.by_client.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_client.is_empty()
            && self.system_changes.is_empty()
            && self.skip_events.is_empty()
            && self.other_events.is_empty()
    }
}

/// Keep the valid UTF-8 runs of `bytes`, skipping invalid sequences.
fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
