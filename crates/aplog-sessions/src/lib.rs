//! # aplog-sessions
//!
//! Client session reconstruction from WiFi access-point event logs.
//!
//! ## Pipeline
//!
//! 1. [`LineParser`] classifies each line into a [`RawEvent`].
//! 2. [`EventStore`] groups client events by client id and keeps the other
//!    categories in file order.
//! 3. [`pair_sessions`] turns each client's events into [`Session`]s.
//! 4. [`sort_sessions`] orders them by client, then association time.
//! 5. [`render_report`] produces the text report, [`write_report`] saves it.
//!
//! ```rust,ignore
//! use aplog_sessions::{EventStore, LineParser, DEFAULT_YEAR};
//!
//! let store = EventStore::load(path, &LineParser::new())?;
//! let sessions = sort_sessions(pair_sessions(&store, DEFAULT_YEAR)?);
//! let report = render_report(
//!     &sessions,
//!     store.system_changes(),
//!     store.skip_events(),
//!     store.other_events(),
//! );
//! write_report(output, &report)?;
//! ```

mod duration;
mod error;
mod pairing;
mod parser;
mod report;
mod store;
mod summary;
mod timestamp;
mod types;

pub use duration::{duration_between, SessionDuration};
pub use error::{Error, Result};
pub use pairing::{check_year, pair_client, pair_sessions, sort_sessions};
pub use parser::LineParser;
pub use report::{render_report, to_ascii_lossy, write_report};
pub use store::EventStore;
pub use summary::{reason_description, RunSummary};
pub use timestamp::{find_timestamp, parse_timestamp, DEFAULT_YEAR, SUPPORTED_YEARS};
pub use types::{
    ChannelChange, ClientAction, ClientEvent, Disconnect, Endpoint, EventKind, LogLine, RawEvent,
    Session, SessionSpan, SystemChange,
};
