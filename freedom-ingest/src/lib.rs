//! freedom-ingest: activity history imports (check-in and business snapshot CSV exports).

pub mod parsers;

pub use parsers::checkins_csv::{parse_checkins_csv, parse_checkins_reader};
pub use parsers::snapshots_csv::{parse_snapshots_csv, parse_snapshots_reader};
