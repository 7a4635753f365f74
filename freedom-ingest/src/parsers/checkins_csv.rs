//! Daily check-in CSV export parser.
//!
//! Expected header (column order is free, extra columns ignored):
//! date,energy_level,tasks_completed[,created_at]
//!
//! `created_at` is a local "YYYY-MM-DD HH:MM" timestamp; when absent the
//! check-in is stamped at local noon of its date.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use freedom_core::{parse_local_to_utc, CheckinRecord};
use std::io::Read;
use std::path::Path;

use super::{column, parse_date};

pub fn parse_checkins_csv(
    path: impl AsRef<Path>,
    user_id: &str,
    tz: Tz,
) -> Result<Vec<CheckinRecord>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    parse_checkins_reader(file, user_id, tz)
}

/// Parse check-ins from any reader. Rows with an unparseable date are skipped.
pub fn parse_checkins_reader<R: Read>(
    reader: R,
    user_id: &str,
    tz: Tz,
) -> Result<Vec<CheckinRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("reading check-in header")?.clone();
    let Some(date_col) = column(&headers, "date") else {
        bail!("check-in CSV is missing a 'date' column");
    };
    let energy_col = column(&headers, "energy_level");
    let tasks_col = column(&headers, "tasks_completed");
    let created_col = column(&headers, "created_at");

    let mut out = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = result?;

        let Some(date) = record.get(date_col).and_then(parse_date) else {
            skipped += 1;
            continue;
        };

        let energy_level = energy_col
            .and_then(|i| record.get(i))
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(5)
            .clamp(1, 10) as u8;

        let tasks_completed = tasks_col
            .and_then(|i| record.get(i))
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);

        let created_at = created_col
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .and_then(|s| parse_local_to_utc(s, tz).ok())
            .unwrap_or_else(|| local_noon(date, tz));

        out.push(CheckinRecord {
            user_id: user_id.to_string(),
            date,
            energy_level,
            tasks_completed,
            created_at,
        });
    }

    if skipped > 0 {
        tracing::warn!(skipped, "skipped check-in rows with unparseable dates");
    }

    Ok(out)
}

fn local_noon(date: chrono::NaiveDate, tz: Tz) -> DateTime<Utc> {
    let noon = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
    tz.from_local_datetime(&noon)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&noon))
}
