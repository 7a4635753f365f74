//! Calendar days in the user's timezone. Streaks and check-in dates are
//! counted on local days, never UTC days.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Format accepted for `created_at` columns in check-in exports.
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| anyhow!("unknown IANA timezone '{name}'"))
}

/// The user's local calendar day at `now`.
pub fn local_today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Interpret a wall-clock timestamp in `tz`. When a DST fall-back makes it
/// occur twice, the earlier instant wins; a spring-forward gap is an error.
pub fn parse_local_to_utc(local: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(local, LOCAL_TIMESTAMP_FORMAT)
        .map_err(|e| anyhow!("'{local}' is not {LOCAL_TIMESTAMP_FORMAT}: {e}"))?;

    let at = match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(first, _) => first,
        LocalResult::None => bail!("{local} does not exist in {tz} (skipped by DST)"),
    };
    Ok(at.with_timezone(&Utc))
}
