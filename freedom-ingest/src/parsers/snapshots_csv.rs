//! Monthly business snapshot CSV parser.
//!
//! Expected header: month,revenue,expenses
//! `month` is "YYYY-MM" (a full date is accepted and truncated to its month).
//! Amounts may carry "$" and thousands separators.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use freedom_core::BusinessSnapshot;
use std::io::Read;
use std::path::Path;

use super::{column, parse_date};

pub fn parse_snapshots_csv(path: impl AsRef<Path>, user_id: &str) -> Result<Vec<BusinessSnapshot>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    parse_snapshots_reader(file, user_id)
}

pub fn parse_snapshots_reader<R: Read>(reader: R, user_id: &str) -> Result<Vec<BusinessSnapshot>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("reading snapshot header")?.clone();
    let (Some(month_col), Some(revenue_col), Some(expenses_col)) = (
        column(&headers, "month"),
        column(&headers, "revenue"),
        column(&headers, "expenses"),
    ) else {
        bail!("snapshot CSV needs 'month', 'revenue' and 'expenses' columns");
    };

    let mut out: Vec<BusinessSnapshot> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let Some(month) = record.get(month_col).and_then(parse_month) else {
            continue;
        };
        let revenue = record.get(revenue_col).map(parse_amount).unwrap_or(0.0);
        let expenses = record.get(expenses_col).map(parse_amount).unwrap_or(0.0);

        // One snapshot per month; a later row replaces an earlier one.
        out.retain(|s| s.month != month);
        out.push(BusinessSnapshot {
            user_id: user_id.to_string(),
            month,
            revenue,
            expenses,
        });
    }

    out.sort_by_key(|s| s.month);
    Ok(out)
}

fn parse_month(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some((y, m)) = s.split_once('-') {
        if !m.contains('-') {
            let year: i32 = y.parse().ok()?;
            let month: u32 = m.parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
    }
    parse_date(s).and_then(|d| d.with_day(1))
}

fn parse_amount(s: &str) -> f64 {
    s.trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_months_and_amounts() {
        let csv = "\
month,revenue,expenses
2026-01,\"$12,500.00\",4200
2026-02-15,13000,5100.50
bad,1,1
2026-01,12800,4200
";
        let snaps = parse_snapshots_reader(csv.as_bytes(), "u1").unwrap();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].month, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        // Later duplicate month wins.
        assert_eq!(snaps[0].revenue, 12_800.0);
        assert_eq!(snaps[1].month, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(snaps[1].expenses, 5100.5);
    }

    #[test]
    fn missing_columns_is_an_error() {
        assert!(parse_snapshots_reader("month,revenue\n2026-01,5\n".as_bytes(), "u1").is_err());
    }

    #[test]
    fn amount_parsing_tolerates_formatting() {
        assert_eq!(parse_amount("$1,234.50"), 1234.5);
        assert_eq!(parse_amount("n/a"), 0.0);
    }
}
