//! CSV rendering of e-club subscriptions.

use crate::store::Row;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde_json::Value;

/// Upper bound on rows in one export.
pub const EXPORT_LIMIT: u64 = 10_000;

const BOM: char = '\u{feff}';
const HEADER: [&str; 3] = ["ID", "Email", "Subscribed At"];

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn cell(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `YYYY/M/D HH:MM:SS` at the given offset; unparseable values pass through.
fn local_time(v: Option<&Value>, offset: FixedOffset) -> String {
    let raw = cell(v);
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(t) => t.with_timezone(&offset).format("%Y/%-m/%-d %H:%M:%S").to_string(),
        Err(_) => raw,
    }
}

/// UTF-8 CSV with a leading BOM and one line per subscription.
pub fn eclub_csv(rows: &[Row], offset: FixedOffset) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str(&HEADER.join(","));
    out.push('\n');
    for row in rows {
        let line = [
            escape(&cell(row.get("id"))),
            escape(&cell(row.get("email"))),
            escape(&local_time(row.get("created_at"), offset)),
        ];
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

pub fn export_filename(day: NaiveDate) -> String {
    format!("eclub-subscribers-{}.csv", day.format("%Y-%m-%d"))
}

/// Offset for an hour count; out-of-range values mean UTC.
pub fn offset_hours(hours: i32) -> FixedOffset {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}
