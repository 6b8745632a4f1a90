//! CSV export of registrations.

use chrono::{DateTime, NaiveDate};

use fest_state::Registration;

use crate::error::{ContentError, ContentResult};

const HEADER: [&str; 4] = ["Name", "Email", "Phone", "Registration Date"];

/// Render `registrations` as CSV with every field quoted.
pub fn registrations_csv(registrations: &[Registration]) -> ContentResult<String> {
    if registrations.is_empty() {
        return Err(ContentError::NothingToExport);
    }
    let mut out = String::new();
    push_row(&mut out, HEADER);
    for reg in registrations {
        let date = format_registration_date(reg.timestamp);
        push_row(&mut out, [&reg.name, &reg.email, &reg.phone, &date]);
    }
    Ok(out)
}

/// Download name for an export made on `date`.
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.csv", date.format("%Y-%m-%d"))
}

pub fn format_registration_date(secs: u64) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default()
}

fn push_row<S: AsRef<str>>(out: &mut String, fields: [S; 4]) {
    let row: Vec<String> = fields
        .iter()
        .map(|f| format!("\"{}\"", f.as_ref().replace('"', "\"\"")))
        .collect();
    out.push_str(&row.join(","));
    out.push('\n');
}
