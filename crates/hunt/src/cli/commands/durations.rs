//! Implementation of `hunt durations`.

use std::process::ExitCode;

use chrono::{Local, TimeZone};
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use hunt_index::{DURATION_NAMES, duration_range};

/// Lists the values `modified:` accepts with the time range each one covers right now.
pub fn run() -> ExitCode {
    let now = Local::now();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Name", "From", "To"]);
    for name in DURATION_NAMES {
        let Some((from, to)) = duration_range(name, now) else {
            continue;
        };
        table.add_row(vec![name.to_string(), format_millis(from), format_millis(to)]);
    }
    println!("{table}");
    println!("Prefix a number for multiples, e.g. modified:\"2 week\".");
    ExitCode::SUCCESS
}

/// Formats milliseconds since the epoch as local time.
fn format_millis(millis: i64) -> String {
    Local.timestamp_millis_opt(millis).earliest().map_or_else(
        || millis.to_string(),
        |time| time.format("%Y-%m-%d %H:%M").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_local_time() {
        let formatted = format_millis(Local::now().timestamp_millis());
        assert_eq!(formatted.len(), "2024-01-01 00:00".len());
    }
}
