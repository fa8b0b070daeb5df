//! Console rendering for login outcomes and attempt history.

use chrono::Local;
use comfy_table::{ContentArrangement, Table};

use crate::service::attempt::AttemptRecord;
use crate::service::portal::{Connectivity, LoginOutcome};

const MESSAGE_WIDTH: usize = 60;

/// Create a borderless table with the given headers.
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_header(headers);
    table
}

fn truncate(text: &str, width: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

pub fn attempts_table(records: &[AttemptRecord]) -> String {
    if records.is_empty() {
        return "No login attempts recorded.".to_string();
    }

    let mut table = new_table(&["ID", "TIME", "USER", "NETWORK", "STATUS", "MESSAGE"]);
    for record in records {
        table.add_row(vec![
            record.id.to_string(),
            record
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            record.username.clone(),
            record.network_name.clone().unwrap_or_else(|| "-".to_string()),
            record.response_status.clone(),
            truncate(&record.response_message, MESSAGE_WIDTH),
        ]);
    }
    table.to_string()
}

pub fn outcome_line(outcome: &LoginOutcome) -> String {
    let already = outcome
        .portal_status
        .as_deref()
        .is_some_and(|status| status.contains("LIVE"));

    match (outcome.success, already) {
        (true, true) => format!("Already signed in. Message: {}", outcome.message),
        (true, false) => format!("Login successful! Message: {}", outcome.message),
        (false, _) => format!("Login failed ({}). Message: {}", outcome.status, outcome.message),
    }
}

pub fn connectivity_line(url: &str, connectivity: &Connectivity) -> String {
    match connectivity {
        Connectivity::Reachable(status) => format!("{url} is reachable (HTTP {status})"),
        Connectivity::Unreachable(reason) => format!("{url} is unreachable: {reason}"),
    }
}
