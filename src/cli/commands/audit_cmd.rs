//! `pwvault audit`: display the audit log.
//!
//! Usage:
//!   pwvault audit               # show last 50 entries
//!   pwvault audit --last 20     # show last 20
//!   pwvault audit --since 7d    # entries from last 7 days

use chrono::{DateTime, Duration, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::audit::{audit_dir, AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::{load_settings, vault_path, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;

    let since_dt = since.map(parse_duration).transpose()?;

    let audit = AuditLog::open(&audit_dir(&path))
        .ok_or_else(|| VaultError::AuditError("failed to open audit database".into()))?;
    let entries = audit.query(last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);
    Ok(())
}

/// Parse a human-friendly duration string like "7d", "24h", "30m" into
/// the moment that long ago.
fn parse_duration(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        VaultError::CommandFailed(format!(
            "invalid duration '{input}' — use format like 7d, 24h, or 30m"
        ))
    };

    let unit = input.chars().last().ok_or_else(invalid)?;
    let num: i64 = input[..input.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;

    let duration = match unit {
        'd' => Duration::try_days(num),
        'h' => Duration::try_hours(num),
        'm' => Duration::try_minutes(num),
        _ => None,
    }
    .ok_or_else(invalid)?;

    Ok(Utc::now() - duration)
}

/// Print audit entries in a formatted table.
fn print_audit_table(entries: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Device", "Entry", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry.device.clone(),
            entry.entry_title.as_deref().unwrap_or("-").to_string(),
            entry.details.as_deref().unwrap_or("-").to_string(),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize operation names for display.
fn colorize_operation(op: &str) -> String {
    match op {
        "init" | "migrate" => style(op).green().to_string(),
        "add" | "edit" => style(op).blue().to_string(),
        "remove" => style(op).red().to_string(),
        "rotate-key" => style(op).yellow().to_string(),
        "show" | "unlock" => style(op).cyan().to_string(),
        _ => op.to_string(),
    }
}
