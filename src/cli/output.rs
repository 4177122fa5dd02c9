//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::errors::Result;
use crate::vault::{Entry, ResultSet};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the rows of a list or search.
///
/// The `#` column is the storage position, which is what the user types
/// back to `show`, `edit` and `remove`.
pub fn print_results_table(results: &ResultSet) {
    if results.is_empty() {
        info("No matching entries.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Title", "Username", "Last changed", "Last accessed"]);

    for (position, entry) in results.rows() {
        let changed = entry
            .last_changed_utc
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        let accessed = entry.access.latest().map_or_else(
            || "-".to_string(),
            |(device, at)| format!("{} ({device})", at.format("%Y-%m-%d %H:%M")),
        );
        table.add_row(vec![
            position.to_string(),
            entry.display_title().to_string(),
            entry.username.clone(),
            changed,
            accessed,
        ]);
    }

    println!("{table}");
}

/// Print a single entry as pretty JSON, the same shape the editor shows.
pub fn print_entry(entry: &Entry) -> Result<()> {
    println!("{}", crate::vault::entry_to_json(entry)?.as_str());
    Ok(())
}

/// Print the interactive command reference.
pub fn print_help() {
    let rows = [
        ("search <term>", "Find entries whose title contains <term>"),
        ("list", "List every entry"),
        ("add [--top]", "Create an entry in the editor (--top puts it first)"),
        ("show <n>", "Show entry <n> from the last list/search"),
        ("edit <n>", "Edit entry <n> in the editor"),
        ("remove <n>", "Delete entry <n> after confirmation"),
        ("print", "Print the whole decrypted vault"),
        ("clear", "Clear the screen"),
        ("help", "Show this help"),
        ("exit, quit", "Leave pwvault"),
    ];

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Command", "Description"]);
    for (cmd, desc) in rows {
        table.add_row(vec![cmd, desc]);
    }
    println!("{table}");
}
