//! `pwvault open`: unlock the vault and run the interactive session.

use crate::audit;
use crate::cli::editor::ExternalEditor;
use crate::cli::interrupt::Interrupt;
use crate::cli::output;
use crate::cli::repl::{self, StdinLines};
use crate::cli::{load_settings, vault_path, Cli, TerminalPrompter};
use crate::errors::{Result, VaultError};
use crate::session::{self, Session};

/// Execute the `open` command (also the default with no subcommand).
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;
    let backup_dir = settings
        .backups_enabled
        .then(|| settings.backup_dir(&path));

    let mut prompter = TerminalPrompter::from_env();
    let unlocked = match session::unlock(&path, backup_dir.as_deref(), &mut prompter) {
        Ok(unlocked) => unlocked,
        Err(e @ VaultError::VaultNotFound(_)) => {
            output::tip("Run `pwvault init` to create a vault.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    output::success(&format!(
        "Vault unlocked with {} entries",
        unlocked.entries
    ));
    if let Some(backup) = &unlocked.backup {
        tracing::debug!(backup = %backup.display(), "startup backup written");
    }

    let device = settings.device_name();
    audit::log_audit(
        &path,
        "unlock",
        &device,
        None,
        Some(&format!("{} entries", unlocked.entries)),
    );
    output::tip("Type `help` to see the available commands.");

    let interrupt = Interrupt::install()?;
    let mut session = Session::new(
        unlocked.store,
        device,
        prompter.with_interrupt(interrupt.clone()),
        ExternalEditor::new().with_interrupt(interrupt.clone()),
    );
    repl::run(&mut session, StdinLines, &interrupt)
}
