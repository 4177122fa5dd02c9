//! `pwvault rotate-key`: change the vault master password.
//!
//! Unlocks the vault with the current password, generates a new salt,
//! derives a new key from the new password, and re-seals the same
//! entries with an atomic write.

use crate::audit;
use crate::cli::output;
use crate::cli::{load_settings, prompt_new_password, vault_path, Cli, TerminalPrompter};
use crate::errors::Result;
use crate::session;

/// Execute the `rotate-key` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;
    let backup_dir = settings
        .backups_enabled
        .then(|| settings.backup_dir(&path));

    // 1. Open the vault with the current password.  The backup taken here
    //    still opens with the old password.
    output::info("Enter your current master password.");
    let unlocked = session::unlock(&path, backup_dir.as_deref(), &mut TerminalPrompter::from_env())?;
    let mut store = unlocked.store;
    let vault = store.load()?;

    // 2. Prompt for the new password and re-key.
    output::info("Choose your new master password.");
    let new_password = prompt_new_password()?;
    store.rekey(new_password, &settings.argon2_params())?;

    // 3. Save atomically under the new key.
    store.save(&vault)?;

    audit::log_audit(
        &path,
        "rotate-key",
        &settings.device_name(),
        None,
        Some(&format!("{} entries re-encrypted", vault.len())),
    );

    output::success(&format!(
        "Password rotated ({} entries re-encrypted)",
        vault.len()
    ));
    Ok(())
}
