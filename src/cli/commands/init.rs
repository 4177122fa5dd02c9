//! `pwvault init`: create a new, empty vault.

use std::fs;

use crate::audit;
use crate::cli::output;
use crate::cli::{load_settings, prompt_new_password, vault_path, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::VaultStore;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;

    // 1. Never overwrite an existing vault.
    if path.exists() {
        output::tip("Run `pwvault` to unlock the existing vault.");
        return Err(VaultError::VaultAlreadyExists(path));
    }

    // 2. Create the parent directory if it doesn't exist.
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
            output::info(&format!("Created directory: {}", dir.display()));
        }
    }

    // 3. Prompt for a new password (with confirmation) and write the file.
    let password = prompt_new_password()?;
    VaultStore::create(&path, password, &settings.argon2_params())?;
    output::success(&format!("Vault created at {}", path.display()));

    audit::log_audit(
        &path,
        "init",
        &settings.device_name(),
        None,
        Some("vault created"),
    );

    output::tip("Run `pwvault` to unlock it, then `add` your first entry.");
    Ok(())
}
