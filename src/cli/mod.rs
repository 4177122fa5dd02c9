//! CLI module: Clap argument parser, prompts, output helpers, and command
//! implementations.

pub mod commands;
pub mod editor;
pub mod interrupt;
pub mod output;
pub mod repl;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::session::Prompter;
use self::interrupt::Interrupt;

/// Minimum length for a newly chosen master password.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable read instead of prompting for the master password.
pub const PASSWORD_ENV: &str = "PWVAULT_PASSWORD";

/// pwvault: a single-user encrypted password vault.
#[derive(Parser)]
#[command(name = "pwvault", about = "Encrypted password vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Vault file (overrides `vault_file` in the config)
    #[arg(long, env = "PWVAULT_FILE", global = true)]
    pub vault: Option<PathBuf>,

    /// Config file (default: ./.pwvault.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print debug diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty vault
    Init,

    /// Unlock the vault and start an interactive session (default)
    Open,

    /// Convert a legacy vault file into the current format
    Migrate {
        /// Path to the legacy vault file
        legacy_file: PathBuf,
        /// Replace an existing vault at the target path
        #[arg(short, long)]
        force: bool,
    },

    /// Change the vault's master password
    RotateKey,

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config`, or `.pwvault.toml` in the working
/// directory if present.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(&std::env::current_dir()?),
    }
}

/// Resolve the vault file: `--vault` / `PWVAULT_FILE`, else the config.
pub fn vault_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    match &cli.vault {
        Some(path) => Ok(path.clone()),
        None => Ok(settings.vault_path(&std::env::current_dir()?)),
    }
}

/// Get a password, trying `PWVAULT_PASSWORD` before prompting.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used by `init`,
/// `migrate` and `rotate-key`).
///
/// Also respects `PWVAULT_PASSWORD` for scripted use.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            if pw.chars().count() < MIN_PASSWORD_LEN {
                return Err(VaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// `Prompter` backed by the terminal.
///
/// A `PWVAULT_PASSWORD` value is offered once; any later passphrase,
/// including the unlock retry, is read interactively.  Confirmations read
/// a line from stdin rather than a raw key, so they work the same whether
/// stdin is a terminal or a pipe.  Only `y` (either case) counts as
/// agreement.
#[derive(Default)]
pub struct TerminalPrompter {
    preset: Option<Zeroizing<String>>,
    preset_used: bool,
    interrupt: Interrupt,
}

impl TerminalPrompter {
    /// Take the first passphrase from `PWVAULT_PASSWORD` if it is set.
    pub fn from_env() -> Self {
        let preset = std::env::var(PASSWORD_ENV)
            .ok()
            .filter(|pw| !pw.is_empty())
            .map(Zeroizing::new);
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Let Ctrl-C at a confirmation end the session.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }
}

impl Prompter for TerminalPrompter {
    fn passphrase(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        use std::io::IsTerminal;

        if let Some(pw) = self.preset.take() {
            self.preset_used = true;
            return Ok(pw);
        }
        if self.preset_used && !std::io::stdin().is_terminal() {
            return Err(VaultError::CommandFailed(format!(
                "{PASSWORD_ENV} was rejected and there is no terminal to ask again"
            )));
        }

        let pw = dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
        Ok(Zeroizing::new(pw))
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        use std::io::Write;

        print!("{prompt} [y/N] ");
        std::io::stdout().flush()?;

        let mut answer = String::new();
        match self
            .interrupt
            .while_idle(|| std::io::stdin().read_line(&mut answer))
        {
            Some(read) => {
                read?;
                Ok(is_yes(&answer))
            }
            None => Ok(false),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y")
}
