//! Editing entries in the user's text editor.
//!
//! The entry is written as pretty JSON to a private temp file, the editor
//! is launched on it, and whatever comes back is parsed as the candidate.
//! The temp file is overwritten with zeros and removed on every path.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use zeroize::Zeroizing;

use crate::cli::interrupt::Interrupt;
use crate::errors::{Result, VaultError};
use crate::session::EntryEditor;
use crate::vault::{entry_from_json, entry_to_json, Entry};

/// Launches `$VISUAL` / `$EDITOR` (or a platform default) on each entry.
#[derive(Debug, Default)]
pub struct ExternalEditor {
    command: Option<Vec<String>>,
    interrupt: Interrupt,
}

impl ExternalEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed command line instead of looking one up.  The temp file
    /// path is appended as the last argument.
    pub fn with_command(command: Vec<String>) -> Self {
        Self {
            command: Some(command),
            ..Self::default()
        }
    }

    /// Discard the candidate if Ctrl-C arrives while the editor is open.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }
}

impl EntryEditor for ExternalEditor {
    fn edit(&mut self, entry: &Entry) -> Result<Entry> {
        let json = entry_to_json(entry)?;
        let tmp_path = write_temp_file(&json)?;

        let argv = self.command.clone().unwrap_or_else(find_editor);
        let edited = run_editor(&argv, &tmp_path).and_then(|()| {
            fs::read_to_string(&tmp_path)
                .map(Zeroizing::new)
                .map_err(|e| VaultError::EditorError(format!("failed to read edited file: {e}")))
        });

        secure_delete(&tmp_path);
        if self.interrupt.requested() {
            return Err(VaultError::UserCancelled);
        }
        parse_edited_content(&edited?)
    }
}

/// Write the entry JSON to a new temp file only the owner can read.
fn write_temp_file(json: &str) -> Result<PathBuf> {
    let filename = format!(
        "pwvault-edit-{}-{}.json",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
    );
    let tmp_path = std::env::temp_dir().join(filename);

    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&tmp_path)
            .map_err(|e| VaultError::EditorError(format!("failed to create temp file: {e}")))?
    };

    #[cfg(not(unix))]
    let mut file = fs::File::create(&tmp_path)
        .map_err(|e| VaultError::EditorError(format!("failed to create temp file: {e}")))?;

    file.write_all(json.as_bytes())?;
    writeln!(file)?;
    file.flush()?;
    Ok(tmp_path)
}

/// Run the editor and wait for it.  A non-zero exit is only logged: the
/// file is read back regardless.
fn run_editor(argv: &[String], path: &Path) -> Result<()> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| VaultError::EditorError("no editor command configured".into()))?;

    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .map_err(|e| VaultError::EditorError(format!("failed to launch '{program}': {e}")))?;

    if !status.success() {
        tracing::warn!(editor = %program, code = ?status.code(), "editor exited with an error");
    }
    Ok(())
}

/// Find the user's preferred editor, split into program and arguments.
fn find_editor() -> Vec<String> {
    for var in ["VISUAL", "EDITOR"] {
        if let Ok(editor) = std::env::var(var) {
            let argv: Vec<String> = editor.split_whitespace().map(str::to_string).collect();
            if !argv.is_empty() {
                return argv;
            }
        }
    }

    let fallback = if cfg!(windows) {
        "notepad"
    } else if which::which("nano").is_ok() {
        "nano"
    } else {
        "vi"
    };
    vec![fallback.to_string()]
}

/// Parse what the user saved.  Anything but a JSON object is rejected.
pub fn parse_edited_content(content: &str) -> Result<Entry> {
    entry_from_json(content).map_err(|e| VaultError::EditorError(e.to_string()))
}

/// Overwrite a file's contents with zeros before deleting it.
/// Best-effort: failures are silently ignored.
fn secure_delete(path: &Path) {
    if let Ok(metadata) = fs::metadata(path) {
        let len = usize::try_from(metadata.len()).unwrap_or(0);
        if len > 0 {
            if let Ok(mut file) = fs::OpenOptions::new().write(true).open(path) {
                let _ = file.write_all(&vec![0u8; len]);
                let _ = file.sync_all();
            }
        }
    }
    let _ = fs::remove_file(path);
}
