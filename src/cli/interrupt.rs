//! Ctrl-C handling for the interactive session.
//!
//! While the session is waiting on the user (the `> ` prompt or a
//! confirmation) an interrupt ends the process at once with "Goodbye."
//! and status 0.  While it is busy (editor open, vault being written) the
//! interrupt is only recorded; the running command finishes its cleanup
//! and the loop stops at the next prompt.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use crate::cli::output;
use crate::errors::{Result, VaultError};

const BUSY: u8 = 0;
const IDLE: u8 = 1;
const EXITING: u8 = 2;

/// Shared interrupt state.  Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    requested: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
}

impl Interrupt {
    /// Register the process-wide Ctrl-C handler.  Call at most once.
    pub fn install() -> Result<Self> {
        let interrupt = Self::default();
        let handle = interrupt.clone();
        ctrlc::set_handler(move || {
            if handle.raise() {
                println!();
                output::info("Goodbye.");
                std::process::exit(0);
            }
        })
        .map_err(|e| VaultError::CommandFailed(format!("cannot install Ctrl-C handler: {e}")))?;
        Ok(interrupt)
    }

    /// Record an interrupt.  Returns `true` if the session was idle and
    /// the caller should end the process now.
    pub fn raise(&self) -> bool {
        self.requested.store(true, Ordering::SeqCst);
        self.state
            .compare_exchange(IDLE, EXITING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Run `wait` (a blocking read) with the session marked idle.
    ///
    /// Returns `None` if an interrupt claimed the exit while `wait` ran;
    /// the caller must then stop without side effects.
    pub fn while_idle<T>(&self, wait: impl FnOnce() -> T) -> Option<T> {
        self.state.store(IDLE, Ordering::SeqCst);
        let value = wait();
        self.state
            .compare_exchange(IDLE, BUSY, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| value)
    }
}
