//! One module per top-level subcommand.

pub mod audit_cmd;
pub mod init;
pub mod migrate;
pub mod open;
pub mod rotate;
