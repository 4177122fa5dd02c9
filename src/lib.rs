pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod session;
pub mod vault;
