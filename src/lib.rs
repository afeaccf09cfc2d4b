//! `Proslenkey` - Minimal application launcher over the executables on your PATH.

#![deny(
    warnings,
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]

pub mod config;
pub mod error;
pub mod launch;
pub mod matcher;
pub mod scanner;
pub mod session;
pub mod types;
