//! salesq-cli: command-line front end for salesq
//!
//! Argument parsing, layered configuration and the subcommand bodies. The
//! `salesq` binary in `main.rs` only wires these together.

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

pub mod cli;
pub mod commands;
pub mod config;

pub use config::Config;
