//! # CLI Module
//!
//! Command-line access to schema documents, for inspecting models and checking
//! payloads outside a running service.
//!
//! ## Commands
//!
//! Every command takes `--schema <FILE>` (YAML, JSON or TOML schema document) and
//! `--model <NAME>`, prints JSON to stdout and exits non-zero on error.
//!
//! ```bash
//! # Validate a payload and print it re-serialized with minified keys
//! brrtbind validate --schema models.yaml --model Person --input person.json --minified-output
//!
//! # Validate minified input through an attribute filter
//! brrtbind validate -s models.yaml -m Person -i min.json --minified-input --filter filter.json
//!
//! # Inspect a model
//! brrtbind blueprint --schema models.yaml --model Person
//! brrtbind keys --schema models.yaml --model Person
//! brrtbind attributes --schema models.yaml --model Person
//! brrtbind filter --schema models.yaml --model Person --default-hidden --complete
//! ```
//!
//! Global flags `--log-level` and `--log-format` override `BRRTBIND_LOG_LEVEL` and
//! `BRRTBIND_LOG_FORMAT`. Logs go to stderr.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands, LogFormatArg, ModelArgs};
