//! # CLI Module
//!
//! Command-line front end for the parser, the TypeScript generator and the
//! document linter.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Run the parser and write the document (stdout by default):
//!
//! ```bash
//! endpointgen generate --config endpointgen.yaml --output build/openapi.json \
//!     --typescript frontend/generated
//! ```
//!
//! ### `inspect`
//!
//! List endpoints, their method paths with the effective access rule, and
//! the entity classes reachable from them:
//!
//! ```bash
//! endpointgen inspect --config endpointgen.yaml
//! ```
//!
//! ### `lint`
//!
//! Check a generated document:
//!
//! ```bash
//! endpointgen lint --document build/openapi.json --fail-on-error
//! ```
//!
//! ### `watch`
//!
//! Regenerate on every class-path change:
//!
//! ```bash
//! endpointgen watch --config endpointgen.yaml --output build/openapi.json
//! ```
//!
//! `--config` may also come from `ENDPOINTGEN_CONFIG`, and `--class-path`
//! (repeatable) replaces the configured class path.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{inspect, run, run_cli, Cli, Commands, ConfigArgs};
