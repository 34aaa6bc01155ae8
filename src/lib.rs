//! guidwire: turn unstructured troubleshooting documents into browsable
//! decision trees.
//!
//! The core is the decision-tree domain model: a validator that turns raw
//! analyzer output into a well-formed typed graph, and a navigation engine
//! that walks a user through that graph one decision at a time. Around it
//! sit the ingest/library services and the CLI.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
