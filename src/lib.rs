//! Lockpair core library.
//!
//! Checks C++ sources for the public/`_unlocked` locking convention: every
//! public method that takes a lock should have a private `<name>_unlocked`
//! twin doing the same work without locking, so code already holding the
//! lock never re-enters it. Analysis is textual and heuristic; no compiler
//! is involved.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `discover`: Expansion of paths and source directories into files.
//! - `source`: File loading and the comment-blanked code view.
//! - `scan`: Structural scanner producing class profiles.
//! - `rules`: Declarative rule table and the rule engine.
//! - `lint`: Pipeline runner over many files.
//! - `models`: Issues, summaries and class profiles.
//! - `output`: Human/JSON renderers and the exit-code policy.
//! - `exit`, `error`, `utils`: Supporting types and helpers.
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod exit;
pub mod lint;
pub mod models;
pub mod output;
pub mod rules;
pub mod scan;
pub mod source;
pub mod utils;
