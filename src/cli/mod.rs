//! # CLI Module
//!
//! Command-line access to route files. Every handler key a route file
//! references is bound to an echo handler, so a file can be listed, checked
//! and resolved without any application code. Bare type references
//! (`- HomeAction`) take their route from the action type itself, so the CLI
//! reports them as `[skip]` instead of registering them.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print the route table:
//!
//! ```bash
//! waypoint routes --file routes.yaml
//! ```
//!
//! ### `check`
//!
//! Validate every entry and report all failures, exiting non-zero when any
//! entry is invalid:
//!
//! ```bash
//! waypoint check --file routes.yaml
//! ```
//!
//! ### `resolve`
//!
//! Resolve one request and print the finalized response:
//!
//! ```bash
//! waypoint resolve --file routes.yaml --method POST /users/42/posts/7
//! waypoint resolve --file routes.yaml --config router.yaml -H 'x-request-id: 01J...' /
//! ```
//!
//! ## Logging
//!
//! `--log-level` (or `WAYPOINT_LOG_LEVEL`) sets the level; the other
//! `WAYPOINT_LOG_*` variables are read as described in
//! [`crate::logging::LogConfig::from_env`].

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
