//! # Hoist
//!
//! Deploy cloud stacks and follow slow operations to completion.
//!
//! ## Usage
//!
//! ```bash
//! hoist deploy [stack...] [--profile P]
//! hoist destroy [stack...]
//! hoist stack delete <stack-id>
//! hoist logs <log-group> [--stream S...]
//! hoist health <endpoint>
//! ```
//!
//! ## Modules
//!
//! - `monitor` - Background "poll until terminal" combinator and event queues
//! - `stack` - Stack deletion tracking
//! - `deploy` - Deployment tool execution with structured progress
//! - `logs` - Live log tailing
//! - `health` - Startup health probing of remote services
//! - `cloud` - Traits for the cloud collaborators and their implementations
//! - `subprocess` - Subprocess abstraction layer for testing
//! - `config` - Configuration file loading
//! - `display` - Terminal progress output
//! - `error` - Unified error type with error codes
//! - `testing` - Mocks and helpers for tests
pub mod cloud;
pub mod config;
pub mod deploy;
pub mod display;
pub mod error;
pub mod health;
pub mod logs;
pub mod monitor;
pub mod stack;
pub mod subprocess;

pub mod testing;
