//! Mock implementations for testing
//!
//! Scripted stand-ins for every external collaborator a monitor talks to.

pub mod cloud;

pub use crate::subprocess::{MockCommandConfig, MockProcessRunner};
pub use cloud::{MockLogStore, MockServiceInfo, MockStackControl};
