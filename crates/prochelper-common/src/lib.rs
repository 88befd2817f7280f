//! # Process Helper Common
//!
//! Error types shared by the process control helper, its demo driver and
//! the end-to-end tests.

pub mod errors;

pub use errors::{ProcessError, ProcessResult};
