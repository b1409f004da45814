//! HTTP request handlers for the broker API.
//!
//! - `common` - response envelope and request bodies
//! - `status` - pool status and liveness
//! - `tools` - tool listing and invocation

pub mod common;
pub mod status;
pub mod tools;

pub use status::*;
pub use tools::*;
