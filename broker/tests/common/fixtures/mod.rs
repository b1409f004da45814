//! Reusable test utilities:
//! - Mock SOAP backend
//! - Config directory builder
//! - Ready-made dispatcher and tool service wiring

// Not every test binary uses every fixture
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_backend;
pub mod test_config;
pub mod test_data;

pub use mock_backend::MockSapBackend;
pub use test_config::TestConfigBuilder;
pub use test_data::*;
