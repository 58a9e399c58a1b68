//! Gateway test support utilities
//!
//! Shared by the gateway's unit and integration tests: unified logging
//! initialization and unique test data helpers.

pub mod logging;
pub mod unique_helpers;
