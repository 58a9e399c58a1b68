#![allow(dead_code)]

pub mod app_builder;
pub mod test_state;

pub use app_builder::create_test_app;
pub use test_state::{bearer_for, test_db, test_security, test_state, test_state_with};
