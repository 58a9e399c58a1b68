pub mod jwt;
pub mod login;
