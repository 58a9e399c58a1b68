//! Test helpers for generating unique test data
//!
//! Usernames and emails are unique columns, so tests that share a database
//! must not collide. ULIDs keep every generated value distinct.

use ulid::Ulid;

/// Generate a unique string in the format `{prefix}-{ulid}`
///
/// ```
/// use gateway_test_support::unique_helpers::unique_str;
///
/// let a = unique_str("user");
/// let b = unique_str("user");
/// assert_ne!(a, b);
/// assert!(a.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique username; lowercase so it reads like real input.
pub fn unique_username(prefix: &str) -> String {
    unique_str(prefix).to_lowercase()
}

/// Generate a unique email address in the format `{prefix}-{ulid}@example.test`
///
/// ```
/// use gateway_test_support::unique_helpers::unique_email;
///
/// let email = unique_email("alice");
/// assert!(email.starts_with("alice-"));
/// assert!(email.ends_with("@example.test"));
/// ```
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.test", prefix, Ulid::new())
}
