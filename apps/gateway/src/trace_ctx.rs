//! Task-local request context for web requests.
//!
//! Gives access to the current request's correlation id from anywhere in the
//! request processing pipeline (error bodies, services) without threading it
//! through every call.

use std::cell::RefCell;

use tokio::task_local;

task_local! {
    static REQUEST_ID: RefCell<Option<String>>;
}

/// Get the request id for the current task.
/// Returns "unknown" outside of a request.
pub fn request_id() -> String {
    REQUEST_ID
        .try_with(|cell| {
            cell.borrow()
                .as_ref()
                .cloned()
                .unwrap_or_else(|| "unknown".to_string())
        })
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Run a future with `request_id` installed as the task-local correlation id.
pub async fn with_request_id<F, R>(request_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    REQUEST_ID.scope(RefCell::new(Some(request_id)), future).await
}
