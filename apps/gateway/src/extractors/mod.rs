pub mod current_user;
pub mod path_id;
pub mod request_log;
pub mod validated_json;

pub use current_user::CurrentUser;
pub use path_id::{ArticleId, UserId};
pub use request_log::RequestLog;
pub use validated_json::ValidatedJson;
