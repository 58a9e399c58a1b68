//! Typed `{id}` path segments. Each resource gets its own extractor so a bad
//! id is reported with that resource's error code.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::errors::ErrorCode;

fn parse_id(req: &HttpRequest, code: ErrorCode, what: &str) -> Result<Uuid, AppError> {
    let raw = req
        .match_info()
        .get("id")
        .ok_or_else(|| AppError::invalid(code, format!("Missing {what} id parameter")))?;
    Uuid::parse_str(raw).map_err(|_| AppError::invalid(code, format!("Invalid {what} id: {raw}")))
}

/// User id from the route path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse_id(req, ErrorCode::InvalidUserId, "user").map(UserId))
    }
}

/// Article id from the route path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleId(pub Uuid);

impl ArticleId {
    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl FromRequest for ArticleId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse_id(req, ErrorCode::InvalidArticleId, "article").map(ArticleId))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    use super::*;

    #[actix_web::test]
    async fn parses_uuid_segment() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .param("id", id.to_string())
            .to_http_request();
        assert_eq!(UserId::extract(&req).await.unwrap(), UserId(id));
        assert_eq!(ArticleId::extract(&req).await.unwrap(), ArticleId(id));
    }

    #[actix_web::test]
    async fn bad_segment_carries_the_resource_code() {
        let req = TestRequest::default().param("id", "42").to_http_request();

        let err = UserId::extract(&req).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), ErrorCode::InvalidUserId);

        let err = ArticleId::extract(&req).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), ErrorCode::InvalidArticleId);
    }

    #[actix_web::test]
    async fn missing_segment_is_rejected() {
        let req = TestRequest::default().to_http_request();
        let err = ArticleId::extract(&req).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArticleId);
    }
}
