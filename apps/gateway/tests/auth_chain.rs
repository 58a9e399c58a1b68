mod common;
mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App, HttpResponse};
use gateway::error::{INVALID_TOKEN_BODY, UNAUTHORIZED_BODY};
use gateway::repos::User;
use gateway::{mint_access_token, protected_chain, CurrentUser, SecurityConfig, TokenBucket};
use time::OffsetDateTime;
use uuid::Uuid;

use common::{read_json, read_text};
use support::test_security;

fn sample_user() -> User {
    let now = OffsetDateTime::now_utc();
    User {
        id: Uuid::new_v4(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// `/v1/probe` behind the protected chain; the counter records handler calls.
macro_rules! probe_app {
    ($security:expr, $bucket:expr, $hits:expr) => {{
        let hits = Arc::clone(&$hits);
        test::init_service(
            App::new().service(
                web::scope("/v1")
                    .wrap(protected_chain($security.clone(), Arc::clone(&$bucket)))
                    .route(
                        "/probe",
                        web::get().to(move |user: CurrentUser| {
                            let hits = Arc::clone(&hits);
                            async move {
                                hits.fetch_add(1, Ordering::SeqCst);
                                HttpResponse::Ok().json(serde_json::json!({
                                    "id": user.id,
                                    "username": user.username,
                                }))
                            }
                        }),
                    ),
            ),
        )
        .await
    }};
}

fn roomy_bucket() -> Arc<TokenBucket> {
    Arc::new(TokenBucket::new(100, Duration::from_secs(1)))
}

#[actix_web::test]
async fn missing_header_is_rejected_before_the_handler() {
    let security = test_security();
    let bucket = roomy_bucket();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = probe_app!(security, bucket, hits);

    let req = test::TestRequest::get().uri("/v1/probe").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_text(resp).await, UNAUTHORIZED_BODY);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn malformed_prefix_is_rejected() {
    let security = test_security();
    let bucket = roomy_bucket();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = probe_app!(security, bucket, hits);
    let token = mint_access_token(&sample_user(), SystemTime::now(), &security).unwrap();

    for value in [
        format!("Token {token}"),
        format!("bearer {token}"),
        format!("Bearer{token}"),
        format!("Bearer   {token}  "),
        "Bearer ".to_string(),
    ] {
        let req = test::TestRequest::get()
            .uri("/v1/probe")
            .insert_header((header::AUTHORIZATION, value.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "header {value:?}");
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn expired_token_gets_the_invalid_token_body() {
    let security = test_security();
    let bucket = roomy_bucket();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = probe_app!(security, bucket, hits);

    let issued = SystemTime::now() - Duration::from_secs(2 * 3600);
    let token = mint_access_token(&sample_user(), issued, &security).unwrap();

    let req = test::TestRequest::get()
        .uri("/v1/probe")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_text(resp).await, INVALID_TOKEN_BODY);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn token_signed_with_another_secret_is_rejected() {
    let security = test_security();
    let bucket = roomy_bucket();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = probe_app!(security, bucket, hits);

    let other = SecurityConfig::new(b"some-other-secret".to_vec(), Duration::from_secs(900));
    let token = mint_access_token(&sample_user(), SystemTime::now(), &other).unwrap();

    let req = test::TestRequest::get()
        .uri("/v1/probe")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_text(resp).await, INVALID_TOKEN_BODY);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn valid_token_reaches_the_handler_with_its_subject() {
    let security = test_security();
    let bucket = roomy_bucket();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = probe_app!(security, bucket, hits);

    let user = sample_user();
    let token = mint_access_token(&user, SystemTime::now(), &security).unwrap();

    let req = test::TestRequest::get()
        .uri("/v1/probe")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["id"], user.id.to_string());
    assert_eq!(body["username"], "alice");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn rejected_credentials_do_not_spend_rate_limit_tokens() {
    let security = test_security();
    let bucket = Arc::new(TokenBucket::new(1, Duration::from_secs(3600)));
    let hits = Arc::new(AtomicUsize::new(0));
    let app = probe_app!(security, bucket, hits);

    for _ in 0..3 {
        let req = test::TestRequest::get().uri("/v1/probe").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    let token = mint_access_token(&sample_user(), SystemTime::now(), &security).unwrap();
    let req = test::TestRequest::get()
        .uri("/v1/probe")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
