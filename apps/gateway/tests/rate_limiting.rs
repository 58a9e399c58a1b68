mod common;
mod support;

use std::time::Duration;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web};
use gateway::config::RateLimitConfig;
use gateway::error::RATE_LIMITED_BODY;

use common::{header as header_value, read_text};
use support::{bearer_for, create_test_app, test_state_with};

#[actix_web::test]
async fn burst_is_admitted_then_limited_until_the_next_interval() {
    let state = test_state_with(RateLimitConfig {
        interval: Duration::from_secs(1),
        burst: 2,
    })
    .await;
    let user = state.users.create_user("carol", "carol@example.com").await.unwrap();
    let auth = bearer_for(&user, &state.security);
    let app = create_test_app(web::Data::new(state)).await;

    let get_users = || {
        test::TestRequest::get()
            .uri("/v1/users")
            .insert_header((header::AUTHORIZATION, auth.clone()))
            .to_request()
    };

    for _ in 0..2 {
        let resp = test::call_service(&app, get_users()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = test::call_service(&app, get_users()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header_value(&resp, "retry-after"), Some("1"));
    assert_eq!(read_text(resp).await, RATE_LIMITED_BODY);

    actix_web::rt::time::sleep(Duration::from_millis(1100)).await;

    let resp = test::call_service(&app, get_users()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn public_routes_are_not_limited() {
    let state = test_state_with(RateLimitConfig {
        interval: Duration::from_secs(3600),
        burst: 1,
    })
    .await;
    let app = create_test_app(web::Data::new(state)).await;

    for _ in 0..5 {
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
