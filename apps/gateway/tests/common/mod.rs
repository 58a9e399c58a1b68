#![allow(dead_code)]

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    gateway_test_support::logging::init();
}

pub async fn read_json(resp: ServiceResponse<BoxBody>) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("response body should be JSON")
}

pub async fn read_text(resp: ServiceResponse<BoxBody>) -> String {
    let body = test::read_body(resp).await;
    String::from_utf8(body.to_vec()).expect("response body should be UTF-8")
}

pub fn header<'a>(resp: &'a ServiceResponse<BoxBody>, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}
