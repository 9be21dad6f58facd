//! 需要真实网络/测试服务器的场景性测试
//!
//! 跟 `http_client::pool` 里已有的 `#[ignore]` 测试一样，这里记录的是预期
//! 行为，不在 `cargo test` 默认跑的范围内。

use impersonate_client::http_client::{CookieStore, HttpClient, HttpClientConfig, HttpMethod, HttpRequest};

const CHROME_JA3: &str =
    "771,4865-4866-4867-49195-49199-49196-49200-52393-52392-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-13-18-51-45-43-27-17513,29-23-24,0";

#[test]
#[ignore] // 需要访问 ja3er.com
fn ja3_hash_matches_ja3er_dot_com() {
    let client = HttpClient::new(HttpClientConfig::default());
    let request = HttpRequest::new(HttpMethod::Get, "https://ja3er.com/json")
        .with_ja3(CHROME_JA3)
        .without_tls13_auto_retry();

    let response = client.send_request(&request).expect("request should succeed");
    assert!(response.is_success());

    let body = response.body_as_string().expect("utf8 body");
    let expected_hash = format!("{:x}", md5::compute(CHROME_JA3.as_bytes()));
    assert!(
        body.contains(&expected_hash),
        "expected ja3_hash {} in response body: {}",
        expected_hash,
        body
    );
}

#[test]
#[ignore] // 需要一台会在 supported_groups 缺 X25519 时拒绝 TLS 1.3 的测试服务器
fn tls13_auto_retry_rewrites_supported_groups() {
    let client = HttpClient::new(HttpClientConfig::default());
    let request = HttpRequest::new(HttpMethod::Get, "https://localhost:4433/")
        .with_ja3("771,4865-4866-4867,0,25,0") // supported_groups = [P-521] only
        .with_json_body("{}");

    let response = client
        .send_request(&request)
        .expect("first handshake should fail, auto-retry should recover and succeed");
    assert_eq!(response.status_code, 200);
}

#[test]
#[ignore] // 需要能在服务端观测到独立 TCP 连接（不同源端口）的测试服务器
fn pool_keys_distinct_fingerprints_to_distinct_connections() {
    let config = HttpClientConfig {
        cookie_store: Some(std::sync::Arc::new(CookieStore::new())),
        ..Default::default()
    };
    let client = HttpClient::with_pool(config, Default::default());

    let request_a = HttpRequest::new(HttpMethod::Get, "https://localhost:8443/whoami")
        .with_ja3("771,4865-4866-4867,0,29-23-24,0");
    let request_b = HttpRequest::new(HttpMethod::Get, "https://localhost:8443/whoami")
        .with_ja3("771,4866-4867-4865,0,29-23-24,0");

    let response_a = client.send_request(&request_a).expect("request A should succeed");
    let response_b = client.send_request(&request_b).expect("request B should succeed");

    // 测试服务器把观测到的源端口回显在响应体里；不同 JA3 必须落在不同连接上
    assert_ne!(
        response_a.body_as_string().unwrap(),
        response_b.body_as_string().unwrap(),
        "requests with distinct JA3 must not share a pooled connection"
    );
}
