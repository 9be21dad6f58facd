//! HTTP/3 实现
//!
//! 使用 quinn + h3，按 `QuicSpec`（QUIC 版本、Initial 包参数、传输参数）
//! 塑形连接，而不是完全使用 quinn 的默认传输配置。

use super::header_list::OrderedHeaders;
use super::{HttpClientConfig, HttpClientError, HttpRequest, HttpResponse, Result};

#[cfg(feature = "http3")]
use crate::fingerprint::transport_spec::QuicSpec;
#[cfg(feature = "http3")]
use quinn::{ClientConfig, Endpoint, TransportConfig, VarInt};

#[cfg(feature = "http3")]
use tokio::runtime::Runtime;

/// 发送 HTTP/3 请求
#[cfg(feature = "http3")]
pub fn send_http3_request(
    host: &str,
    port: u16,
    path: &str,
    request: &HttpRequest,
    config: &HttpClientConfig,
) -> Result<HttpResponse> {
    let rt = Runtime::new()
        .map_err(|e| HttpClientError::ConnectionFailed(format!("创建运行时失败: {}", e)))?;

    rt.block_on(async { send_http3_request_async(host, port, path, request, config).await })
}

/// QUIC 传输参数是一个大端 varint（RFC 9000 §16）
#[cfg(feature = "http3")]
fn decode_quic_varint(bytes: &[u8]) -> Option<u64> {
    let first = *bytes.first()?;
    let len = 1usize << (first >> 6);
    if bytes.len() < len {
        return None;
    }
    let mut value = (first & 0x3f) as u64;
    for b in &bytes[1..len] {
        value = (value << 8) | (*b as u64);
    }
    Some(value)
}

/// 把 `QuicSpec.transport_parameters` 中已知的 RFC 9000 transport parameter id
/// 映射到 quinn 的 `TransportConfig` 上能设置的等价项。未知 id 被忽略。
#[cfg(feature = "http3")]
fn apply_quic_transport_params(transport: &mut TransportConfig, spec: &QuicSpec) {
    for (&id, raw) in &spec.transport_parameters {
        let Some(value) = decode_quic_varint(raw) else { continue };
        match id {
            // initial_max_stream_data_bidi_local
            0x05 => {
                transport.stream_receive_window(VarInt::from_u64(value).unwrap_or(VarInt::MAX));
            }
            // initial_max_data
            0x04 => {
                transport.receive_window(VarInt::from_u64(value).unwrap_or(VarInt::MAX));
            }
            // initial_max_streams_bidi
            0x08 => {
                transport.max_concurrent_bidi_streams(VarInt::from_u64(value).unwrap_or(VarInt::MAX));
            }
            // initial_max_streams_uni
            0x09 => {
                transport.max_concurrent_uni_streams(VarInt::from_u64(value).unwrap_or(VarInt::MAX));
            }
            // max_idle_timeout (单位：毫秒)
            0x01 => {
                if let Ok(timeout) = std::time::Duration::from_millis(value).try_into() {
                    transport.max_idle_timeout(Some(timeout));
                }
            }
            _ => {}
        }
    }

    if spec.version != 0 && spec.version != 1 {
        tracing::debug!(version = spec.version, "quinn 目前只协商标准 QUIC v1，自定义版本号未生效");
    }
    if !spec.initial_packet_params.is_empty() {
        tracing::debug!("Initial 包级参数（CRYPTO 帧分片/padding 策略）在 quinn 公开 API 下无法定制");
    }
}

#[cfg(feature = "http3")]
async fn send_http3_request_async(
    host: &str,
    port: u16,
    path: &str,
    request: &HttpRequest,
    config: &HttpClientConfig,
) -> Result<HttpResponse> {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    let start = Instant::now();

    // 1. 配置 QUIC 客户端（TLS 部分也走统一的 ClientHelloSpec 解析）
    let spec = super::tls::resolve_client_hello_spec(request, config.profile.as_ref());
    let tls_config =
        super::rustls_utils::build_client_config(config.verify_tls, vec![b"h3".to_vec()], spec.as_ref());

    let mut client_config = ClientConfig::new(Arc::new(tls_config));

    let mut transport = TransportConfig::default();
    transport.initial_rtt(Duration::from_millis(100));
    transport.max_idle_timeout(Some(
        Duration::from_secs(60)
            .try_into()
            .map_err(|e| HttpClientError::ConnectionFailed(format!("配置超时失败: {}", e)))?,
    ));
    transport.keep_alive_interval(Some(Duration::from_secs(10)));
    transport.stream_receive_window((1024 * 1024u32).into());
    transport.receive_window((10 * 1024 * 1024u32).into());
    transport.max_concurrent_bidi_streams(100u32.into());
    transport.max_concurrent_uni_streams(100u32.into());

    if let Some(quic_spec) = request.transport.as_ref().and_then(|t| t.quic.as_ref()) {
        apply_quic_transport_params(&mut transport, quic_spec);
    }

    client_config.transport_config(Arc::new(transport));

    // 2. DNS 解析（优先 IPv4，避免 IPv4 endpoint 连接 IPv6 remote 导致 invalid remote address）
    let addr_str = format!("{}:{}", host, port);
    let mut addrs: Vec<SocketAddr> = addr_str
        .to_socket_addrs()
        .map_err(|e| HttpClientError::InvalidUrl(format!("DNS 解析失败: {}", e)))?
        .collect();
    if addrs.is_empty() {
        return Err(HttpClientError::InvalidUrl("无法解析地址".to_string()));
    }
    addrs.sort_by_key(|a| matches!(a.ip(), IpAddr::V6(_)));
    let remote_addr = addrs[0];

    let bind_addr = match remote_addr.ip() {
        IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    };
    let mut endpoint = Endpoint::client(bind_addr)
        .map_err(|e| HttpClientError::ConnectionFailed(format!("创建 endpoint 失败: {}", e)))?;

    endpoint.set_default_client_config(client_config);

    let sni_host = request.sni_override.as_deref().unwrap_or(host);
    let connection = endpoint
        .connect(remote_addr, sni_host)
        .map_err(|e| HttpClientError::ConnectionFailed(format!("QUIC 连接失败: {}", e)))?
        .await
        .map_err(|e| HttpClientError::ConnectionFailed(format!("QUIC 握手失败: {}", e)))?;

    let (driver, mut send_request) = h3::client::new(h3_quinn::Connection::new(connection))
        .await
        .map_err(|e| HttpClientError::ConnectionFailed(format!("HTTP/3 连接失败: {}", e)))?;

    tokio::spawn(async move {
        let mut driver = driver;
        let _ = std::future::poll_fn(|cx| driver.poll_close(cx)).await;
    });

    let uri = format!("https://{}{}", host, path);
    let mut http_request = http::Request::builder()
        .method(request.method.as_str())
        .uri(uri)
        .version(http::Version::HTTP_3);

    http_request = http_request.header("user-agent", &config.user_agent);

    for (key, value) in &request.headers {
        if !key.eq_ignore_ascii_case("host") {
            http_request = http_request.header(key.as_str(), value.as_str());
        }
    }

    let http_request = http_request
        .body(())
        .map_err(|e| HttpClientError::InvalidResponse(format!("构建请求失败: {}", e)))?;

    let mut stream = send_request
        .send_request(http_request)
        .await
        .map_err(|e| HttpClientError::ConnectionFailed(format!("发送请求失败: {}", e)))?;

    stream
        .finish()
        .await
        .map_err(|e| HttpClientError::ConnectionFailed(format!("结束请求失败: {}", e)))?;

    let response = stream
        .recv_response()
        .await
        .map_err(|e| HttpClientError::InvalidResponse(format!("接收响应失败: {}", e)))?;

    let status_code = response.status().as_u16();
    let headers = response.headers().clone();

    use bytes::Buf;
    let mut body_data = Vec::new();
    while let Some(mut chunk) = stream
        .recv_data()
        .await
        .map_err(|e| HttpClientError::Io(std::io::Error::other(format!("读取 body 失败: {}", e))))?
    {
        let chunk_len = chunk.remaining();
        let mut chunk_bytes = vec![0u8; chunk_len];
        chunk.copy_to_slice(&mut chunk_bytes);
        body_data.extend_from_slice(&chunk_bytes);
    }

    let elapsed = start.elapsed().as_millis() as u64;

    let mut response_headers = OrderedHeaders::new();
    let mut cookies = Vec::new();
    for (key, value) in headers.iter() {
        if let Ok(value_str) = value.to_str() {
            if key.as_str().eq_ignore_ascii_case("set-cookie") {
                if let Some(cookie) = super::cookie::Cookie::parse_set_cookie(value_str, host.to_string()) {
                    cookies.push(cookie);
                }
            }
            response_headers.insert(key.as_str(), value_str);
        }
    }

    Ok(HttpResponse {
        status_code,
        status_text: http::StatusCode::from_u16(status_code)
            .map(|s| s.canonical_reason().unwrap_or("Unknown").to_string())
            .unwrap_or_else(|_| "Unknown".to_string()),
        headers: response_headers,
        body: body_data,
        http_version: "HTTP/3".to_string(),
        response_time_ms: elapsed,
        protocol_used: "HTTP/3".to_string(),
        final_url: None,
        cookies,
    })
}

#[cfg(not(feature = "http3"))]
pub fn send_http3_request(
    _host: &str,
    _port: u16,
    _path: &str,
    _request: &HttpRequest,
    _config: &HttpClientConfig,
) -> Result<HttpResponse> {
    Err(HttpClientError::InvalidResponse(
        "HTTP/3 支持未启用，请使用 --features http3 编译".to_string(),
    ))
}

#[cfg(all(test, feature = "http3"))]
mod tests {
    #[allow(unused_imports)]
    use super::*;

    #[test]
    #[ignore]
    fn test_http3_request() {
        let request = HttpRequest::new(
            crate::http_client::request::HttpMethod::Get,
            "https://quic.aiortc.org:443/",
        );

        let config = HttpClientConfig::default();

        let result = send_http3_request("quic.aiortc.org", 443, "/", &request, &config);
        assert!(result.is_ok());

        let response = result.unwrap();
        assert_eq!(response.http_version, "HTTP/3");
        assert!(response.is_success());
    }

    #[test]
    fn decodes_one_byte_quic_varint() {
        assert_eq!(decode_quic_varint(&[0x25]), Some(0x25));
    }

    #[test]
    fn decodes_two_byte_quic_varint() {
        // 0x40 0x64 -> 长度前缀 01, 值 0x0064 = 100
        assert_eq!(decode_quic_varint(&[0x40, 0x64]), Some(100));
    }
}
