//! TLS 连接支持
//!
//! 拨号路径：把请求/profile 解析出的 `ClientHelloSpec` 交给
//! `rustls_utils::build_client_config`，使实际握手使用 spec 指定的
//! cipher suite/kx group/协议版本子集；握手失败时按 §4.3 的规则
//!做一次 TLS 1.2 降级重试。

use super::{HttpClientConfig, HttpClientError, HttpRequest, HttpResponse, Result};
use crate::error::HandshakeFailureReason;
use crate::tls_config::ClientHelloSpec;
use crate::ClientProfile;
use std::io::Write;
use std::net::TcpStream;
#[allow(unused_imports)]
use std::sync::Arc;

/// TLS 连接器
pub struct TlsConnector {}

impl TlsConnector {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for TlsConnector {
    fn default() -> Self {
        Self::new()
    }
}

/// 按优先级解析本次请求实际应使用的 `ClientHelloSpec`：
/// 1. 请求显式指定的 `transport`
/// 2. 请求的 JA3（可叠加 JA4R）字符串覆盖
/// 3. 客户端配置的 `profile`
/// 4. 都没有则返回 `None`（调用方退回 rustls 安全默认值）
#[cfg(any(feature = "rustls-tls", feature = "http2", feature = "http3"))]
pub fn resolve_client_hello_spec(
    request: &HttpRequest,
    profile: Option<&ClientProfile>,
) -> Option<ClientHelloSpec> {
    if let Some(transport) = &request.transport {
        return Some(crate::tls_config::ClientHelloSpecBuilder::from_transport_spec(transport));
    }

    if let Some(ja3) = request.ja3.as_deref() {
        if let Ok(transport) =
            crate::fingerprint::parse_transport_spec(ja3, request.ja4r.as_deref(), None, None, false)
        {
            return Some(crate::tls_config::ClientHelloSpecBuilder::from_transport_spec(&transport));
        }
    }

    profile.and_then(|p| p.get_client_hello_spec().ok())
}

/// 从 `std::io::Error` 中取回底层的 `rustls::Error`（如果这个 IO 错误确实
/// 是握手/记录层错误包装出来的）。
#[cfg(feature = "rustls-tls")]
fn extract_rustls_error(e: &std::io::Error) -> Option<&rustls::Error> {
    e.get_ref().and_then(|inner| inner.downcast_ref::<rustls::Error>())
}

/// 建立 TCP 连接并完成一次 rustls 握手 + 收发一次 HTTP/1.1 请求。
/// 失败时返回 `(io::Error, 可能的 HandshakeFailureReason)`，供上层决定是否降级重试。
#[cfg(feature = "rustls-tls")]
fn try_https_roundtrip(
    host: &str,
    port: u16,
    path: &str,
    request: &HttpRequest,
    config: &HttpClientConfig,
    tls_config: rustls::ClientConfig,
) -> std::result::Result<HttpResponse, (std::io::Error, Option<HandshakeFailureReason>)> {
    use rustls::client::ServerName;

    let addr = format!("{}:{}", host, port);
    let tcp_stream = TcpStream::connect(&addr).map_err(|e| (e, None))?;
    tcp_stream
        .set_read_timeout(Some(config.read_timeout))
        .map_err(|e| (e, None))?;
    tcp_stream
        .set_write_timeout(Some(config.write_timeout))
        .map_err(|e| (e, None))?;

    let sni_host = request.sni_override.as_deref().unwrap_or(host);
    let server_name = ServerName::try_from(sni_host)
        .map_err(|_| (std::io::Error::new(std::io::ErrorKind::InvalidInput, "无效的服务器名称"), None))?;

    let conn = rustls::ClientConnection::new(Arc::new(tls_config), server_name)
        .map_err(|e| (std::io::Error::new(std::io::ErrorKind::Other, e), None))?;

    let mut tls_stream = rustls::StreamOwned::new(conn, tcp_stream);

    let http_request = request.build_http1_request_bytes(host, path);

    if let Err(e) = tls_stream.write_all(&http_request) {
        let reason = extract_rustls_error(&e).map(super::rustls_utils::classify_handshake_error);
        return Err((e, reason));
    }
    if let Err(e) = tls_stream.flush() {
        let reason = extract_rustls_error(&e).map(super::rustls_utils::classify_handshake_error);
        return Err((e, reason));
    }

    let buffer = match super::io::read_http1_response_bytes(
        &mut tls_stream,
        super::io::DEFAULT_MAX_RESPONSE_BYTES,
    ) {
        Ok(b) => b,
        Err(e) => {
            let reason = extract_rustls_error(&e).map(super::rustls_utils::classify_handshake_error);
            return Err((e, reason));
        }
    };

    HttpResponse::parse(&buffer)
        .map_err(|e| (std::io::Error::new(std::io::ErrorKind::InvalidData, e), None))
}

/// 某个失败原因是否值得做一次 TLS 1.2 降级重试（§4.3 步骤 2-3）
fn should_retry_on_tls12(reason: HandshakeFailureReason) -> bool {
    matches!(
        reason,
        HandshakeFailureReason::ProtocolVersionAlert | HandshakeFailureReason::UnsupportedCurve
    )
}

/// 发送 HTTPS 请求
pub fn send_https_request(
    host: &str,
    port: u16,
    path: &str,
    request: &HttpRequest,
    config: &HttpClientConfig,
) -> Result<HttpResponse> {
    #[cfg(feature = "rustls-tls")]
    {
        let spec = resolve_client_hello_spec(request, config.profile.as_ref());
        let tls_config = super::rustls_utils::build_client_config(
            config.verify_tls,
            vec![b"http/1.1".to_vec()],
            spec.as_ref(),
        );

        match try_https_roundtrip(host, port, path, request, config, tls_config) {
            Ok(resp) => return Ok(resp),
            Err((e, reason)) => {
                let reason = reason.unwrap_or(HandshakeFailureReason::Other);
                if request.tls13_auto_retry && should_retry_on_tls12(reason) {
                    let fallback_config = super::rustls_utils::build_client_config_tls12_fallback(
                        config.verify_tls,
                        vec![b"http/1.1".to_vec()],
                        spec.as_ref(),
                    );
                    return try_https_roundtrip(host, port, path, request, config, fallback_config)
                        .map_err(|(e, _)| HttpClientError::TlsError(format!("TLS 握手失败（含降级重试）: {}", e)));
                }
                return Err(HttpClientError::TlsError(format!("TLS 握手失败: {}", e)));
            }
        }
    }

    #[cfg(not(feature = "rustls-tls"))]
    {
        let _ = (host, port, path, request, config);
        Err(HttpClientError::TlsError("需要启用 rustls-tls 特性".to_string()))
    }
}

/// 发送 HTTPS 请求，使用连接池中的 TCP 连接（不新建 TCP 连接）。
///
/// 指纹相关字段（JA3/JA4R/transport/profile）决定 TLS 握手参数，但池本身
/// 按 `ConnectionKey` 区分连接，这里只负责在拿到的 TCP 连接上完成 TLS。
#[cfg(feature = "connection-pool")]
pub fn send_https_request_with_pool(
    host: &str,
    port: u16,
    path: &str,
    request: &HttpRequest,
    config: &HttpClientConfig,
    pool_manager: &std::sync::Arc<super::pool::ConnectionPoolManager>,
) -> Result<HttpResponse> {
    #[cfg(feature = "rustls-tls")]
    {
        use rustls::client::ServerName;

        let pool = pool_manager.get_pool(host, port, true, request)?;
        let conn = pool
            .GetTCP()
            .map_err(|e| HttpClientError::ConnectionFailed(format!("从连接池获取连接失败: {:?}", e)))?;
        let tcp_stream = conn
            .GetTcpConn()
            .ok_or_else(|| HttpClientError::ConnectionFailed("期望 TCP 连接但得到 UDP".to_string()))?
            .try_clone()
            .map_err(HttpClientError::Io)?;

        tcp_stream
            .set_read_timeout(Some(config.read_timeout))
            .map_err(HttpClientError::Io)?;
        tcp_stream
            .set_write_timeout(Some(config.write_timeout))
            .map_err(HttpClientError::Io)?;

        let spec = resolve_client_hello_spec(request, config.profile.as_ref());
        let tls_config = super::rustls_utils::build_client_config(
            config.verify_tls,
            vec![b"http/1.1".to_vec()],
            spec.as_ref(),
        );

        let sni_host = request.sni_override.as_deref().unwrap_or(host);
        let server_name = ServerName::try_from(sni_host)
            .map_err(|_| HttpClientError::TlsError("无效的服务器名称".to_string()))?;

        let tls_conn = rustls::ClientConnection::new(Arc::new(tls_config), server_name)
            .map_err(|e| HttpClientError::TlsError(format!("TLS 连接创建失败: {}", e)))?;

        let mut tls_stream = rustls::StreamOwned::new(tls_conn, tcp_stream);

        let http_request = request.build_http1_request_bytes(host, path);
        tls_stream.write_all(&http_request).map_err(HttpClientError::Io)?;
        tls_stream.flush().map_err(HttpClientError::Io)?;

        let buffer = super::io::read_http1_response_bytes(
            &mut tls_stream,
            super::io::DEFAULT_MAX_RESPONSE_BYTES,
        )
        .map_err(HttpClientError::Io)?;

        HttpResponse::parse(&buffer).map_err(HttpClientError::InvalidResponse)
    }

    #[cfg(not(feature = "rustls-tls"))]
    {
        let _ = (host, port, path, request, config, pool_manager);
        Err(HttpClientError::TlsError("需要启用 rustls-tls 特性".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::request::HttpMethod;

    #[test]
    #[ignore] // 需要网络连接
    fn test_send_https_request() {
        let request = HttpRequest::new(HttpMethod::Get, "https://httpbin.org/get")
            .with_user_agent("TestClient/1.0");

        let config = HttpClientConfig::default();
        let response = send_https_request("httpbin.org", 443, "/get", &request, &config).unwrap();

        assert!(response.status_code > 0);
    }

    #[test]
    fn spec_resolution_prefers_explicit_transport_over_ja3() {
        let mut transport = crate::fingerprint::transport_spec::TransportSpec::new();
        transport.alpn = vec!["h2".to_string()];
        let request = HttpRequest::new(HttpMethod::Get, "https://example.com/")
            .with_transport(transport)
            .with_ja3("771,4865,0,0");

        let spec = resolve_client_hello_spec(&request, None);
        assert!(spec.is_some());
    }

    #[test]
    fn spec_resolution_falls_back_to_profile() {
        let request = HttpRequest::new(HttpMethod::Get, "https://example.com/");
        let profile = crate::profiles::chrome_133();
        let spec = resolve_client_hello_spec(&request, Some(&profile));
        assert!(spec.is_some());
    }
}
