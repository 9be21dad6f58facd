//! HTTP/2 实现
//!
//! 使用 h2 crate，按 `Http2Shape`（SETTINGS 顺序/值、连接级窗口更新、
//! 伪头顺序、流优先级）塑形连接，而不是用 h2 的默认参数。

use super::header_list::OrderedHeaders;
use super::{HttpClientConfig, HttpClientError, HttpRequest, HttpResponse, Result};

#[cfg(feature = "http2")]
use crate::fingerprint::transport_spec::Http2Shape;
#[cfg(feature = "http2")]
use h2::client;

#[cfg(feature = "http2")]
use tokio::runtime::Runtime;

/// 发送 HTTP/2 请求
#[cfg(feature = "http2")]
pub fn send_http2_request(
    host: &str,
    port: u16,
    path: &str,
    request: &HttpRequest,
    config: &HttpClientConfig,
) -> Result<HttpResponse> {
    let rt = Runtime::new()
        .map_err(|e| HttpClientError::ConnectionFailed(format!("创建运行时失败: {}", e)))?;

    rt.block_on(async { send_http2_request_async(host, port, path, request, config).await })
}

/// 把 `Http2Shape.settings` 中已知的 SETTINGS id 应用到 h2 的连接 builder 上。
/// h2 不支持任意未知 SETTINGS id，只应用它识别的六个标准项。
#[cfg(feature = "http2")]
fn apply_http2_shape(builder: &mut client::Builder, shape: &Http2Shape) {
    for &(id, value) in &shape.settings {
        match id {
            0x1 => {
                builder.header_table_size(value);
            }
            0x2 => {
                builder.enable_push(value != 0);
            }
            0x3 => {
                builder.max_concurrent_streams(value);
            }
            0x4 => {
                builder.initial_window_size(value);
            }
            0x5 => {
                builder.max_frame_size(value);
            }
            0x6 => {
                builder.max_header_list_size(value);
            }
            _ => {}
        }
    }

    if shape.window_update > 0 {
        builder.initial_connection_window_size(shape.window_update);
    }

    if !shape.pseudo_header_order.is_empty() {
        // h2 按固定内部顺序(:method,:scheme,:authority,:path)序列化伪头，
        // 公开 API 不提供逐流重排；这里只记录期望顺序供诊断使用。
        tracing::debug!(order = ?shape.pseudo_header_order, "http2 伪头顺序在 h2 后端下不可定制");
    }

    if shape.priority.is_some() {
        tracing::debug!("http2 流优先级在请求建立前无法通过 h2 公开 API 发送，已忽略");
    }
}

/// 把 `ClientProfile` 携带的 HTTP/2 设置转换成 `Http2Shape`
#[cfg(feature = "http2")]
fn profile_to_http2_shape(profile: &crate::ClientProfile) -> Http2Shape {
    let settings_map = profile.get_settings();
    let settings = profile
        .get_settings_order()
        .iter()
        .filter_map(|id| settings_map.get(id).map(|v| (*id, *v)))
        .collect();

    let priority = profile.get_header_priority().map(|p| (0u32, p.exclusive, p.stream_dependency, p.weight));

    Http2Shape {
        settings,
        window_update: profile.get_connection_flow(),
        pseudo_header_order: profile.get_pseudo_header_order().to_vec(),
        priority,
    }
}

#[cfg(feature = "http2")]
async fn send_http2_request_async(
    host: &str,
    port: u16,
    path: &str,
    request: &HttpRequest,
    config: &HttpClientConfig,
) -> Result<HttpResponse> {
    use std::net::ToSocketAddrs;
    use std::time::Instant;
    use tokio::net::TcpStream;

    let start = Instant::now();

    // 1. 建立 TCP 连接
    let addr = format!("{}:{}", host, port);
    let socket_addrs = addr
        .to_socket_addrs()
        .map_err(|e| HttpClientError::InvalidUrl(format!("DNS 解析失败: {}", e)))?
        .next()
        .ok_or_else(|| HttpClientError::InvalidUrl("无法解析地址".to_string()))?;

    let tcp = TcpStream::connect(socket_addrs)
        .await
        .map_err(|e| HttpClientError::ConnectionFailed(format!("TCP 连接失败: {}", e)))?;

    // 2. TLS 握手（携带指纹解析出的 ClientHelloSpec）
    let tls_stream = perform_tls_handshake(tcp, host, request, config).await?;

    // 3. HTTP/2 握手，应用 profile/transport 中的 Http2Shape
    let http2_shape = request
        .transport
        .as_ref()
        .and_then(|t| t.http2.clone())
        .or_else(|| config.profile.as_ref().map(profile_to_http2_shape));

    let mut builder = client::Builder::new();
    if let Some(shape) = &http2_shape {
        apply_http2_shape(&mut builder, shape);
    }

    let (mut client, h2_conn) = builder
        .handshake(tls_stream)
        .await
        .map_err(|e| HttpClientError::ConnectionFailed(format!("HTTP/2 握手失败: {}", e)))?;

    tokio::spawn(async move {
        if let Err(e) = h2_conn.await {
            eprintln!("HTTP/2 连接错误: {}", e);
        }
    });

    // 4. 构建请求
    let uri = format!("https://{}{}", host, path);
    let mut http_request = http::Request::builder()
        .method(request.method.as_str())
        .uri(uri)
        .version(http::Version::HTTP_2);

    http_request = http_request.header("host", host);
    http_request = http_request.header("user-agent", &config.user_agent);

    for (key, value) in &request.headers {
        http_request = http_request.header(key.as_str(), value.as_str());
    }

    let http_request = http_request
        .body(())
        .map_err(|e| HttpClientError::InvalidResponse(format!("构建请求失败: {}", e)))?;

    // 5. 发送请求
    let (response_future, _) = client
        .send_request(http_request, true)
        .map_err(|e| HttpClientError::ConnectionFailed(format!("发送请求失败: {}", e)))?;

    // 6. 接收响应
    let response = response_future
        .await
        .map_err(|e| HttpClientError::InvalidResponse(format!("接收响应失败: {}", e)))?;

    let status_code = response.status().as_u16();
    let headers = response.headers().clone();

    let mut body_stream = response.into_body();
    let mut body_data = Vec::new();

    while let Some(chunk) = body_stream.data().await {
        let chunk = chunk
            .map_err(|e| HttpClientError::Io(std::io::Error::other(format!("读取 body 失败: {}", e))))?;
        body_data.extend_from_slice(&chunk);
        let _ = body_stream.flow_control().release_capacity(chunk.len());
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
        http_version: "HTTP/2".to_string(),
        response_time_ms: elapsed,
        protocol_used: "HTTP/2".to_string(),
        final_url: None,
        cookies,
    })
}

#[cfg(feature = "http2")]
async fn perform_tls_handshake(
    tcp: tokio::net::TcpStream,
    host: &str,
    request: &HttpRequest,
    config: &HttpClientConfig,
) -> Result<tokio_rustls::client::TlsStream<tokio::net::TcpStream>> {
    use rustls::ServerName;
    use std::sync::Arc;
    use tokio_rustls::TlsConnector;

    let spec = super::tls::resolve_client_hello_spec(request, config.profile.as_ref());
    let tls_config = super::rustls_utils::build_client_config(
        config.verify_tls,
        vec![b"h2".to_vec(), b"http/1.1".to_vec()],
        spec.as_ref(),
    );

    let connector = TlsConnector::from(Arc::new(tls_config));

    let sni_host = request.sni_override.as_deref().unwrap_or(host);
    let server_name = ServerName::try_from(sni_host)
        .map_err(|_| HttpClientError::TlsError("无效的服务器名称".to_string()))?;

    connector
        .connect(server_name, tcp)
        .await
        .map_err(|e| HttpClientError::TlsError(format!("TLS 握手失败: {}", e)))
}

#[cfg(not(feature = "http2"))]
pub fn send_http2_request(
    _host: &str,
    _port: u16,
    _path: &str,
    _request: &HttpRequest,
    _config: &HttpClientConfig,
) -> Result<HttpResponse> {
    Err(HttpClientError::InvalidResponse(
        "HTTP/2 支持未启用，请使用 --features http2 编译".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "http2")]
    #[ignore]
    fn test_http2_request() {
        let request = HttpRequest::new(
            crate::http_client::request::HttpMethod::Get,
            "https://www.google.com/",
        );

        let config = HttpClientConfig::default();

        let result = send_http2_request("www.google.com", 443, "/", &request, &config);
        assert!(result.is_ok());

        let response = result.unwrap();
        assert_eq!(response.http_version, "HTTP/2");
        assert!(response.is_success());
    }

    #[test]
    #[cfg(feature = "http2")]
    fn http2_shape_maps_known_settings() {
        let shape = Http2Shape {
            settings: vec![(0x3, 100), (0x4, 6_291_456)],
            window_update: 15_663_105,
            pseudo_header_order: vec!["method".into(), "authority".into(), "scheme".into(), "path".into()],
            priority: None,
        };
        let mut builder = client::Builder::new();
        apply_http2_shape(&mut builder, &shape);
    }
}
