//! 请求执行器
//!
//! 真正驱动一次请求的地方：选协议（HTTP/3 > HTTP/2 > HTTP/1.1，按配置
//! 偏好）、走连接池或直连、处理重定向、解压响应体、读写 cookie。
//! `HttpClient`（`mod.rs`）只是把这里的入口包成面向用户的 facade。

use super::{decompress, http1, http2, http3, tls, HttpClientConfig, HttpClientError, HttpRequest, HttpResponse, Result};
use super::pool::ConnectionPoolManager;
use std::sync::Arc;

#[cfg(all(feature = "connection-pool", feature = "http2"))]
use super::http2_pool;
#[cfg(all(feature = "connection-pool", feature = "http3"))]
use super::http3_pool;

/// 发送一个请求，按配置的最大重定向次数跟踪 Location 链，直到拿到终态响应。
pub fn execute(
    config: &HttpClientConfig,
    pool_manager: Option<&Arc<ConnectionPoolManager>>,
    request: &HttpRequest,
) -> Result<HttpResponse> {
    execute_with_redirects(config, pool_manager, request, 0)
}

fn execute_with_redirects(
    config: &HttpClientConfig,
    pool_manager: Option<&Arc<ConnectionPoolManager>>,
    request: &HttpRequest,
    redirect_count: usize,
) -> Result<HttpResponse> {
    if redirect_count >= config.max_redirects {
        return Err(HttpClientError::InvalidResponse(format!(
            "重定向次数超过限制: {}",
            config.max_redirects
        )));
    }

    let (scheme, host, port, path) = parse_url(&request.url)?;

    // 从 CookieStore 中取出匹配 host/path 的 cookie，附加到 Cookie 头上
    let mut effective_request = request.clone();
    if let Some(store) = &config.cookie_store {
        if let Some(cookie_header) = store.generate_cookie_header(&host, &path) {
            effective_request.headers.insert("Cookie", cookie_header);
        }
    }
    let request = &effective_request;

    let mut response = match scheme.as_str() {
        "http" => dispatch_http(config, pool_manager, &host, port, &path, request)?,
        "https" => dispatch_https(config, pool_manager, &host, port, &path, request)?,
        _ => {
            return Err(HttpClientError::InvalidUrl(format!("不支持的协议: {}", scheme)));
        }
    };

    decompress::decompress_response(&mut response);

    if let Some(store) = &config.cookie_store {
        for mut cookie in response.cookies.clone() {
            if cookie.domain.is_empty() {
                cookie.domain = host.clone();
            }
            store.add_cookie(cookie);
        }
    }

    if (300..400).contains(&response.status_code) {
        if let Some(location) = response.headers.get("location") {
            let redirect_url = if location.starts_with("http://") || location.starts_with("https://")
            {
                location.clone()
            } else if location.starts_with("//") {
                format!("{}:{}", scheme, location)
            } else if location.starts_with('/') {
                format!("{}://{}:{}{}", scheme, host, port, location)
            } else {
                let base_path = if path.ends_with('/') {
                    &path
                } else {
                    path.rsplit_once('/').map(|(p, _)| p).unwrap_or("/")
                };
                format!("{}://{}:{}{}{}", scheme, host, port, base_path, location)
            };

            let mut redirect_request = request.clone();
            redirect_request.url = redirect_url;

            return execute_with_redirects(config, pool_manager, &redirect_request, redirect_count + 1);
        }
    }

    response.final_url = Some(request.url.clone());
    Ok(response)
}

/// 简单的 URL 解析：scheme、host、port、path
pub fn parse_url(url: &str) -> Result<(String, String, u16, String)> {
    let url = url.trim();

    let (scheme, rest) = if let Some(stripped) = url.strip_prefix("https://") {
        ("https", stripped)
    } else if let Some(stripped) = url.strip_prefix("http://") {
        ("http", stripped)
    } else {
        return Err(HttpClientError::InvalidUrl("缺少协议".to_string()));
    };

    let (host_port, path) = if let Some(pos) = rest.find('/') {
        (&rest[..pos], &rest[pos..])
    } else {
        (rest, "/")
    };

    let (host, port) = if let Some(pos) = host_port.find(':') {
        let host = host_port[..pos].to_string();
        let port = host_port[pos + 1..]
            .parse::<u16>()
            .map_err(|_| HttpClientError::InvalidUrl("无效的端口".to_string()))?;
        (host, port)
    } else {
        let default_port = if scheme == "https" { 443 } else { 80 };
        (host_port.to_string(), default_port)
    };

    Ok((scheme.to_string(), host, port, path.to_string()))
}

fn dispatch_http(
    config: &HttpClientConfig,
    pool_manager: Option<&Arc<ConnectionPoolManager>>,
    host: &str,
    port: u16,
    path: &str,
    request: &HttpRequest,
) -> Result<HttpResponse> {
    #[cfg(feature = "connection-pool")]
    {
        if let Some(pool_manager) = pool_manager {
            return super::http1_pool::send_http1_request_with_pool(
                host, port, path, request, config, pool_manager,
            );
        }
    }
    let _ = pool_manager;
    http1::send_http1_request(host, port, path, request, config)
}

fn dispatch_https(
    config: &HttpClientConfig,
    pool_manager: Option<&Arc<ConnectionPoolManager>>,
    host: &str,
    port: u16,
    path: &str,
    request: &HttpRequest,
) -> Result<HttpResponse> {
    #[cfg(feature = "connection-pool")]
    if let Some(pool_manager) = pool_manager {
        #[cfg(feature = "http3")]
        if config.prefer_http3 {
            let rt = tokio::runtime::Runtime::new()
                .map_err(|e| HttpClientError::ConnectionFailed(format!("创建运行时失败: {}", e)))?;
            return rt.block_on(async {
                http3_pool::send_http3_request_with_pool(host, port, path, request, config, pool_manager)
                    .await
            });
        }

        #[cfg(feature = "http2")]
        if config.prefer_http2 {
            let rt = tokio::runtime::Runtime::new()
                .map_err(|e| HttpClientError::ConnectionFailed(format!("创建运行时失败: {}", e)))?;
            // 池化路径不做协议降级：用户显式选择的协议偏好在这里被严格遵守
            return rt.block_on(async {
                http2_pool::send_http2_request_with_pool(host, port, path, request, config, pool_manager)
                    .await
            });
        }

        return tls::send_https_request_with_pool(host, port, path, request, config, pool_manager);
    }

    // 优先级：HTTP/3 > HTTP/2 > HTTP/1.1，逐级降级

    #[cfg(feature = "http3")]
    if config.prefer_http3 {
        match http3::send_http3_request(host, port, path, request, config) {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                tracing::warn!(error = %e, "HTTP/3 失败，尝试降级");
            }
        }
    }

    #[cfg(feature = "http2")]
    if config.prefer_http2 {
        match http2::send_http2_request(host, port, path, request, config) {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                tracing::debug!(error = %e, "HTTP/2 尝试失败，回退到 HTTP/1.1");
            }
        }
    }

    tls::send_https_request(host, port, path, request, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        let (scheme, host, port, path) = parse_url("https://example.com/path").unwrap();
        assert_eq!(scheme, "https");
        assert_eq!(host, "example.com");
        assert_eq!(port, 443);
        assert_eq!(path, "/path");

        let (scheme, host, port, path) = parse_url("http://example.com:8080/api").unwrap();
        assert_eq!(scheme, "http");
        assert_eq!(host, "example.com");
        assert_eq!(port, 8080);
        assert_eq!(path, "/api");
    }

    #[test]
    fn rejects_url_without_scheme() {
        assert!(parse_url("example.com/path").is_err());
    }
}
