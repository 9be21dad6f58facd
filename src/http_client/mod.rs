//! HTTP 客户端模块
//!
//! 结合 netconnpool + fingerprint-rust 实现完整的 HTTP 客户端
//!
//! 特性：
//! - 使用 netconnpool 管理连接
//! - 应用 fingerprint-rust 的配置
//! - 支持 HTTP/1.1 和 HTTP/2
//! - TLS 层设计为可替换

pub mod cookie;
mod decompress;
mod executor;
pub mod header_list;
pub mod http1;
pub mod http1_pool;
pub mod http2;
#[cfg(all(feature = "connection-pool", feature = "http2"))]
pub mod http2_pool;
pub mod http3;
#[cfg(all(feature = "connection-pool", feature = "http3"))]
pub mod http3_pool;
pub mod io;
pub mod pool;
pub mod proxy;
pub mod reporter;
pub mod request;
pub mod response;
#[cfg(feature = "rustls-client-hello-customizer")]
mod rustls_client_hello_customizer;
#[cfg(any(feature = "rustls-tls", feature = "http2", feature = "http3"))]
mod rustls_utils;
pub mod sse;
pub mod tls;
pub mod ws;

pub use sse::{SseConnection, SseEvent};
pub use ws::{Message as WebSocketMessage, Opcode as WebSocketOpcode, WebSocketConnection};

pub use cookie::{Cookie, CookieStore, SameSite};
pub use header_list::OrderedHeaders;
pub use pool::{ConnectionPoolManager, PoolManagerConfig, PoolStats};
pub use proxy::{ProxyConfig, ProxyType};
pub use reporter::{ReportFormat, ReportSection, ValidationReport};
pub use request::{HttpMethod, HttpRequest};
pub use response::HttpResponse;
pub use tls::TlsConnector;

use crate::{ClientProfile, HTTPHeaders};
use std::io as std_io;
use std::time::Duration;

/// HTTP 客户端错误
#[derive(Debug)]
pub enum HttpClientError {
    Io(std_io::Error),
    InvalidUrl(String),
    InvalidResponse(String),
    TlsError(String),
    ConnectionFailed(String),
    Timeout,
    #[cfg(feature = "http2")]
    Http2Error(String),
    #[cfg(feature = "http3")]
    Http3Error(String),
    InvalidRequest(String),
}

impl std::fmt::Display for HttpClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpClientError::Io(e) => write!(f, "IO 错误: {}", e),
            HttpClientError::InvalidUrl(s) => write!(f, "无效的 URL: {}", s),
            HttpClientError::InvalidResponse(s) => write!(f, "无效的响应: {}", s),
            HttpClientError::TlsError(s) => write!(f, "TLS 错误: {}", s),
            HttpClientError::ConnectionFailed(s) => write!(f, "连接失败: {}", s),
            HttpClientError::Timeout => write!(f, "请求超时"),
            #[cfg(feature = "http2")]
            HttpClientError::Http2Error(s) => write!(f, "HTTP/2 错误: {}", s),
            #[cfg(feature = "http3")]
            HttpClientError::Http3Error(s) => write!(f, "HTTP/3 错误: {}", s),
            HttpClientError::InvalidRequest(s) => write!(f, "无效的请求: {}", s),
        }
    }
}

impl std::error::Error for HttpClientError {}

impl From<std_io::Error> for HttpClientError {
    fn from(err: std_io::Error) -> Self {
        HttpClientError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, HttpClientError>;

/// HTTP 客户端配置
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// 用户代理
    pub user_agent: String,
    /// HTTP Headers
    pub headers: HTTPHeaders,
    /// 浏览器配置
    pub profile: Option<ClientProfile>,
    /// 连接超时
    pub connect_timeout: Duration,
    /// 读取超时
    pub read_timeout: Duration,
    /// 写入超时
    pub write_timeout: Duration,
    /// 最大重定向次数
    pub max_redirects: usize,
    /// 是否验证 TLS 证书
    pub verify_tls: bool,
    /// 优先使用 HTTP/2
    pub prefer_http2: bool,
    /// 优先使用 HTTP/3
    pub prefer_http3: bool,
    /// Cookie 存储（可选）
    pub cookie_store: Option<Arc<CookieStore>>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            headers: HTTPHeaders::default(),
            profile: None,
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            max_redirects: 10,
            verify_tls: true,
            prefer_http2: true,  // 默认优先使用 HTTP/2
            prefer_http3: false, // HTTP/3 默认关闭（需要特殊配置）
            cookie_store: None,
        }
    }
}

/// HTTP 客户端
///
/// 使用 netconnpool 管理连接，应用 fingerprint-rust 的配置
pub struct HttpClient {
    config: HttpClientConfig,
    /// 连接池管理器（可选）
    pool_manager: Option<Arc<ConnectionPoolManager>>,
}

use std::sync::Arc;

impl HttpClient {
    /// 创建新的 HTTP 客户端
    pub fn new(config: HttpClientConfig) -> Self {
        Self {
            config,
            pool_manager: None,
        }
    }

    /// 创建带连接池的 HTTP 客户端
    pub fn with_pool(config: HttpClientConfig, pool_config: PoolManagerConfig) -> Self {
        Self {
            config,
            pool_manager: Some(Arc::new(ConnectionPoolManager::new(pool_config))),
        }
    }

    /// 使用浏览器配置创建客户端
    pub fn with_profile(profile: ClientProfile, headers: HTTPHeaders, user_agent: String) -> Self {
        let config = HttpClientConfig {
            profile: Some(profile),
            headers,
            user_agent,
            ..Default::default()
        };
        Self::new(config)
    }

    /// 获取连接池统计信息
    pub fn pool_stats(&self) -> Option<Vec<PoolStats>> {
        self.pool_manager.as_ref().map(|pm| pm.get_stats())
    }

    /// 清理空闲连接
    pub fn cleanup_idle_connections(&self) {
        if let Some(pm) = &self.pool_manager {
            pm.cleanup_idle();
        }
    }

    /// 发送 GET 请求
    pub fn get(&self, url: &str) -> Result<HttpResponse> {
        let request = HttpRequest::new(HttpMethod::Get, url)
            .with_user_agent(&self.config.user_agent)
            .with_headers(&self.config.headers);
        self.send_request(&request)
    }

    /// 发送 POST 请求
    pub fn post(&self, url: &str, body: &[u8]) -> Result<HttpResponse> {
        let request = HttpRequest::new(HttpMethod::Post, url)
            .with_user_agent(&self.config.user_agent)
            .with_headers(&self.config.headers)
            .with_body(body.to_vec());
        self.send_request(&request)
    }

    /// 发送自定义请求（协议选择、连接池、重定向、解压、cookie 回写都在 executor 里完成）
    pub fn send_request(&self, request: &HttpRequest) -> Result<HttpResponse> {
        executor::execute(&self.config, self.pool_manager.as_ref(), request)
    }

    /// 克隆一个共享同一连接池的客户端句柄，用于把请求派发到后台线程执行
    pub fn clone_handle(&self) -> Self {
        Self {
            config: self.config.clone(),
            pool_manager: self.pool_manager.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_client_has_no_pool_by_default() {
        let client = HttpClient::new(HttpClientConfig::default());
        assert!(client.pool_stats().is_none());
    }
}
