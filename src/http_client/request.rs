//! HTTP 请求构建器

use super::header_list::OrderedHeaders;
use crate::fingerprint::transport_spec::TransportSpec;
use crate::HTTPHeaders;

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// HTTP 请求
///
/// 除了方法/URL/headers/body 以外，还携带每请求可覆盖的指纹/连接选项
/// （对应 spec §3 `Request` 的可选字段）：显式 `TransportSpec`、JA3/JA4R
/// 字符串覆盖、TLS 1.3 失败后是否自动重试、是否跳过证书校验、SNI 覆盖、
/// 以及是否允许连接复用。
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: OrderedHeaders,
    pub body: Option<Vec<u8>>,
    /// 显式传入的拨号描述，优先于 `HttpClientConfig.profile`
    pub transport: Option<TransportSpec>,
    /// JA3 字符串覆盖（与 `transport` 互斥，`transport` 优先）
    pub ja3: Option<String>,
    /// JA4R 字符串覆盖
    pub ja4r: Option<String>,
    /// 握手失败时是否允许按 §4.3 的规则自动重试/降级
    pub tls13_auto_retry: bool,
    /// 跳过证书校验（仅调试用）
    pub insecure_skip_verify: bool,
    /// 是否允许把这个请求的连接放回池中复用
    pub enable_connection_reuse: bool,
    /// 覆盖 TLS SNI（默认使用请求 URL 的 host）
    pub sni_override: Option<String>,
}

impl HttpRequest {
    /// 创建新的请求
    pub fn new(method: HttpMethod, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: OrderedHeaders::new(),
            body: None,
            transport: None,
            ja3: None,
            ja4r: None,
            tls13_auto_retry: true,
            insecure_skip_verify: false,
            enable_connection_reuse: true,
            sni_override: None,
        }
    }

    /// 添加 User-Agent
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.headers.insert("User-Agent", user_agent);
        self
    }

    /// 添加自定义 header
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// 批量添加 headers（保留 `HTTPHeaders` 自身的顺序）
    pub fn with_headers(mut self, headers: &HTTPHeaders) -> Self {
        for (key, value) in headers.to_map() {
            self.headers.insert(key, value);
        }
        self
    }

    /// 设置请求体
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// 设置 JSON 请求体
    pub fn with_json_body(mut self, json: &str) -> Self {
        self.headers.insert("Content-Type", "application/json");
        self.body = Some(json.as_bytes().to_vec());
        self
    }

    /// 显式指定拨号描述，覆盖客户端默认的 profile
    pub fn with_transport(mut self, transport: TransportSpec) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 通过 JA3 字符串覆盖指纹（不解析 HTTP/2、QUIC 部分）
    pub fn with_ja3(mut self, ja3: impl Into<String>) -> Self {
        self.ja3 = Some(ja3.into());
        self
    }

    /// 关闭 TLS 1.3 失败后的自动重试/降级
    pub fn without_tls13_auto_retry(mut self) -> Self {
        self.tls13_auto_retry = false;
        self
    }

    /// 构建 HTTP/1.1 请求行+headers+body 的字节流
    pub fn build_http1_request_bytes(&self, host: &str, path: &str) -> Vec<u8> {
        self.build_http1_request(host, path).into_bytes()
    }

    /// 构建 HTTP/1.1 请求字符串
    pub fn build_http1_request(&self, host: &str, path: &str) -> String {
        let mut request = format!("{} {} HTTP/1.1\r\n", self.method.as_str(), path);

        // Host header (必需)
        request.push_str(&format!("Host: {}\r\n", host));

        // 添加其他 headers，按插入顺序写出
        for (key, value) in &self.headers {
            if !key.eq_ignore_ascii_case("host") {
                request.push_str(&format!("{}: {}\r\n", key, value));
            }
        }

        // Content-Length (如果有 body)
        if let Some(ref body) = self.body {
            request.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }

        // Connection: close (HTTP/1.1)
        if !self.headers.contains_key("Connection") {
            request.push_str("Connection: close\r\n");
        }

        // 结束 headers
        request.push_str("\r\n");

        // 添加 body
        if let Some(ref body) = self.body {
            request.push_str(&String::from_utf8_lossy(body));
        }

        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http1_request() {
        let request = HttpRequest::new(HttpMethod::Get, "http://example.com/test")
            .with_user_agent("TestAgent/1.0")
            .with_header("Accept", "text/html");

        let http1_request = request.build_http1_request("example.com", "/test");

        assert!(http1_request.contains("GET /test HTTP/1.1"));
        assert!(http1_request.contains("Host: example.com"));
        assert!(http1_request.contains("User-Agent: TestAgent/1.0"));
        assert!(http1_request.contains("Accept: text/html"));
    }

    #[test]
    fn test_post_with_body() {
        let body = b"test data";
        let request =
            HttpRequest::new(HttpMethod::Post, "http://example.com/api").with_body(body.to_vec());

        let http1_request = request.build_http1_request("example.com", "/api");

        assert!(http1_request.contains("POST /api HTTP/1.1"));
        assert!(http1_request.contains("Content-Length: 9"));
        assert!(http1_request.contains("test data"));
    }

    #[test]
    fn header_order_is_preserved_on_the_wire() {
        let request = HttpRequest::new(HttpMethod::Get, "http://example.com/")
            .with_header("Accept", "*/*")
            .with_header("User-Agent", "test")
            .with_header("Accept-Language", "en");

        let rendered = request.build_http1_request("example.com", "/");
        let accept_pos = rendered.find("Accept:").unwrap();
        let ua_pos = rendered.find("User-Agent:").unwrap();
        let lang_pos = rendered.find("Accept-Language:").unwrap();
        assert!(accept_pos < ua_pos);
        assert!(ua_pos < lang_pos);
    }

    #[test]
    fn defaults_allow_retry_and_reuse() {
        let request = HttpRequest::new(HttpMethod::Get, "http://example.com/");
        assert!(request.tls13_auto_retry);
        assert!(request.enable_connection_reuse);
        assert!(!request.insecure_skip_verify);
    }
}
