//! HTTP 响应解析

use super::cookie::Cookie;
use super::header_list::OrderedHeaders;

/// HTTP 响应
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: String,
    pub headers: OrderedHeaders,
    pub body: Vec<u8>,
    pub http_version: String,
    /// 请求耗时（毫秒）
    pub response_time_ms: u64,
    /// 实际使用的协议（"HTTP/1.1"/"HTTP/2"/"HTTP/3"），重定向链下仍指最后一跳
    pub protocol_used: String,
    /// 经过重定向后的最终 URL；未重定向时等于请求 URL
    pub final_url: Option<String>,
    /// 从 Set-Cookie 解析出的 cookie（按出现顺序）
    pub cookies: Vec<Cookie>,
}

impl HttpResponse {
    /// 创建新的响应
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            status_text: String::new(),
            headers: OrderedHeaders::new(),
            body: Vec::new(),
            http_version: "HTTP/1.1".to_string(),
            response_time_ms: 0,
            protocol_used: "HTTP/1.1".to_string(),
            final_url: None,
            cookies: Vec::new(),
        }
    }

    /// 从原始响应解析
    pub fn parse(raw_response: &[u8]) -> Result<Self, String> {
        let response_str = String::from_utf8_lossy(raw_response);
        let parts: Vec<&str> = response_str.splitn(2, "\r\n\r\n").collect();

        if parts.len() < 2 {
            return Err("无效的 HTTP 响应".to_string());
        }

        let header_section = parts[0];
        let body_section = parts[1];

        // 解析状态行和 headers
        let mut lines = header_section.lines();

        // 解析状态行: HTTP/1.1 200 OK
        let status_line = lines.next().ok_or("缺少状态行")?;
        let status_parts: Vec<&str> = status_line.splitn(3, ' ').collect();

        if status_parts.len() < 2 {
            return Err("无效的状态行".to_string());
        }

        let http_version = status_parts[0].to_string();
        let status_code = status_parts[1]
            .parse::<u16>()
            .map_err(|_| "无效的状态码".to_string())?;
        let status_text = status_parts.get(2).unwrap_or(&"").to_string();

        // 解析 headers，按出现顺序保留
        let mut headers = OrderedHeaders::new();
        let mut cookies = Vec::new();
        for line in lines {
            if let Some(pos) = line.find(':') {
                let key = line[..pos].trim().to_string();
                let value = line[pos + 1..].trim().to_string();
                if key.eq_ignore_ascii_case("set-cookie") {
                    // 此时尚不知道请求 host；domain 留空，调用方（HttpClient）在
                    // 存入 CookieStore 前会用请求 host 回填未显式指定 Domain 的 cookie。
                    if let Some(cookie) = Cookie::parse_set_cookie(&value, String::new()) {
                        cookies.push(cookie);
                    }
                }
                headers.insert(key, value);
            }
        }

        // Body
        let body = body_section.as_bytes().to_vec();

        Ok(Self {
            status_code,
            status_text,
            headers,
            body,
            protocol_used: http_version.clone(),
            http_version,
            response_time_ms: 0,
            final_url: None,
            cookies,
        })
    }

    /// 获取响应体为字符串
    pub fn body_as_string(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    /// 检查是否成功
    pub fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }

    /// 获取 header（大小写不敏感）
    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 11\r\n\r\nHello World";

        let response = HttpResponse::parse(raw).unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.get_header("Content-Type"), Some(&"text/html".to_string()));
        assert_eq!(response.body_as_string().unwrap(), "Hello World");
        assert!(response.is_success());
    }

    #[test]
    fn test_parse_error_response() {
        let raw = b"HTTP/1.1 404 Not Found\r\n\r\n";

        let response = HttpResponse::parse(raw).unwrap();

        assert_eq!(response.status_code, 404);
        assert_eq!(response.status_text, "Not Found");
        assert!(!response.is_success());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let raw = b"HTTP/1.1 200 OK\r\nLocation: /next\r\n\r\n";
        let response = HttpResponse::parse(raw).unwrap();
        assert_eq!(response.get_header("location"), Some(&"/next".to_string()));
    }

    #[test]
    fn set_cookie_headers_are_collected() {
        let raw = b"HTTP/1.1 200 OK\r\nSet-Cookie: a=1; Path=/\r\nSet-Cookie: b=2; Path=/\r\n\r\n";
        let response = HttpResponse::parse(raw).unwrap();
        assert_eq!(response.cookies.len(), 2);
        assert_eq!(response.cookies[0].name, "a");
        assert_eq!(response.cookies[1].name, "b");
    }
}
