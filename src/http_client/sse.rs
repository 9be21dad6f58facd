//! Server-Sent Events（`text/event-stream`）客户端
//!
//! 复用跟 `http1.rs`/`tls.rs` 相同的拨号方式发出一次 GET 请求，随后不按
//! `Content-Length` 读取响应体（连接按设计永不正常结束），而是边读边按
//! WHATWG EventSource 规范切分出一个个事件。

use super::{HttpClientConfig, HttpClientError, HttpRequest, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::TcpStream;

enum Transport {
    Plain(TcpStream),
    #[cfg(feature = "rustls-tls")]
    Tls(Box<rustls::StreamOwned<rustls::ClientConnection, TcpStream>>),
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Transport::Plain(s) => s.read(buf),
            #[cfg(feature = "rustls-tls")]
            Transport::Tls(s) => s.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Transport::Plain(s) => s.write(buf),
            #[cfg(feature = "rustls-tls")]
            Transport::Tls(s) => s.write(buf),
        }
    }
    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Transport::Plain(s) => s.flush(),
            #[cfg(feature = "rustls-tls")]
            Transport::Tls(s) => s.flush(),
        }
    }
}

/// 一条已解析的 SSE 事件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SseEvent {
    pub id: Option<String>,
    /// 未显式指定 `event:` 时是 "message"
    pub event: String,
    pub data: String,
    pub retry: Option<u64>,
}

/// 把原始字节流切成一个个 `SseEvent`，不涉及任何 IO。
/// 独立出来是为了能在不连网的情况下对字段解析逻辑做单元测试。
#[derive(Default)]
struct EventParser {
    buf: Vec<u8>,
    last_event_id: Option<String>,
}

impl EventParser {
    fn feed(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// 从已缓冲的数据里取出下一条事件；数据不够凑成一个事件块时返回 `None`
    fn next_ready_event(&mut self) -> Option<SseEvent> {
        loop {
            let pos = find_event_boundary(&self.buf)?;
            let block = self.buf[..pos].to_vec();
            let drop_len = pos + boundary_len(&self.buf[pos..]);
            self.buf.drain(..drop_len);
            if let Some(event) = self.parse_event_block(&block) {
                return Some(event);
            }
            // 空块（纯粹的 keep-alive 换行）跳过，继续找下一个事件块
        }
    }

    fn parse_event_block(&mut self, block: &[u8]) -> Option<SseEvent> {
        let text = String::from_utf8_lossy(block);
        let mut event = SseEvent {
            event: "message".to_string(),
            ..Default::default()
        };
        let mut data_lines: Vec<String> = Vec::new();
        let mut saw_field = false;

        for line in text.lines() {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let (field, value) = match line.split_once(':') {
                Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
                None => (line, ""),
            };
            saw_field = true;
            match field {
                "event" => event.event = value.to_string(),
                "data" => data_lines.push(value.to_string()),
                "id" => {
                    self.last_event_id = Some(value.to_string());
                    event.id = Some(value.to_string());
                }
                "retry" => {
                    if let Ok(ms) = value.parse::<u64>() {
                        event.retry = Some(ms);
                    }
                }
                _ => {}
            }
        }

        if !saw_field {
            return None;
        }
        event.data = data_lines.join("\n");
        if event.id.is_none() {
            event.id = self.last_event_id.clone();
        }
        Some(event)
    }
}

/// 事件块以 `\n\n`、`\r\n\r\n` 或混用的换行结尾；返回块结束位置（不含分隔符）
fn find_event_boundary(buf: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' {
            if buf[i + 1] == b'\n' {
                return Some(i);
            }
            if i + 3 < buf.len() && &buf[i + 1..i + 4] == b"\r\n\n" {
                return Some(i);
            }
        }
        if i + 3 < buf.len() && &buf[i..i + 4] == b"\r\n\r\n" {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn boundary_len(tail: &[u8]) -> usize {
    if tail.starts_with(b"\r\n\r\n") {
        4
    } else if tail.starts_with(b"\n\r\n") {
        3
    } else {
        2
    }
}

fn read_until_headers_end(stream: &mut Transport) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1];
    loop {
        let n = stream.read(&mut tmp)?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "连接在响应头读完前关闭",
            ));
        }
        buf.push(tmp[0]);
        if buf.len() >= 4 && &buf[buf.len() - 4..] == b"\r\n\r\n" {
            return Ok(buf);
        }
        if buf.len() > 64 * 1024 {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "响应头过大"));
        }
    }
}

/// 一条已完成请求、还在持续接收事件流的 SSE 连接
pub struct SseConnection {
    stream: Transport,
    parser: EventParser,
}

impl SseConnection {
    /// 发起 GET 请求并校验响应是被 2xx 接受的
    pub fn connect(request: &HttpRequest, config: &HttpClientConfig) -> Result<Self> {
        let (scheme, host, port, path) = super::executor::parse_url(&request.url)?;
        let tls = match scheme.as_str() {
            "http" => false,
            "https" => true,
            _ => return Err(HttpClientError::InvalidUrl(format!("不支持的协议: {}", scheme))),
        };

        let addr = format!("{}:{}", host, port);
        let tcp_stream = TcpStream::connect(&addr)
            .map_err(|e| HttpClientError::ConnectionFailed(format!("连接失败 {}: {}", addr, e)))?;
        tcp_stream
            .set_write_timeout(Some(config.write_timeout))
            .map_err(HttpClientError::Io)?;
        // SSE 连接会长时间挂起等待事件，读超时交给调用方通过 next_event 的调用节奏控制

        let mut stream = if tls {
            #[cfg(feature = "rustls-tls")]
            {
                let spec = super::tls::resolve_client_hello_spec(request, config.profile.as_ref());
                let tls_config = super::rustls_utils::build_client_config(
                    config.verify_tls,
                    vec![b"http/1.1".to_vec()],
                    spec.as_ref(),
                );
                let sni_host = request.sni_override.as_deref().unwrap_or(&host);
                let server_name = rustls::client::ServerName::try_from(sni_host)
                    .map_err(|_| HttpClientError::TlsError("无效的服务器名称".to_string()))?;
                let conn =
                    rustls::ClientConnection::new(std::sync::Arc::new(tls_config), server_name)
                        .map_err(|e| HttpClientError::TlsError(format!("TLS 连接创建失败: {}", e)))?;
                Transport::Tls(Box::new(rustls::StreamOwned::new(conn, tcp_stream)))
            }
            #[cfg(not(feature = "rustls-tls"))]
            {
                return Err(HttpClientError::TlsError("需要启用 rustls-tls 特性".to_string()));
            }
        } else {
            Transport::Plain(tcp_stream)
        };

        let mut sse_request = request.clone();
        if !sse_request.headers.contains_key("Accept") {
            sse_request = sse_request.with_header("Accept", "text/event-stream");
        }
        if !sse_request.headers.contains_key("Cache-Control") {
            sse_request = sse_request.with_header("Cache-Control", "no-cache");
        }
        let request_bytes = sse_request.build_http1_request_bytes(&host, &path);

        stream.write_all(&request_bytes).map_err(HttpClientError::Io)?;
        stream.flush().map_err(HttpClientError::Io)?;

        let header_bytes = read_until_headers_end(&mut stream).map_err(HttpClientError::Io)?;
        let header_str = String::from_utf8_lossy(&header_bytes);
        let mut lines = header_str.lines();
        let status_line = lines.next().unwrap_or("");
        let status_code = status_line
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(0);
        if !(200..300).contains(&status_code) {
            return Err(HttpClientError::InvalidResponse(format!(
                "SSE 请求未被接受，服务器返回: {}",
                status_line
            )));
        }

        Ok(Self {
            stream,
            parser: EventParser::default(),
        })
    }

    /// 阻塞读取下一条事件；连接被服务器关闭时返回 `Ok(None)`
    pub fn next_event(&mut self) -> Result<Option<SseEvent>> {
        loop {
            if let Some(event) = self.parser.next_ready_event() {
                return Ok(Some(event));
            }

            let mut tmp = [0u8; 4096];
            let n = self.stream.read(&mut tmp).map_err(HttpClientError::Io)?;
            if n == 0 {
                return Ok(None);
            }
            self.parser.feed(&tmp[..n]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_data_only_event() {
        let mut parser = EventParser::default();
        parser.feed(b"data: hello\n\n");
        let event = parser.next_ready_event().unwrap();
        assert_eq!(event.data, "hello");
        assert_eq!(event.event, "message");
    }

    #[test]
    fn joins_multiple_data_lines_with_newline() {
        let mut parser = EventParser::default();
        parser.feed(b"data: line1\ndata: line2\n\n");
        let event = parser.next_ready_event().unwrap();
        assert_eq!(event.data, "line1\nline2");
    }

    #[test]
    fn tracks_last_event_id_across_events() {
        let mut parser = EventParser::default();
        parser.feed(b"id: 42\ndata: a\n\ndata: b\n\n");
        let first = parser.next_ready_event().unwrap();
        assert_eq!(first.id.as_deref(), Some("42"));
        let second = parser.next_ready_event().unwrap();
        assert_eq!(second.id.as_deref(), Some("42"));
    }

    #[test]
    fn ignores_comment_lines() {
        let mut parser = EventParser::default();
        parser.feed(b": keep-alive\ndata: x\n\n");
        let event = parser.next_ready_event().unwrap();
        assert_eq!(event.data, "x");
    }

    #[test]
    fn custom_event_name_and_retry_are_parsed() {
        let mut parser = EventParser::default();
        parser.feed(b"event: ping\nretry: 3000\ndata: {}\n\n");
        let event = parser.next_ready_event().unwrap();
        assert_eq!(event.event, "ping");
        assert_eq!(event.retry, Some(3000));
    }

    #[test]
    fn incomplete_block_yields_nothing_yet() {
        let mut parser = EventParser::default();
        parser.feed(b"data: partial");
        assert!(parser.next_ready_event().is_none());
    }

    #[test]
    fn pure_keepalive_newline_yields_no_event() {
        let mut parser = EventParser::default();
        parser.feed(b"\n\ndata: real\n\n");
        let event = parser.next_ready_event().unwrap();
        assert_eq!(event.data, "real");
    }
}
