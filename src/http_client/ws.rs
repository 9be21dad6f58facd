//! WebSocket 升级与帧读写（RFC 6455）
//!
//! 复用指纹化的拨号路径：`ws://` 走跟 `http1.rs` 一样的裸 TCP 连接，
//! `wss://` 走跟 `tls.rs` 一样的 `resolve_client_hello_spec` +
//! `rustls_utils::build_client_config`，握手完成后把底层 stream 转交给
//! 这里的帧读写循环，不再经过 HTTP 响应解析。

use super::{HttpClientConfig, HttpClientError, HttpRequest, Result};
use rand::RngCore;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};
use std::net::TcpStream;

const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// WebSocket 帧操作码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Continuation,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x0 => Some(Opcode::Continuation),
            0x1 => Some(Opcode::Text),
            0x2 => Some(Opcode::Binary),
            0x8 => Some(Opcode::Close),
            0x9 => Some(Opcode::Ping),
            0xA => Some(Opcode::Pong),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Opcode::Continuation => 0x0,
            Opcode::Text => 0x1,
            Opcode::Binary => 0x2,
            Opcode::Close => 0x8,
            Opcode::Ping => 0x9,
            Opcode::Pong => 0xA,
        }
    }
}

/// 一条已解析的 WebSocket 消息
#[derive(Debug, Clone)]
pub struct Message {
    pub opcode: Opcode,
    pub payload: Vec<u8>,
}

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

/// 一条已完成升级握手的 WebSocket 连接
pub struct WebSocketConnection {
    stream: Transport,
    /// 握手响应之后从 socket 里多读到、还没来得及解析成帧的字节
    leftover: Vec<u8>,
}

fn parse_ws_url(url: &str) -> Result<(bool, String, u16, String)> {
    let url = url.trim();
    let (tls, rest) = if let Some(stripped) = url.strip_prefix("wss://") {
        (true, stripped)
    } else if let Some(stripped) = url.strip_prefix("ws://") {
        (false, stripped)
    } else {
        return Err(HttpClientError::InvalidUrl(
            "WebSocket URL 必须以 ws:// 或 wss:// 开头".to_string(),
        ));
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
        (host_port.to_string(), if tls { 443 } else { 80 })
    };

    Ok((tls, host, port, path.to_string()))
}

fn generate_sec_key() -> String {
    use base64::Engine;
    let mut key_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut key_bytes);
    base64::engine::general_purpose::STANDARD.encode(key_bytes)
}

fn expected_accept(sec_key: &str) -> String {
    use base64::Engine;
    let mut hasher = Sha1::new();
    hasher.update(sec_key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    let digest = hasher.finalize();
    base64::engine::general_purpose::STANDARD.encode(digest)
}

/// 逐字节读到 `\r\n\r\n` 为止（握手响应没有 Content-Length，不能复用
/// `io::read_http1_response_bytes`，那个函数在两者都没有时会一直读到 EOF）
fn read_until_headers_end(stream: &mut Transport) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1];
    loop {
        let n = stream.read(&mut tmp)?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "连接在握手响应完成前关闭",
            ));
        }
        buf.push(tmp[0]);
        if buf.len() >= 4 && &buf[buf.len() - 4..] == b"\r\n\r\n" {
            return Ok(buf);
        }
        if buf.len() > 64 * 1024 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "握手响应头过大",
            ));
        }
    }
}

impl WebSocketConnection {
    /// 完成 RFC 6455 升级握手，返回可读写帧的连接
    pub fn connect(request: &HttpRequest, config: &HttpClientConfig) -> Result<Self> {
        let (tls, host, port, path) = parse_ws_url(&request.url)?;

        let addr = format!("{}:{}", host, port);
        let tcp_stream = TcpStream::connect(&addr)
            .map_err(|e| HttpClientError::ConnectionFailed(format!("连接失败 {}: {}", addr, e)))?;
        tcp_stream
            .set_read_timeout(Some(config.read_timeout))
            .map_err(HttpClientError::Io)?;
        tcp_stream
            .set_write_timeout(Some(config.write_timeout))
            .map_err(HttpClientError::Io)?;

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

        let sec_key = generate_sec_key();
        let mut request_text = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Key: {}\r\nSec-WebSocket-Version: 13\r\nUser-Agent: {}\r\n",
            path, host, sec_key, config.user_agent,
        );
        for (k, v) in request.headers.iter() {
            if matches!(
                k.to_ascii_lowercase().as_str(),
                "host" | "upgrade" | "connection" | "sec-websocket-key" | "sec-websocket-version"
            ) {
                continue;
            }
            request_text.push_str(&format!("{}: {}\r\n", k, v));
        }
        request_text.push_str("\r\n");

        stream
            .write_all(request_text.as_bytes())
            .map_err(HttpClientError::Io)?;
        stream.flush().map_err(HttpClientError::Io)?;

        let header_bytes = read_until_headers_end(&mut stream).map_err(HttpClientError::Io)?;
        let header_str = String::from_utf8_lossy(&header_bytes);
        let mut lines = header_str.lines();
        let status_line = lines.next().unwrap_or("");
        if !status_line.contains("101") {
            return Err(HttpClientError::InvalidResponse(format!(
                "WebSocket 握手失败，服务器返回: {}",
                status_line
            )));
        }

        let expected = expected_accept(&sec_key);
        let accept_ok = lines.any(|line| {
            line.split_once(':')
                .map(|(k, v)| k.trim().eq_ignore_ascii_case("sec-websocket-accept") && v.trim() == expected)
                .unwrap_or(false)
        });
        if !accept_ok {
            return Err(HttpClientError::InvalidResponse(
                "Sec-WebSocket-Accept 校验失败".to_string(),
            ));
        }

        Ok(Self {
            stream,
            leftover: Vec::new(),
        })
    }

    /// 读取下一条完整消息；若服务器设置了 MASK 位，按 RFC 6455 去掩码
    pub fn receive(&mut self) -> Result<Message> {
        let mut buf = std::mem::take(&mut self.leftover);
        loop {
            if let Some((message, rest)) = try_parse_frame(&buf)? {
                self.leftover = rest;
                return Ok(message);
            }

            let mut tmp = [0u8; 4096];
            let n = self.stream.read(&mut tmp).map_err(HttpClientError::Io)?;
            if n == 0 {
                return Err(HttpClientError::ConnectionFailed(
                    "连接在帧读取完成前关闭".to_string(),
                ));
            }
            buf.extend_from_slice(&tmp[..n]);
        }
    }

    /// 按 RFC 6455 要求给客户端帧打掩码并发送
    fn send_frame(&mut self, opcode: Opcode, payload: &[u8]) -> Result<()> {
        let mut frame = Vec::with_capacity(payload.len() + 14);
        frame.push(0x80 | opcode.to_byte());

        let len = payload.len();
        if len < 126 {
            frame.push(0x80 | len as u8);
        } else if len <= u16::MAX as usize {
            frame.push(0x80 | 126);
            frame.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            frame.push(0x80 | 127);
            frame.extend_from_slice(&(len as u64).to_be_bytes());
        }

        let mut mask = [0u8; 4];
        rand::thread_rng().fill_bytes(&mut mask);
        frame.extend_from_slice(&mask);

        let mut masked_payload = payload.to_vec();
        for (i, b) in masked_payload.iter_mut().enumerate() {
            *b ^= mask[i % 4];
        }
        frame.extend_from_slice(&masked_payload);

        self.stream.write_all(&frame).map_err(HttpClientError::Io)?;
        self.stream.flush().map_err(HttpClientError::Io)
    }

    pub fn send_text(&mut self, text: &str) -> Result<()> {
        self.send_frame(Opcode::Text, text.as_bytes())
    }

    pub fn send_binary(&mut self, data: &[u8]) -> Result<()> {
        self.send_frame(Opcode::Binary, data)
    }

    pub fn ping(&mut self, payload: &[u8]) -> Result<()> {
        self.send_frame(Opcode::Ping, payload)
    }

    pub fn pong(&mut self, payload: &[u8]) -> Result<()> {
        self.send_frame(Opcode::Pong, payload)
    }

    /// 发送 Close 帧；调用方仍需丢弃这个连接
    pub fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        let mut payload = code.to_be_bytes().to_vec();
        payload.extend_from_slice(reason.as_bytes());
        self.send_frame(Opcode::Close, &payload)
    }
}

/// 尝试从缓冲区里解析出一个完整帧。数据不够时返回 `Ok(None)`，缓冲区不变。
fn try_parse_frame(buf: &[u8]) -> Result<Option<(Message, Vec<u8>)>> {
    if buf.len() < 2 {
        return Ok(None);
    }

    let opcode = Opcode::from_byte(buf[0] & 0x0F)
        .ok_or_else(|| HttpClientError::InvalidResponse("未知的帧操作码".to_string()))?;
    let masked = buf[1] & 0x80 != 0;
    let len7 = buf[1] & 0x7F;

    let (payload_len, header_len) = match len7 {
        126 => {
            if buf.len() < 4 {
                return Ok(None);
            }
            (u16::from_be_bytes([buf[2], buf[3]]) as usize, 4)
        }
        127 => {
            if buf.len() < 10 {
                return Ok(None);
            }
            (u64::from_be_bytes(buf[2..10].try_into().unwrap()) as usize, 10)
        }
        n => (n as usize, 2),
    };

    let mask_len = if masked { 4 } else { 0 };
    let total = header_len + mask_len + payload_len;
    if buf.len() < total {
        return Ok(None);
    }

    let payload_start = header_len + mask_len;
    let mut payload = buf[payload_start..total].to_vec();
    if masked {
        let mask_start = header_len;
        let mask = [
            buf[mask_start],
            buf[mask_start + 1],
            buf[mask_start + 2],
            buf[mask_start + 3],
        ];
        for (i, b) in payload.iter_mut().enumerate() {
            *b ^= mask[i % 4];
        }
    }

    Ok(Some((Message { opcode, payload }, buf[total..].to_vec())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_ws_scheme() {
        assert!(parse_ws_url("https://example.com/").is_err());
    }

    #[test]
    fn parses_wss_with_explicit_port() {
        let (tls, host, port, path) = parse_ws_url("wss://echo.example.com:9443/stream").unwrap();
        assert!(tls);
        assert_eq!(host, "echo.example.com");
        assert_eq!(port, 9443);
        assert_eq!(path, "/stream");
    }

    #[test]
    fn defaults_to_port_80_for_plain_ws() {
        let (tls, _host, port, _path) = parse_ws_url("ws://example.com/socket").unwrap();
        assert!(!tls);
        assert_eq!(port, 80);
    }

    #[test]
    fn accept_key_matches_rfc6455_example() {
        // RFC 6455 §1.3 给出的示例 key/accept 对
        let accept = expected_accept("dGhlIHNhbXBsZSBub25jZQ==");
        assert_eq!(accept, "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
    }

    #[test]
    fn unmasks_client_style_frame_round_trip() {
        // 构造一个带掩码的文本帧（服务器通常不加掩码，这里只验证解析逻辑本身）
        let payload = b"hi";
        let mask = [0x01u8, 0x02, 0x03, 0x04];
        let masked: Vec<u8> = payload.iter().enumerate().map(|(i, b)| b ^ mask[i % 4]).collect();
        let mut frame = vec![0x81, 0x80 | payload.len() as u8];
        frame.extend_from_slice(&mask);
        frame.extend_from_slice(&masked);

        let (message, rest) = try_parse_frame(&frame).unwrap().unwrap();
        assert_eq!(message.opcode, Opcode::Text);
        assert_eq!(message.payload, payload);
        assert!(rest.is_empty());
    }

    #[test]
    fn incomplete_frame_returns_none() {
        let frame = vec![0x81, 0x05, b'h', b'i'];
        assert!(try_parse_frame(&frame).unwrap().is_none());
    }
}
