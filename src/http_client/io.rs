//! IO 辅助：读取 HTTP/1.x 响应字节
//!
//! 目的：避免单纯依赖 `read_to_end()`（依赖连接关闭）造成阻塞/等待问题。
//! 具体做法：
//! - 先读到 `\r\n\r\n` 拿到响应头
//! - 若有 `Content-Length`：读到完整 body 后返回
//! - 若是 `Transfer-Encoding: chunked`：读到 `0\r\n\r\n`（不含 trailer 的常见场景）后返回
//! - 否则：读到 EOF（等价于连接关闭）
//!
//! 同时提供最大响应大小保护，防止内存被打爆。

use std::io;
use std::io::Read;

pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024; // 16MiB
/// 允许的最大 Content-Length 值（100MB），防止恶意服务器发送超大声明导致内存耗尽
pub const MAX_CONTENT_LENGTH: usize = 100 * 1024 * 1024; // 100MB

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn parse_headers_for_length_and_chunked(header_bytes: &[u8]) -> (Option<usize>, bool) {
    let header_str = String::from_utf8_lossy(header_bytes);
    let mut content_length: Option<usize> = None;
    let mut is_chunked = false;

    for line in header_str.lines().skip(1) {
        let (k, v) = match line.split_once(':') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => continue,
        };

        if k.eq_ignore_ascii_case("content-length") {
            if let Ok(n) = v.parse::<usize>() {
                content_length = Some(n);
            }
        } else if k.eq_ignore_ascii_case("transfer-encoding")
            && v.to_ascii_lowercase().contains("chunked")
        {
            is_chunked = true;
        }
    }

    (content_length, is_chunked)
}

/// 读取 HTTP/1.x 响应的原始字节（headers + body）
pub fn read_http1_response_bytes<R: Read>(reader: &mut R, max_bytes: usize) -> io::Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    let mut tmp = [0u8; 8192];

    let mut headers_end: Option<usize> = None;
    let mut target_len: Option<usize> = None;
    let mut is_chunked = false;

    loop {
        if let Some(t) = target_len {
            if buf.len() >= t {
                break;
            }
        }

        if buf.len() >= max_bytes {
            return Err(io::Error::other(format!("响应过大 (>{} bytes)", max_bytes)));
        }

        let n = reader.read(&mut tmp)?;
        if n == 0 {
            // EOF：连接关闭（或底层已无更多数据）
            break;
        }
        buf.extend_from_slice(&tmp[..n]);

        if headers_end.is_none() {
            if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
                let end = pos + 4;
                headers_end = Some(end);
                let (cl, chunked) = parse_headers_for_length_and_chunked(&buf[..end]);
                is_chunked = chunked;
                if let Some(cl) = cl {
                    if cl > MAX_CONTENT_LENGTH {
                        return Err(io::Error::other(format!(
                            "Content-Length 过大: {} bytes（上限 {} bytes）",
                            cl, MAX_CONTENT_LENGTH
                        )));
                    }
                    target_len = Some(end.saturating_add(cl));
                }
            }
        }

        // chunked：通常没有 trailer，读到结束标记即可返回，交给后续解析流程
        if is_chunked {
            if let Some(end) = headers_end {
                let body = &buf[end..];
                if find_subsequence(body, b"0\r\n\r\n").is_some() {
                    break;
                }
            }
        }
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_response_with_content_length() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";
        let mut cursor = Cursor::new(raw.to_vec());
        let out = read_http1_response_bytes(&mut cursor, DEFAULT_MAX_RESPONSE_BYTES).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn reads_chunked_response_to_terminator() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n";
        let mut cursor = Cursor::new(raw.to_vec());
        let out = read_http1_response_bytes(&mut cursor, DEFAULT_MAX_RESPONSE_BYTES).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn rejects_oversized_content_length() {
        let raw = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n",
            MAX_CONTENT_LENGTH + 1
        );
        let mut cursor = Cursor::new(raw.into_bytes());
        let err = read_http1_response_bytes(&mut cursor, DEFAULT_MAX_RESPONSE_BYTES).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }
}
