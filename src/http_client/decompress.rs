//! 响应体解压
//!
//! 按 `Content-Encoding` 解压响应体（gzip/deflate/br），解压成功后去掉该
//! header，让调用方看到的 `body` 始终是明文。解压失败时保留原始 body 和
//! header，不让个别畸形响应中断整条请求链路。

use super::response::HttpResponse;

/// 原地解压 `response.body`；无 `Content-Encoding` 或编码未知时不做任何事。
#[cfg(feature = "compression")]
pub fn decompress_response(response: &mut HttpResponse) {
    let Some(encoding) = response.headers.get("content-encoding").cloned() else {
        return;
    };

    let decoded = match encoding.trim().to_ascii_lowercase().as_str() {
        "gzip" | "x-gzip" => decode_gzip(&response.body),
        "deflate" => decode_deflate(&response.body),
        "br" => decode_brotli(&response.body),
        "identity" | "" => None,
        _ => None,
    };

    if let Some(body) = decoded {
        response.body = body;
        response.headers.remove("content-encoding");
        response.headers.remove("content-length");
    }
}

#[cfg(not(feature = "compression"))]
pub fn decompress_response(_response: &mut HttpResponse) {}

#[cfg(feature = "compression")]
fn decode_gzip(body: &[u8]) -> Option<Vec<u8>> {
    use std::io::Read;
    let mut decoder = flate2::read::GzDecoder::new(body);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).ok()?;
    Some(out)
}

#[cfg(feature = "compression")]
fn decode_deflate(body: &[u8]) -> Option<Vec<u8>> {
    use std::io::Read;
    let mut decoder = flate2::read::DeflateDecoder::new(body);
    let mut out = Vec::new();
    if decoder.read_to_end(&mut out).is_ok() {
        return Some(out);
    }
    // 部分服务器把 zlib 流当 "deflate" 发送（无 raw-deflate 头），两种都试一下
    let mut zlib_decoder = flate2::read::ZlibDecoder::new(body);
    let mut out = Vec::new();
    zlib_decoder.read_to_end(&mut out).ok()?;
    Some(out)
}

#[cfg(feature = "compression")]
fn decode_brotli(body: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let mut cursor = std::io::Cursor::new(body);
    brotli_decompressor::BrotliDecompress(&mut cursor, &mut out).ok()?;
    Some(out)
}

#[cfg(all(test, feature = "compression"))]
mod tests {
    use super::*;
    use crate::http_client::header_list::OrderedHeaders;

    fn gzip_bytes(data: &[u8]) -> Vec<u8> {
        use std::io::Write;
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn decompresses_gzip_body_and_strips_header() {
        let mut headers = OrderedHeaders::new();
        headers.insert("Content-Encoding", "gzip");
        let mut response = HttpResponse {
            headers,
            body: gzip_bytes(b"hello fingerprint"),
            ..HttpResponse::new(200)
        };

        decompress_response(&mut response);

        assert_eq!(response.body, b"hello fingerprint");
        assert!(response.headers.get("content-encoding").is_none());
    }

    #[test]
    fn leaves_plain_body_untouched_without_header() {
        let mut response = HttpResponse {
            body: b"plain".to_vec(),
            ..HttpResponse::new(200)
        };
        decompress_response(&mut response);
        assert_eq!(response.body, b"plain");
    }

    #[test]
    fn malformed_gzip_body_is_left_as_is() {
        let mut headers = OrderedHeaders::new();
        headers.insert("Content-Encoding", "gzip");
        let mut response = HttpResponse {
            headers,
            body: b"not actually gzip".to_vec(),
            ..HttpResponse::new(200)
        };

        decompress_response(&mut response);

        assert_eq!(response.body, b"not actually gzip");
        assert!(response.headers.get("content-encoding").is_some());
    }
}
