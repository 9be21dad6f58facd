//! ClientHello 记录构建器
//!
//! 把 ClientHelloSpec 一路编译成可直接发给服务器的 TLS 记录字节流。

use super::{ClientHelloMessage, TLSHandshake, TLSRecord};
use crate::tls_config::ClientHelloSpec;

pub struct TLSHandshakeBuilder;

impl TLSHandshakeBuilder {
    /// 根据 ClientHelloSpec 构建完整的 TLS 记录（Record + Handshake + ClientHello）
    pub fn build_client_hello(spec: &ClientHelloSpec, server_name: &str) -> Vec<u8> {
        let client_hello = ClientHelloMessage::from_spec(spec, server_name);
        let handshake = TLSHandshake::client_hello(client_hello.to_bytes());
        let record = TLSRecord::handshake(handshake.to_bytes());
        record.to_bytes()
    }

    /// 同上，但把关键阶段的调试信息打印到标准输出
    pub fn build_with_debug(spec: &ClientHelloSpec, server_name: &str) -> Vec<u8> {
        let client_hello = ClientHelloMessage::from_spec(spec, server_name);
        println!("ClientHelloSpec: {} 个密码套件, {} 个扩展, TLS 版本 0x{:04x}-0x{:04x}",
            spec.cipher_suites.len(), spec.extensions.len(), spec.tls_vers_min, spec.tls_vers_max);
        println!("{}", client_hello.debug_info());

        let body = client_hello.to_bytes();
        let handshake = TLSHandshake::client_hello(body);
        let handshake_bytes = handshake.to_bytes();
        let record = TLSRecord::handshake(handshake_bytes);
        let record_bytes = record.to_bytes();
        println!("TLS 记录: {} bytes", record_bytes.len());
        record_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_well_formed_record() {
        let spec = ClientHelloSpec {
            cipher_suites: vec![0xc02f, 0xc030, 0x1301],
            compression_methods: vec![0],
            extensions: vec![],
            tls_vers_min: 0x0303,
            tls_vers_max: 0x0304,
            metadata: None,
        };

        let bytes = TLSHandshakeBuilder::build_client_hello(&spec, "example.com");

        assert_eq!(bytes[0], 22); // Handshake
        assert_eq!(bytes[1], 0x03);
        assert_eq!(bytes[2], 0x01);

        let record_length = u16::from_be_bytes([bytes[3], bytes[4]]) as usize;
        assert_eq!(bytes.len(), 5 + record_length);
    }

    #[test]
    fn chrome_133_record_is_reasonably_sized() {
        let spec = ClientHelloSpec::chrome_133();
        let bytes = TLSHandshakeBuilder::build_client_hello(&spec, "www.google.com");
        assert!(bytes.len() > 200);
    }
}
