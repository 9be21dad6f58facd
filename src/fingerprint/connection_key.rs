//! `ConnectionKey`：连接池用来判断"能否复用同一条连接"的复合键
//!
//! 两个请求只有在 host、端口、scheme、代理、以及 `TransportSpec` 完全一致时
//! 才可能共享底层连接——握手一旦完成，指纹就已经固定在那条连接上了。

use crate::fingerprint::transport_spec::TransportSpec;
use std::hash::{Hash, Hasher};

/// 连接复用的判定键
#[derive(Debug, Clone)]
pub struct ConnectionKey {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    /// 代理地址（`scheme://host:port` 形式），None 表示直连
    pub proxy: Option<String>,
    pub transport: TransportSpec,
}

impl ConnectionKey {
    pub fn new(host: impl Into<String>, port: u16, tls: bool, transport: TransportSpec) -> Self {
        Self { host: host.into(), port, tls, proxy: None, transport }
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

impl PartialEq for ConnectionKey {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host
            && self.port == other.port
            && self.tls == other.tls
            && self.proxy == other.proxy
            && self.transport == other.transport
    }
}

impl Eq for ConnectionKey {}

impl Hash for ConnectionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.port.hash(state);
        self.tls.hash(state);
        self.proxy.hash(state);
        // TransportSpec 没有派生 Hash（内部含 f64 无关字段以外都可比较），
        // 用它的 Debug 串代替结构化哈希，只影响哈希桶分布，不影响相等性判断
        format!("{:?}", self.transport).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_specs_produce_equal_keys() {
        let a = ConnectionKey::new("example.com", 443, true, TransportSpec::new());
        let b = ConnectionKey::new("example.com", 443, true, TransportSpec::new());
        assert_eq!(a, b);
    }

    #[test]
    fn different_proxy_breaks_equality() {
        let a = ConnectionKey::new("example.com", 443, true, TransportSpec::new());
        let b = a.clone().with_proxy("http://127.0.0.1:8080");
        assert_ne!(a, b);
    }

    #[test]
    fn different_transport_breaks_equality() {
        let mut spec = TransportSpec::new();
        spec.disable_grease = true;
        let a = ConnectionKey::new("example.com", 443, true, TransportSpec::new());
        let b = ConnectionKey::new("example.com", 443, true, spec);
        assert_ne!(a, b);
    }
}
