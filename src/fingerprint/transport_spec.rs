//! `TransportSpec`：由指纹解析得到的、与具体指纹库解耦的拨号描述
//!
//! 刻意不引用 `tls_config::ClientHelloSpec` 的内部类型——合成器
//! (`tls_config::builder`) 负责把它转换成真正的 ClientHello，这样
//! 未来替换合成后端时不需要改动这里。

use std::collections::HashMap;

/// 单个 TLS 扩展在 TransportSpec 层面的表示：只记录扩展号和负载，
/// 不关心具体语义（语义留给合成器）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSlot {
    pub id: u16,
    /// 空 payload 表示"按需合成"（例如 GREASE 占位符），非空表示已知负载
    pub payload: Vec<u8>,
    /// 该槽位是否为 GREASE 占位符；合成器在握手时为其随机取值
    pub is_grease: bool,
}

/// 可选的 HTTP/2 连接形状
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Http2Shape {
    /// 保持插入顺序的 SETTINGS 键值对
    pub settings: Vec<(u16, u32)>,
    /// 连接级 WINDOW_UPDATE 增量；0 表示不在默认值之外发送
    pub window_update: u32,
    /// `:method`/`:path`/`:authority`/`:scheme` 的排列顺序
    pub pseudo_header_order: Vec<String>,
    /// 流优先级：(stream_id, exclusive, depends_on, weight)
    pub priority: Option<(u32, bool, u32, u8)>,
}

/// 可选的 QUIC 规格，对解析器不透明，交给 HTTP/3 引擎直接消费
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuicSpec {
    pub version: u32,
    pub initial_packet_params: Vec<u8>,
    pub transport_parameters: HashMap<u16, Vec<u8>>,
}

/// 指纹解析后的规范化拨号描述。一旦解析完成即不可变；对同一输入重新解析
/// 必须得到结构相等的 spec（GREASE 的随机化发生在握手阶段，不在解析阶段）。
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSpec {
    pub tls_version_min: u16,
    pub tls_version_max: u16,
    pub cipher_suites: Vec<u16>,
    pub extensions: Vec<ExtensionSlot>,
    pub supported_groups: Vec<u16>,
    /// JA3 第五字段：EC point format 列表
    pub ec_point_formats: Vec<u8>,
    pub signature_algorithms: Vec<u16>,
    pub alpn: Vec<String>,
    pub key_share_groups: Vec<u16>,
    pub http2: Option<Http2Shape>,
    pub quic: Option<QuicSpec>,
    /// 为 true 时所有 GREASE 槽位均为空，用于 JA4R 的字节级精确匹配
    pub disable_grease: bool,
}

impl TransportSpec {
    pub fn new() -> Self {
        Self {
            tls_version_min: 0,
            tls_version_max: 0,
            cipher_suites: Vec::new(),
            extensions: Vec::new(),
            supported_groups: Vec::new(),
            ec_point_formats: vec![0],
            signature_algorithms: Vec::new(),
            alpn: Vec::new(),
            key_share_groups: Vec::new(),
            http2: None,
            quic: None,
            disable_grease: false,
        }
    }
}

impl Default for TransportSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// 具名指纹集合；由解析器从 JA3/JA4R/HTTP2/QUIC 字符串共同解析出
/// `TransportSpec`，`user_agent`/`header_order` 则作为请求层默认值附加，
/// 不参与 TransportSpec 本身。
#[derive(Debug, Clone, Default)]
pub struct BrowserProfile {
    pub name: String,
    pub ja3: String,
    pub ja4r: Option<String>,
    pub http2_fingerprint: Option<String>,
    pub quic_fingerprint: Option<String>,
    pub user_agent: String,
    pub header_order: Option<Vec<String>>,
    pub is_mobile: bool,
    pub disable_grease: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_has_no_optional_shapes() {
        let spec = TransportSpec::new();
        assert!(spec.http2.is_none());
        assert!(spec.quic.is_none());
        assert!(!spec.disable_grease);
    }
}
