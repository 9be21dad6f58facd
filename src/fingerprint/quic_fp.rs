//! QUIC 指纹：对解析器不透明，仅做字段切分；浏览器→QUIC 规格的映射
//! 通过一张精选表完成，不对任意 JA4R 做启发式推断。

use crate::error::EngineError;
use crate::fingerprint::transport_spec::QuicSpec;
use std::collections::HashMap;

/// 把 QUIC 指纹字符串切分成 uQUIC 兼容的字段，不解释其含义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuicFingerprint {
    pub fields: Vec<String>,
}

/// 按 `|` 切分 QUIC 指纹字符串。字段内容对解析器不透明，交给引擎直接消费。
pub fn split_quic_fingerprint(input: &str) -> Result<RawQuicFingerprint, EngineError> {
    if input.is_empty() {
        return Err(EngineError::FingerprintParseError {
            field: "quic_fingerprint".to_string(),
            position: 0,
            reason: "empty QUIC fingerprint string".to_string(),
        });
    }
    Ok(RawQuicFingerprint { fields: input.split('|').map(str::to_string).collect() })
}

/// 已知浏览器 profile 对应的 QUIC 规格，用于在请求只提供 JA4R 而未提供
/// 显式 `quic_fingerprint` 时派生 HTTP/3 Initial 包参数。
fn known_quic_profiles() -> &'static HashMap<&'static str, QuicSpec> {
    static TABLE: std::sync::OnceLock<HashMap<&'static str, QuicSpec>> = std::sync::OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = HashMap::new();
        map.insert(
            "chrome_133",
            QuicSpec {
                version: 0x0000_0001, // QUIC v1 (RFC 9000)
                initial_packet_params: vec![0x01],
                transport_parameters: HashMap::from([
                    (0x03, 15_000_000u32.to_be_bytes().to_vec()), // initial_max_data
                    (0x0f, 100u32.to_be_bytes().to_vec()),        // initial_max_streams_bidi
                ]),
            },
        );
        map.insert(
            "firefox_133",
            QuicSpec {
                version: 0x0000_0001,
                initial_packet_params: vec![0x01],
                transport_parameters: HashMap::from([
                    (0x03, 10_485_760u32.to_be_bytes().to_vec()),
                    (0x0f, 100u32.to_be_bytes().to_vec()),
                ]),
            },
        );
        map
    })
}

/// 按浏览器 profile 名称查表得到 QUIC 规格；未命中已知 profile 时返回
/// `SpecIncoherent`，绝不对任意输入猜测传输参数。
pub fn derive_from_profile(profile_name: &str) -> Result<QuicSpec, EngineError> {
    known_quic_profiles()
        .get(profile_name)
        .cloned()
        .ok_or_else(|| EngineError::SpecIncoherent {
            detail: format!(
                "no curated QUIC fingerprint for profile `{profile_name}`; supply an explicit quic_fingerprint"
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_opaque_fields() {
        let parsed = split_quic_fingerprint("1|01|abcd").unwrap();
        assert_eq!(parsed.fields, vec!["1", "01", "abcd"]);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(split_quic_fingerprint("").is_err());
    }

    #[test]
    fn derives_known_profile() {
        let spec = derive_from_profile("chrome_133").unwrap();
        assert_eq!(spec.version, 1);
    }

    #[test]
    fn unknown_profile_is_spec_incoherent() {
        let err = derive_from_profile("unknown_browser_9000").unwrap_err();
        assert_eq!(err.kind(), "SpecIncoherent");
    }
}
