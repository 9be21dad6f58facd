//! 指纹解析器：JA3/JA4R/HTTP2/QUIC 字符串与浏览器 profile 包的统一入口
//!
//! 把任意组合的指纹输入规范化为一个不可变的 [`TransportSpec`]。

pub mod connection_key;
pub mod http2_fp;
pub mod ja3;
pub mod profile;
pub mod quic_fp;
pub mod transport_spec;

pub use connection_key::ConnectionKey;

use crate::error::EngineError;
use crate::tls_config::ja4::parse_ja4r;
use ja3::parse_ja3;
use transport_spec::{BrowserProfile, ExtensionSlot, TransportSpec};

/// 把 JA3、可选的 JA4R、可选的 HTTP/2 指纹、可选的 QUIC 指纹合并为一个
/// [`TransportSpec`]。当 JA4R 存在时，它决定密码套件/扩展的顺序与签名算法
/// 内容；JA3 仅补充缺失的 supported_groups/ec_point_formats。
pub fn parse_transport_spec(
    ja3: &str,
    ja4r: Option<&str>,
    http2_fingerprint: Option<&str>,
    quic_fingerprint: Option<&str>,
    disable_grease: bool,
) -> Result<TransportSpec, EngineError> {
    let ja3_components = parse_ja3(ja3)?;

    let mut spec = TransportSpec::new();
    spec.tls_version_min = 0x0301;
    spec.tls_version_max = ja3_components.tls_version;
    spec.supported_groups = ja3_components.supported_groups;
    spec.ec_point_formats = ja3_components.ec_point_formats;
    spec.key_share_groups = crate::tls_config::filter_grease_values(&spec.supported_groups)
        .into_iter()
        .take(2)
        .collect();
    spec.disable_grease = disable_grease;

    match ja4r {
        Some(raw) => {
            let parsed = parse_ja4r(raw)?;
            spec.tls_version_max = parsed.version.to_u16();
            spec.cipher_suites = parsed.cipher_suites;
            spec.extensions = parsed
                .extensions
                .into_iter()
                .map(|id| ExtensionSlot { id, payload: Vec::new(), is_grease: false })
                .collect();
            spec.signature_algorithms = parsed.signature_algorithms;
        }
        None => {
            spec.cipher_suites = ja3_components.ciphers;
            spec.extensions = ja3_components
                .extensions
                .into_iter()
                .map(|id| ExtensionSlot { id, payload: Vec::new(), is_grease: false })
                .collect();
        }
    }

    if let Some(raw) = http2_fingerprint {
        spec.http2 = Some(http2_fp::parse_http2_fingerprint(raw)?);
    }

    if let Some(raw) = quic_fingerprint {
        let split = quic_fp::split_quic_fingerprint(raw)?;
        spec.quic = Some(transport_spec::QuicSpec {
            version: 1,
            initial_packet_params: split.fields.join("|").into_bytes(),
            transport_parameters: Default::default(),
        });
    }

    validate_coherence(&spec)?;
    Ok(spec)
}

/// 解析一个 [`BrowserProfile`] 为 `TransportSpec`；`user_agent`/`header_order`
/// 不参与 TransportSpec 本身，由调用方作为请求层默认值附加。
pub fn resolve_profile(profile: &BrowserProfile) -> Result<TransportSpec, EngineError> {
    let mut spec = parse_transport_spec(
        &profile.ja3,
        profile.ja4r.as_deref(),
        profile.http2_fingerprint.as_deref(),
        profile.quic_fingerprint.as_deref(),
        profile.disable_grease,
    )?;

    if spec.quic.is_none() && profile.quic_fingerprint.is_none() {
        if let Ok(derived) = quic_fp::derive_from_profile(&profile.name) {
            spec.quic = Some(derived);
        }
    }

    Ok(spec)
}

/// 校验一个已解析的 spec 内部不自相矛盾（例如仅含 TLS 1.3 专属密码套件却
/// 把最高版本限制在 1.2）。
fn validate_coherence(spec: &TransportSpec) -> Result<(), EngineError> {
    const TLS13_ONLY_SUITES: [u16; 3] = [0x1301, 0x1302, 0x1303];
    if spec.tls_version_max < 0x0304
        && spec.cipher_suites.iter().all(|c| TLS13_ONLY_SUITES.contains(c))
        && !spec.cipher_suites.is_empty()
    {
        return Err(EngineError::SpecIncoherent {
            detail: "cipher suite list is TLS 1.3-only but max TLS version is below 1.3".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ja3_only_spec() {
        let spec = parse_transport_spec(
            "771,4865-4866-4867-49195-49199,0-23-65281-10-11,29-23-24,0",
            None,
            None,
            None,
            false,
        )
        .unwrap();
        assert_eq!(spec.cipher_suites, vec![4865, 4866, 4867, 49195, 49199]);
        assert_eq!(spec.supported_groups, vec![29, 23, 24]);
    }

    #[test]
    fn ja4r_wins_over_ja3_for_cipher_order() {
        let spec = parse_transport_spec(
            "771,4865-4866-4867-49195-49199,0-23-65281-10-11,29-23-24,0",
            Some("t13d0302h2_1301,1303,1302_0000,0023_0403"),
            None,
            None,
            false,
        )
        .unwrap();
        assert_eq!(spec.cipher_suites, vec![0x1301, 0x1303, 0x1302]);
    }

    #[test]
    fn rejects_incoherent_tls13_only_cipher_below_tls13_max() {
        let err = parse_transport_spec(
            "770,4865,0,29,0",
            None,
            None,
            None,
            false,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "SpecIncoherent");
    }
}
