//! rustls 配置工具（供 HTTP/1/2/3 复用）
//!
//! 目标：
//! - 单一入口构建 root store
//! - 单一入口应用 verify_tls（可选禁用校验，仅用于调试/内网）
//! - 单一入口把一个 [`ClientHelloSpec`] 尽量映射为 rustls 能接受的
//!   cipher suite / kx group / protocol version 子集（扩展重排/GREASE 注入
//!   需要 forked rustls 的 `ClientHelloCustomizer` hook，见
//!   `rustls_client_hello_customizer`，只有那部分逻辑才需要
//!   `rustls-client-hello-customizer` feature）

#![cfg(any(feature = "rustls-tls", feature = "http2", feature = "http3"))]

#[cfg(feature = "dangerous_configuration")]
use std::sync::Arc;

use crate::dicttls::supported_groups;
use crate::error::HandshakeFailureReason;
use crate::tls_config::{is_grease_value, ClientHelloSpec, VERSION_TLS12, VERSION_TLS13};
use crate::tls_extensions::{KeyShareExtension, SupportedCurvesExtension, SupportedVersionsExtension};

/// 构建 rustls 根证书存储（Mozilla roots）
pub fn build_root_store() -> rustls::RootCertStore {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
        rustls::OwnedTrustAnchor::from_subject_spki_name_constraints(
            ta.subject,
            ta.spki,
            ta.name_constraints,
        )
    }));
    root_store
}

/// 若 verify_tls=false，则安装"接受所有证书"的 verifier（危险功能，仅用于调试）
#[allow(unused_variables)]
pub fn apply_verify_tls(cfg: &mut rustls::ClientConfig, verify_tls: bool) {
    if verify_tls {
        return;
    }

    // 注意：rustls 0.21 的 API 可能不同
    // 如果 verify_tls=false，使用 dangerous 配置接受所有证书
    // 这需要 rustls 的 dangerous_configuration feature
    #[cfg(feature = "dangerous_configuration")]
    {
        use rustls::client::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
        use rustls::{Certificate, Error as RustlsError, ServerName};
        use std::time::SystemTime;

        #[derive(Debug)]
        struct NoCertificateVerification;

        impl ServerCertVerifier for NoCertificateVerification {
            fn verify_server_cert(
                &self,
                _end_entity: &Certificate,
                _intermediates: &[Certificate],
                _server_name: &ServerName,
                _scts: &mut dyn Iterator<Item = &[u8]>,
                _ocsp_response: &[u8],
                _now: SystemTime,
            ) -> std::result::Result<ServerCertVerified, RustlsError> {
                Ok(ServerCertVerified::assertion())
            }

            fn verify_tls12_signature(
                &self,
                _message: &[u8],
                _cert: &Certificate,
                _dss: &rustls::DigitallySignedStruct,
            ) -> std::result::Result<HandshakeSignatureValid, RustlsError> {
                Ok(HandshakeSignatureValid::assertion())
            }

            fn verify_tls13_signature(
                &self,
                _message: &[u8],
                _cert: &Certificate,
                _dss: &rustls::DigitallySignedStruct,
            ) -> std::result::Result<HandshakeSignatureValid, RustlsError> {
                Ok(HandshakeSignatureValid::assertion())
            }
        }

        cfg.dangerous()
            .set_certificate_verifier(Arc::new(NoCertificateVerification));
    }

    #[cfg(not(feature = "dangerous_configuration"))]
    {
        // 如果没有 dangerous_configuration feature，忽略 verify_tls=false 的设置
        // 始终验证证书（更安全）
        eprintln!("警告: verify_tls=false 需要 dangerous_configuration feature，已忽略");
    }
}

/// 从 `ClientHelloSpec` 提取"可用于 rustls builder"的参数
/// （cipher suites / kx groups / versions），按 spec 中出现的顺序。
///
/// 不依赖 forked rustls：只用 mainline `rustls::ClientConfig::builder()
/// .with_cipher_suites().with_kx_groups().with_protocol_versions()`。
/// 扩展编码顺序重排/GREASE 注入需要 `ClientHelloCustomizer` hook，见
/// `rustls_client_hello_customizer::ProfileClientHelloCustomizer`。
#[derive(Debug, Clone)]
pub struct ProfileClientHelloParams {
    pub cipher_suite_ids: Vec<u16>,
    pub kx_group_ids: Vec<u16>,
    pub versions: Vec<u16>,
}

impl ProfileClientHelloParams {
    pub fn from_spec(spec: &ClientHelloSpec) -> Self {
        let cipher_suite_ids = spec
            .cipher_suites
            .iter()
            .copied()
            .filter(|id| !is_grease_value(*id))
            .collect::<Vec<_>>();

        let mut kx_group_ids: Vec<u16> = Vec::new();
        let mut versions: Vec<u16> = Vec::new();

        for ext in &spec.extensions {
            if let Some(sc) = ext.as_any().downcast_ref::<SupportedCurvesExtension>() {
                kx_group_ids.extend(sc.curves.iter().copied().filter(|id| !is_grease_value(*id)));
            } else if let Some(ks) = ext.as_any().downcast_ref::<KeyShareExtension>() {
                for k in &ks.key_shares {
                    if !is_grease_value(k.group) {
                        kx_group_ids.push(k.group);
                    }
                }
            } else if let Some(sv) = ext.as_any().downcast_ref::<SupportedVersionsExtension>() {
                versions.extend(sv.versions.iter().copied().filter(|id| !is_grease_value(*id)));
            }
        }

        fn dedup_keep_order(v: &mut Vec<u16>) {
            let mut out = Vec::with_capacity(v.len());
            for x in v.drain(..) {
                if !out.contains(&x) {
                    out.push(x);
                }
            }
            *v = out;
        }

        dedup_keep_order(&mut kx_group_ids);
        dedup_keep_order(&mut versions);

        if versions.is_empty() {
            if spec.tls_vers_max >= VERSION_TLS13 && spec.tls_vers_min <= VERSION_TLS13 {
                versions.push(VERSION_TLS13);
            }
            if spec.tls_vers_max >= VERSION_TLS12 && spec.tls_vers_min <= VERSION_TLS12 {
                versions.push(VERSION_TLS12);
            }
        }

        if kx_group_ids.is_empty() {
            kx_group_ids = vec![
                supported_groups::X25519,
                supported_groups::CURVE_P256,
                supported_groups::CURVE_P384,
            ];
        }

        Self { cipher_suite_ids, kx_group_ids, versions }
    }

    /// 只保留 TLS 1.2，用于 TLS 1.3 握手失败后的降级重试（§4.3）。
    pub fn restricted_to_tls12(&self) -> Self {
        Self {
            cipher_suite_ids: self.cipher_suite_ids.clone(),
            kx_group_ids: self.kx_group_ids.clone(),
            versions: vec![VERSION_TLS12],
        }
    }
}

/// 构建 rustls::ClientConfig，并设置 ALPN/verify_tls。
///
/// `spec` 为 `None` 时退回安全默认值；为 `Some` 时尽量把密码套件/密钥交换组/
/// 协议版本收窄到 spec 要求的子集，取不到合法组合时同样退回默认值。
pub fn build_client_config(
    verify_tls: bool,
    alpn_protocols: Vec<Vec<u8>>,
    spec: Option<&ClientHelloSpec>,
) -> rustls::ClientConfig {
    let fallback = || {
        rustls::ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(build_root_store())
            .with_no_client_auth()
    };

    let mut cfg = match spec {
        Some(spec) => {
            let params = ProfileClientHelloParams::from_spec(spec);
            try_build_config_from_params(&params).unwrap_or_else(|_| fallback())
        }
        None => fallback(),
    };

    cfg.alpn_protocols = alpn_protocols;
    apply_verify_tls(&mut cfg, verify_tls);
    cfg
}

/// 和 [`build_client_config`] 一样，但只接受 TLS 1.2，用于握手失败重试。
pub fn build_client_config_tls12_fallback(
    verify_tls: bool,
    alpn_protocols: Vec<Vec<u8>>,
    spec: Option<&ClientHelloSpec>,
) -> rustls::ClientConfig {
    let params = spec.map(|s| ProfileClientHelloParams::from_spec(s).restricted_to_tls12());
    let mut cfg = match params.as_ref().and_then(|p| try_build_config_from_params(p).ok()) {
        Some(cfg) => cfg,
        None => {
            let root_store = build_root_store();
            rustls::ClientConfig::builder()
                .with_cipher_suites(rustls::ALL_CIPHER_SUITES)
                .with_kx_groups(&[&rustls::kx_group::X25519, &rustls::kx_group::SECP256R1])
                .with_protocol_versions(&[&rustls::version::TLS12])
                .unwrap_or_else(|_| rustls::ClientConfig::builder().with_safe_defaults())
                .with_root_certificates(root_store)
                .with_no_client_auth()
        }
    };
    cfg.alpn_protocols = alpn_protocols;
    apply_verify_tls(&mut cfg, verify_tls);
    cfg
}

fn try_build_config_from_params(params: &ProfileClientHelloParams) -> Result<rustls::ClientConfig, ()> {
    fn cipher_suite_id(s: rustls::CipherSuite) -> u16 {
        s.get_u16()
    }

    let mut cipher_suites: Vec<rustls::SupportedCipherSuite> = Vec::new();
    for id in params.cipher_suite_ids.iter().copied() {
        if let Some(cs) =
            rustls::ALL_CIPHER_SUITES.iter().copied().find(|cs| cipher_suite_id(cs.suite()) == id)
        {
            cipher_suites.push(cs);
        }
    }
    if cipher_suites.is_empty() {
        return Err(());
    }

    let mut kx_groups: Vec<&'static rustls::SupportedKxGroup> = Vec::new();
    let mut seen_kx_group_ids: Vec<u16> = Vec::new();
    for id in &params.kx_group_ids {
        let g = match *id {
            supported_groups::X25519 => Some(&rustls::kx_group::X25519),
            supported_groups::CURVE_P256 => Some(&rustls::kx_group::SECP256R1),
            supported_groups::CURVE_P384 => Some(&rustls::kx_group::SECP384R1),
            _ => None, // rustls 0.21 不支持的 group（例如 X25519MLKEM768/SECP521R1）直接跳过
        };
        if let Some(g) = g {
            if !seen_kx_group_ids.contains(id) {
                kx_groups.push(g);
                seen_kx_group_ids.push(*id);
            }
        }
    }
    if kx_groups.is_empty() {
        return Err(());
    }

    let mut versions: Vec<&'static rustls::SupportedProtocolVersion> = Vec::new();
    for v in &params.versions {
        let vv = match *v {
            VERSION_TLS13 => Some(&rustls::version::TLS13),
            VERSION_TLS12 => Some(&rustls::version::TLS12),
            _ => None,
        };
        if let Some(vv) = vv {
            if !versions.contains(&vv) {
                versions.push(vv);
            }
        }
    }
    if versions.is_empty() {
        versions.push(&rustls::version::TLS13);
        versions.push(&rustls::version::TLS12);
    }

    let builder = rustls::ClientConfig::builder()
        .with_cipher_suites(&cipher_suites)
        .with_kx_groups(&kx_groups)
        .with_protocol_versions(&versions)
        .map_err(|_| ())?;

    Ok(builder.with_root_certificates(build_root_store()).with_no_client_auth())
}

/// 把一次握手失败的 `rustls::Error` 归类为重试策略可以匹配的原因（§4.3），
/// 按变体匹配而不是匹配错误信息字符串。
pub fn classify_handshake_error(err: &rustls::Error) -> HandshakeFailureReason {
    match err {
        rustls::Error::PeerIncompatibleError(_) => HandshakeFailureReason::UnsupportedCurve,
        rustls::Error::AlertReceived(alert) => match alert {
            rustls::AlertDescription::ProtocolVersion => HandshakeFailureReason::ProtocolVersionAlert,
            rustls::AlertDescription::HandshakeFailure
            | rustls::AlertDescription::InsufficientSecurity => HandshakeFailureReason::UnsupportedCurve,
            rustls::AlertDescription::NoApplicationProtocol => HandshakeFailureReason::AlpnRejected,
            _ => HandshakeFailureReason::Other,
        },
        _ => HandshakeFailureReason::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_peer_incompatible_as_unsupported_curve() {
        let err = rustls::Error::PeerIncompatibleError(rustls::PeerIncompatible::NoKxGroupsInCommon);
        assert_eq!(classify_handshake_error(&err), HandshakeFailureReason::UnsupportedCurve);
    }

    #[test]
    fn classifies_protocol_version_alert() {
        let err = rustls::Error::AlertReceived(rustls::AlertDescription::ProtocolVersion);
        assert_eq!(classify_handshake_error(&err), HandshakeFailureReason::ProtocolVersionAlert);
    }

    #[test]
    fn params_from_chrome_spec_are_non_empty() {
        let spec = crate::tls_config::ClientHelloSpec::chrome_133();
        let params = ProfileClientHelloParams::from_spec(&spec);
        assert!(!params.cipher_suite_ids.is_empty());
        assert!(!params.kx_group_ids.is_empty());
    }
}
