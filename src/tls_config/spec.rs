//! ClientHelloSpec：TLS Client Hello 的结构化描述
//!
//! 对应 Go utls 的 `tls.ClientHelloSpec`：密码套件、扩展（有序、trait 对象、
//! 带内容）、最高/最低版本。这是 TLS Synthesizer 的工作类型，由
//! `fingerprint::transport_spec::TransportSpec` 转换而来。

use crate::dicttls::{
    cipher_suites::{self as cs, GREASE_PLACEHOLDER as GREASE_CS},
    signature_schemes::{
        ECDSA_WITH_P256_AND_SHA256, ECDSA_WITH_P384_AND_SHA384, PKCS1_WITH_SHA256,
        PKCS1_WITH_SHA384, PKCS1_WITH_SHA512, PSS_WITH_SHA256, PSS_WITH_SHA384, PSS_WITH_SHA512,
    },
    supported_groups::{
        CURVE_P256, CURVE_P384, GREASE_PLACEHOLDER as GREASE_SG, SECP521R1, X25519,
        X25519_MLKEM768,
    },
};
use crate::tls_config::metadata::SpecMetadata;
use crate::tls_extensions::{
    ALPNExtension, ApplicationSettingsExtensionNew, ExtendedMasterSecretExtension,
    GREASEEncryptedClientHelloExtension, KeyShare, KeyShareExtension, PSKKeyExchangeModesExtension,
    RenegotiationInfoExtension, SCTExtension, SNIExtension, SessionTicketExtension,
    SignatureAlgorithmsExtension, StatusRequestExtension, SupportedCurvesExtension,
    SupportedPointsExtension, SupportedVersionsExtension, TLSExtension, UtlsCompressCertExtension,
    UtlsGREASEExtension, UtlsPaddingExtension,
};

pub use crate::dicttls::extensions::{
    CERT_COMPRESSION_BROTLI, COMPRESSION_NONE, POINT_FORMAT_UNCOMPRESSED, PSK_MODE_DHE,
    RENEGOTIATE_ONCE_AS_CLIENT, VERSION_TLS10, VERSION_TLS11, VERSION_TLS12, VERSION_TLS13,
};

pub type CipherSuiteID = u16;

/// TLS ClientHello 的结构化描述
pub struct ClientHelloSpec {
    pub cipher_suites: Vec<CipherSuiteID>,
    pub compression_methods: Vec<u8>,
    pub extensions: Vec<Box<dyn TLSExtension>>,
    pub tls_vers_min: u16,
    pub tls_vers_max: u16,
    /// 构建期记录的扩展内部数据（SNI、ALPN...），供提取签名时使用，
    /// 因为 `extensions` 一旦装箱成 trait 对象就无法再批量遍历具体字段
    pub metadata: Option<SpecMetadata>,
}

impl std::fmt::Debug for ClientHelloSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHelloSpec")
            .field("cipher_suites", &self.cipher_suites)
            .field("compression_methods", &self.compression_methods)
            .field("extensions", &self.extensions.iter().map(|e| e.extension_id()).collect::<Vec<_>>())
            .field("tls_vers_min", &self.tls_vers_min)
            .field("tls_vers_max", &self.tls_vers_max)
            .finish()
    }
}

impl Clone for ClientHelloSpec {
    fn clone(&self) -> Self {
        // trait 对象不能批量 clone，重新按扩展号生成空壳后没有意义，
        // 调用方若需要克隆应重新走 builder；这里只保留标量字段
        Self {
            cipher_suites: self.cipher_suites.clone(),
            compression_methods: self.compression_methods.clone(),
            extensions: Vec::new(),
            tls_vers_min: self.tls_vers_min,
            tls_vers_max: self.tls_vers_max,
            metadata: self.metadata.clone(),
        }
    }
}

fn chrome_signature_algorithms() -> Vec<u16> {
    vec![
        ECDSA_WITH_P256_AND_SHA256,
        PSS_WITH_SHA256,
        PKCS1_WITH_SHA256,
        ECDSA_WITH_P384_AND_SHA384,
        PSS_WITH_SHA384,
        PKCS1_WITH_SHA384,
        PSS_WITH_SHA512,
        PKCS1_WITH_SHA512,
    ]
}

impl ClientHelloSpec {
    pub fn new() -> Self {
        Self {
            cipher_suites: Vec::new(),
            compression_methods: vec![COMPRESSION_NONE],
            extensions: Vec::new(),
            tls_vers_min: VERSION_TLS12,
            tls_vers_max: VERSION_TLS13,
            metadata: None,
        }
    }

    /// Chrome 103：最后一代不含后量子 KeyShare、不含 h3 的 Chrome 指纹
    pub fn chrome_103() -> Self {
        let cipher_suites = vec![
            GREASE_CS,
            cs::TLS_AES_128_GCM_SHA256,
            cs::TLS_AES_256_GCM_SHA384,
            cs::TLS_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
            cs::TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA,
            cs::TLS_RSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_RSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_RSA_WITH_AES_128_CBC_SHA,
            cs::TLS_RSA_WITH_AES_256_CBC_SHA,
        ];

        let elliptic_curves = vec![GREASE_SG, X25519, CURVE_P256, CURVE_P384];
        let signature_algorithms = chrome_signature_algorithms();
        let alpn_protocols = vec!["h2".to_string(), "http/1.1".to_string()];
        let key_shares = vec![
            KeyShare { group: GREASE_SG, data: vec![0] },
            KeyShare { group: X25519, data: Vec::new() },
        ];

        let mut metadata = SpecMetadata::new();
        metadata.set_alpn(alpn_protocols.clone());
        metadata.set_elliptic_curves(elliptic_curves.clone());
        metadata.set_elliptic_curve_point_formats(vec![POINT_FORMAT_UNCOMPRESSED]);
        metadata.set_signature_algorithms(signature_algorithms.clone());
        metadata.set_supported_versions(vec![VERSION_TLS13, VERSION_TLS12]);

        let extensions: Vec<Box<dyn TLSExtension>> = vec![
            Box::new(UtlsGREASEExtension::new()),
            Box::new(SNIExtension::new(String::new())),
            Box::new(ExtendedMasterSecretExtension),
            Box::new(RenegotiationInfoExtension::new(RENEGOTIATE_ONCE_AS_CLIENT)),
            Box::new(SupportedCurvesExtension::new(elliptic_curves.clone())),
            Box::new(SupportedPointsExtension::new(vec![POINT_FORMAT_UNCOMPRESSED])),
            Box::new(SessionTicketExtension),
            Box::new(ALPNExtension::new(alpn_protocols.clone())),
            Box::new(StatusRequestExtension),
            Box::new(SignatureAlgorithmsExtension::new(signature_algorithms.clone())),
            Box::new(SCTExtension),
            Box::new(KeyShareExtension::new(key_shares)),
            Box::new(PSKKeyExchangeModesExtension::new(vec![PSK_MODE_DHE])),
            Box::new(SupportedVersionsExtension::new(vec![GREASE_SG, VERSION_TLS13, VERSION_TLS12])),
            Box::new(UtlsCompressCertExtension::new(vec![CERT_COMPRESSION_BROTLI])),
            Box::new(ApplicationSettingsExtensionNew::new(vec!["h2".to_string()])),
            Box::new(GREASEEncryptedClientHelloExtension::new()),
            Box::new(UtlsGREASEExtension::new()),
            Box::new(UtlsPaddingExtension::new()),
        ];

        Self {
            cipher_suites,
            compression_methods: vec![COMPRESSION_NONE],
            extensions,
            tls_vers_min: VERSION_TLS12,
            tls_vers_max: VERSION_TLS13,
            metadata: Some(metadata),
        }
    }

    /// Chrome 133：在 103 基础上加入 X25519MLKEM768 混合 KeyShare 与 h3 ALPN
    pub fn chrome_133() -> Self {
        let cipher_suites = vec![
            GREASE_CS,
            cs::TLS_AES_128_GCM_SHA256,
            cs::TLS_AES_256_GCM_SHA384,
            cs::TLS_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
            cs::TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA,
            cs::TLS_RSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_RSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_RSA_WITH_AES_128_CBC_SHA,
            cs::TLS_RSA_WITH_AES_256_CBC_SHA,
        ];

        let elliptic_curves = vec![GREASE_SG, X25519_MLKEM768, X25519, CURVE_P256, CURVE_P384];
        let signature_algorithms = chrome_signature_algorithms();
        let alpn_protocols = vec!["h3".to_string(), "h2".to_string(), "http/1.1".to_string()];
        let key_shares = vec![
            KeyShare { group: GREASE_SG, data: vec![0] },
            KeyShare { group: X25519_MLKEM768, data: Vec::new() },
            KeyShare { group: X25519, data: Vec::new() },
        ];

        let mut metadata = SpecMetadata::new();
        metadata.set_alpn(alpn_protocols.clone());
        metadata.set_elliptic_curves(elliptic_curves.clone());
        metadata.set_elliptic_curve_point_formats(vec![POINT_FORMAT_UNCOMPRESSED]);
        metadata.set_signature_algorithms(signature_algorithms.clone());
        metadata.set_supported_versions(vec![VERSION_TLS13, VERSION_TLS12]);

        let extensions: Vec<Box<dyn TLSExtension>> = vec![
            Box::new(UtlsGREASEExtension::new()),
            Box::new(SNIExtension::new(String::new())),
            Box::new(ExtendedMasterSecretExtension),
            Box::new(RenegotiationInfoExtension::new(RENEGOTIATE_ONCE_AS_CLIENT)),
            Box::new(SupportedCurvesExtension::new(elliptic_curves.clone())),
            Box::new(SupportedPointsExtension::new(vec![POINT_FORMAT_UNCOMPRESSED])),
            Box::new(SessionTicketExtension),
            Box::new(ALPNExtension::new(alpn_protocols.clone())),
            Box::new(StatusRequestExtension),
            Box::new(SignatureAlgorithmsExtension::new(signature_algorithms.clone())),
            Box::new(SCTExtension),
            Box::new(KeyShareExtension::new(key_shares)),
            Box::new(PSKKeyExchangeModesExtension::new(vec![PSK_MODE_DHE])),
            Box::new(SupportedVersionsExtension::new(vec![GREASE_SG, VERSION_TLS13, VERSION_TLS12])),
            Box::new(UtlsCompressCertExtension::new(vec![CERT_COMPRESSION_BROTLI])),
            Box::new(ApplicationSettingsExtensionNew::new(vec!["h3".to_string(), "h2".to_string()])),
            Box::new(GREASEEncryptedClientHelloExtension::new()),
            Box::new(UtlsGREASEExtension::new()),
            Box::new(UtlsPaddingExtension::new()),
        ];

        Self {
            cipher_suites,
            compression_methods: vec![COMPRESSION_NONE],
            extensions,
            tls_vers_min: VERSION_TLS12,
            tls_vers_max: VERSION_TLS13,
            metadata: Some(metadata),
        }
    }

    pub fn firefox_133() -> Self {
        let cipher_suites = vec![
            cs::TLS_AES_256_GCM_SHA384,
            cs::TLS_AES_128_GCM_SHA256,
            cs::TLS_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
        ];

        let elliptic_curves = vec![CURVE_P256, CURVE_P384, SECP521R1, X25519];
        let signature_algorithms = vec![
            PSS_WITH_SHA256,
            PSS_WITH_SHA384,
            PSS_WITH_SHA512,
            PKCS1_WITH_SHA256,
            PKCS1_WITH_SHA384,
            PKCS1_WITH_SHA512,
            ECDSA_WITH_P256_AND_SHA256,
            ECDSA_WITH_P384_AND_SHA384,
            crate::dicttls::signature_schemes::ECDSA_WITH_P521_AND_SHA512,
        ];
        let alpn_protocols = vec!["h2".to_string(), "http/1.1".to_string()];

        let mut metadata = SpecMetadata::new();
        metadata.set_alpn(alpn_protocols.clone());
        metadata.set_elliptic_curves(elliptic_curves.clone());
        metadata.set_elliptic_curve_point_formats(vec![POINT_FORMAT_UNCOMPRESSED]);
        metadata.set_signature_algorithms(signature_algorithms.clone());
        metadata.set_supported_versions(vec![VERSION_TLS13]);

        let extensions: Vec<Box<dyn TLSExtension>> = vec![
            Box::new(SupportedCurvesExtension::new(elliptic_curves.clone())),
            Box::new(SupportedPointsExtension::new(vec![POINT_FORMAT_UNCOMPRESSED])),
            Box::new(SignatureAlgorithmsExtension::new(signature_algorithms.clone())),
            Box::new(ALPNExtension::new(alpn_protocols.clone())),
            Box::new(ExtendedMasterSecretExtension),
            Box::new(SupportedVersionsExtension::new(vec![VERSION_TLS13])),
        ];

        Self {
            cipher_suites,
            compression_methods: vec![COMPRESSION_NONE],
            extensions,
            tls_vers_min: VERSION_TLS12,
            tls_vers_max: VERSION_TLS13,
            metadata: Some(metadata),
        }
    }

    pub fn safari_16_0() -> Self {
        let cipher_suites = vec![
            cs::TLS_AES_128_GCM_SHA256,
            cs::TLS_AES_256_GCM_SHA384,
            cs::TLS_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
        ];

        let elliptic_curves = vec![CURVE_P256, CURVE_P384, X25519];
        let signature_algorithms = vec![
            PKCS1_WITH_SHA256,
            PKCS1_WITH_SHA384,
            PKCS1_WITH_SHA512,
            ECDSA_WITH_P256_AND_SHA256,
            ECDSA_WITH_P384_AND_SHA384,
        ];
        let alpn_protocols = vec!["h2".to_string(), "http/1.1".to_string()];

        let mut metadata = SpecMetadata::new();
        metadata.set_alpn(alpn_protocols.clone());
        metadata.set_elliptic_curves(elliptic_curves.clone());
        metadata.set_elliptic_curve_point_formats(vec![POINT_FORMAT_UNCOMPRESSED]);
        metadata.set_signature_algorithms(signature_algorithms.clone());
        metadata.set_supported_versions(vec![VERSION_TLS13]);

        let extensions: Vec<Box<dyn TLSExtension>> = vec![
            Box::new(SupportedCurvesExtension::new(elliptic_curves.clone())),
            Box::new(SupportedPointsExtension::new(vec![POINT_FORMAT_UNCOMPRESSED])),
            Box::new(SignatureAlgorithmsExtension::new(signature_algorithms.clone())),
            Box::new(ALPNExtension::new(alpn_protocols.clone())),
            Box::new(SupportedVersionsExtension::new(vec![VERSION_TLS13])),
        ];

        Self {
            cipher_suites,
            compression_methods: vec![COMPRESSION_NONE],
            extensions,
            tls_vers_min: VERSION_TLS12,
            tls_vers_max: VERSION_TLS13,
            metadata: Some(metadata),
        }
    }
}

impl Default for ClientHelloSpec {
    fn default() -> Self {
        Self::chrome_133()
    }
}

pub fn chrome_103_spec() -> Result<ClientHelloSpec, String> {
    Ok(ClientHelloSpec::chrome_103())
}

pub fn chrome_133_spec() -> Result<ClientHelloSpec, String> {
    Ok(ClientHelloSpec::chrome_133())
}

pub fn firefox_133_spec() -> Result<ClientHelloSpec, String> {
    Ok(ClientHelloSpec::firefox_133())
}

pub fn safari_16_0_spec() -> Result<ClientHelloSpec, String> {
    Ok(ClientHelloSpec::safari_16_0())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_133_has_h3_alpn_first() {
        let spec = ClientHelloSpec::chrome_133();
        assert_eq!(spec.metadata.unwrap().get_alpn().unwrap()[0], "h3");
    }

    #[test]
    fn firefox_has_no_grease() {
        let spec = ClientHelloSpec::firefox_133();
        assert!(!spec.cipher_suites.contains(&GREASE_CS));
    }

    #[test]
    fn chrome_133_extensions_end_with_padding() {
        let spec = ClientHelloSpec::chrome_133();
        let last = spec.extensions.last().unwrap();
        assert_eq!(last.extension_id(), crate::dicttls::extensions::EXT_TYPE_PADDING);
    }
}
