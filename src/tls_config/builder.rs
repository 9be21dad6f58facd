//! `ClientHelloSpec` 的构建器
//!
//! 用于从解析后的 `TransportSpec`（§4.1）或手工指定的字段组装出一个
//! `ClientHelloSpec`，避免直接摆弄结构体字段。

use super::spec::{ClientHelloSpec, CERT_COMPRESSION_BROTLI};
use crate::dicttls::extensions as ext_ids;
use crate::fingerprint::transport_spec::{ExtensionSlot, TransportSpec};
use crate::tls_config::grease::is_grease_value;
use crate::tls_config::metadata::SpecMetadata;
use crate::tls_config::version::TlsVersion;
use crate::tls_extensions::{
    ALPNExtension, ApplicationSettingsExtensionNew, ExtendedMasterSecretExtension,
    GREASEEncryptedClientHelloExtension, KeyShare, KeyShareExtension, PSKKeyExchangeModesExtension,
    RenegotiationInfoExtension, SCTExtension, SNIExtension, SessionTicketExtension,
    SignatureAlgorithmsExtension, StatusRequestExtension, SupportedCurvesExtension,
    SupportedPointsExtension, SupportedVersionsExtension, TLSExtension, UtlsCompressCertExtension,
    UtlsGREASEExtension,
};

#[derive(Default)]
pub struct ClientHelloSpecBuilder {
    spec: Option<ClientHelloSpec>,
}

impl ClientHelloSpecBuilder {
    pub fn new() -> Self {
        Self { spec: Some(ClientHelloSpec::new()) }
    }

    fn spec_mut(&mut self) -> &mut ClientHelloSpec {
        self.spec.as_mut().expect("builder used after build()")
    }

    pub fn cipher_suites(mut self, suites: Vec<u16>) -> Self {
        self.spec_mut().cipher_suites = suites;
        self
    }

    pub fn compression_methods(mut self, methods: Vec<u8>) -> Self {
        self.spec_mut().compression_methods = methods;
        self
    }

    pub fn extensions(mut self, extensions: Vec<Box<dyn TLSExtension>>) -> Self {
        self.spec_mut().extensions = extensions;
        self
    }

    pub fn tls_vers_max(mut self, version: TlsVersion) -> Self {
        self.spec_mut().tls_vers_max = version.to_u16();
        self
    }

    pub fn metadata(mut self, metadata: SpecMetadata) -> Self {
        self.spec_mut().metadata = Some(metadata);
        self
    }

    /// Chrome 系列常用密码套件列表（不含 GREASE），供调用方复用
    pub fn chrome_cipher_suites() -> Vec<u16> {
        ClientHelloSpec::chrome_133()
            .cipher_suites
            .into_iter()
            .filter(|v| !is_grease_value(*v))
            .collect()
    }

    /// Chrome 系列常用签名算法列表
    pub fn chrome_signature_algorithms() -> Vec<u16> {
        ClientHelloSpec::chrome_133()
            .metadata
            .and_then(|m| m.get_signature_algorithms().cloned())
            .unwrap_or_default()
    }

    pub fn build(mut self) -> ClientHelloSpec {
        self.spec.take().expect("builder used after build()")
    }

    /// 把解析得到的 [`TransportSpec`] 转换成可供 Synthesizer 消费的
    /// `ClientHelloSpec`。扩展的相对顺序完全保留自 `transport.extensions`；
    /// 每个扩展号对应的内容从 TransportSpec 的语义字段（supported_groups、
    /// signature_algorithms、alpn、key_share_groups...）取得，因为
    /// `ExtensionSlot` 本身对解析器是不透明的占位。
    pub fn from_transport_spec(transport: &TransportSpec) -> ClientHelloSpec {
        let mut spec = ClientHelloSpec::new();
        spec.cipher_suites = transport.cipher_suites.clone();
        spec.tls_vers_max = transport.tls_version_max;
        spec.tls_vers_min = transport.tls_version_min.max(super::spec::VERSION_TLS10);

        let mut metadata = SpecMetadata::new();
        metadata.set_alpn(transport.alpn.clone());
        metadata.set_elliptic_curves(transport.supported_groups.clone());
        metadata.set_elliptic_curve_point_formats(transport.ec_point_formats.clone());
        metadata.set_signature_algorithms(transport.signature_algorithms.clone());

        spec.extensions =
            transport.extensions.iter().map(|slot| Self::slot_to_extension(slot, transport)).collect();
        spec.metadata = Some(metadata);
        spec
    }

    fn slot_to_extension(slot: &ExtensionSlot, transport: &TransportSpec) -> Box<dyn TLSExtension> {
        if slot.is_grease || is_grease_value(slot.id) {
            return Box::new(UtlsGREASEExtension::new());
        }
        match slot.id {
            ext_ids::EXT_TYPE_SERVER_NAME => Box::new(SNIExtension::new(String::new())),
            ext_ids::EXT_TYPE_STATUS_REQUEST => Box::new(StatusRequestExtension),
            ext_ids::EXT_TYPE_SUPPORTED_GROUPS => {
                Box::new(SupportedCurvesExtension::new(transport.supported_groups.clone()))
            }
            ext_ids::EXT_TYPE_EC_POINT_FORMATS => {
                Box::new(SupportedPointsExtension::new(transport.ec_point_formats.clone()))
            }
            ext_ids::EXT_TYPE_SIGNATURE_ALGORITHMS => {
                Box::new(SignatureAlgorithmsExtension::new(transport.signature_algorithms.clone()))
            }
            ext_ids::EXT_TYPE_APPLICATION_LAYER_PROTOCOL_NEGOTIATION => {
                Box::new(ALPNExtension::new(transport.alpn.clone()))
            }
            ext_ids::EXT_TYPE_EXTENDED_MASTER_SECRET => Box::new(ExtendedMasterSecretExtension),
            ext_ids::EXT_TYPE_SESSION_TICKET => Box::new(SessionTicketExtension),
            ext_ids::EXT_TYPE_SUPPORTED_VERSIONS => {
                let versions = if transport.tls_version_max == super::spec::VERSION_TLS13 {
                    vec![super::spec::VERSION_TLS13, super::spec::VERSION_TLS12]
                } else {
                    vec![transport.tls_version_max]
                };
                Box::new(SupportedVersionsExtension::new(versions))
            }
            ext_ids::EXT_TYPE_PSK_KEY_EXCHANGE_MODES => {
                Box::new(PSKKeyExchangeModesExtension::new(vec![super::spec::PSK_MODE_DHE]))
            }
            ext_ids::EXT_TYPE_KEY_SHARE => Box::new(KeyShareExtension::new(
                transport.key_share_groups.iter().map(|group| KeyShare { group: *group, data: Vec::new() }).collect(),
            )),
            ext_ids::EXT_TYPE_SIGNED_CERTIFICATE_TIMESTAMP => Box::new(SCTExtension),
            ext_ids::EXT_TYPE_RENEGOTIATION_INFO => {
                Box::new(RenegotiationInfoExtension::new(super::spec::RENEGOTIATE_ONCE_AS_CLIENT))
            }
            ext_ids::EXT_TYPE_APPLICATION_SETTINGS_NEW | ext_ids::EXT_TYPE_APPLICATION_SETTINGS => Box::new(
                ApplicationSettingsExtensionNew::new(transport.alpn.iter().filter(|p| p.starts_with('h')).cloned().collect()),
            ),
            ext_ids::EXT_TYPE_COMPRESS_CERTIFICATE => {
                Box::new(UtlsCompressCertExtension::new(vec![CERT_COMPRESSION_BROTLI]))
            }
            ext_ids::EXT_TYPE_ECH => Box::new(GREASEEncryptedClientHelloExtension::new()),
            other => {
                let _ = slot.payload.clone();
                crate::tls_extensions::extension_from_id(other)
                    .unwrap_or_else(|| Box::new(UtlsGREASEExtension::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_minimal_spec() {
        let spec = ClientHelloSpecBuilder::new()
            .cipher_suites(vec![0x1301])
            .compression_methods(vec![0])
            .build();
        assert_eq!(spec.cipher_suites, vec![0x1301]);
    }

    #[test]
    fn converts_transport_spec_preserving_extension_order() {
        let mut transport = TransportSpec::new();
        transport.tls_version_max = super::super::spec::VERSION_TLS13;
        transport.cipher_suites = vec![0x1301, 0x1302];
        transport.supported_groups = vec![29, 23];
        transport.key_share_groups = vec![29];
        transport.extensions = vec![
            ExtensionSlot { id: ext_ids::EXT_TYPE_SERVER_NAME, payload: Vec::new(), is_grease: false },
            ExtensionSlot { id: 0x0a0a, payload: Vec::new(), is_grease: true },
            ExtensionSlot { id: ext_ids::EXT_TYPE_KEY_SHARE, payload: Vec::new(), is_grease: false },
        ];

        let spec = ClientHelloSpecBuilder::from_transport_spec(&transport);
        assert_eq!(spec.extensions.len(), 3);
        assert_eq!(spec.extensions[0].extension_id(), ext_ids::EXT_TYPE_SERVER_NAME);
        assert!(crate::tls_config::grease::is_grease_value(spec.extensions[1].extension_id()));
        assert_eq!(spec.extensions[2].extension_id(), ext_ids::EXT_TYPE_KEY_SHARE);
        assert_eq!(spec.cipher_suites, vec![0x1301, 0x1302]);
    }
}
