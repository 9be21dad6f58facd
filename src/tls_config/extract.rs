//! ClientHelloSpec 提取模块
//!
//! 从 ClientHelloSpec 中提取签名信息，用于指纹比较和匹配
//!
//! 参考：Huginn Net 的 Signature 提取实现

use crate::tls_config::signature::ClientHelloSignature;
use crate::tls_config::spec::ClientHelloSpec;
use crate::tls_config::version::TlsVersion;
use crate::tls_extensions::TLSExtension;

/// 从 ClientHelloSpec 中提取签名信息
///
/// # 参数
/// * `spec` - 要提取签名的 ClientHelloSpec
///
/// # 返回
/// * `ClientHelloSignature` - 提取的签名信息
///
/// # 注意
/// 扩展是 trait 对象，只能直接拿到扩展 ID；SNI、ALPN、曲线、签名算法等
/// 内部数据从 `spec.metadata`（构建时记录）取得，取不到则留空。
///
/// # 示例
/// ```
/// use fingerprint::{ClientHelloSpec, extract_signature};
/// let spec = ClientHelloSpec::chrome_133();
/// let signature = extract_signature(&spec);
/// ```
pub fn extract_signature(spec: &ClientHelloSpec) -> ClientHelloSignature {
    let mut signature = ClientHelloSignature::new();

    signature.cipher_suites = spec.cipher_suites.clone();
    signature.version = TlsVersion::from_u16(spec.tls_vers_max);
    signature.extensions = spec.extensions.iter().map(|ext| ext.extension_id()).collect();

    if let Some(metadata) = &spec.metadata {
        signature.sni = metadata.get_sni().cloned();
        signature.alpn = metadata.get_first_alpn();
        signature.elliptic_curves = metadata.get_elliptic_curves().cloned().unwrap_or_default();
        signature.elliptic_curve_point_formats =
            metadata.get_elliptic_curve_point_formats().cloned().unwrap_or_default();
        signature.signature_algorithms = metadata.get_signature_algorithms().cloned().unwrap_or_default();
    }

    signature
}
