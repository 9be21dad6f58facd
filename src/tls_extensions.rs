//! TLS 扩展实现
//!
//! 每种扩展对应 Go uTLS 里的一个 `TLSExtension` 实现。
//!
//! 参考：https://github.com/refraction-networking/utls/blob/master/u_tls_extensions.go

use crate::dicttls::extensions::*;
use crate::dicttls::signature_schemes::SignatureScheme;
use crate::dicttls::supported_groups::CurveID;
use crate::tls_config::grease::pick_distinct_grease_values;
use std::any::Any;
use std::io;

/// TLS 扩展号
pub type ExtensionID = u16;

/// Padding 长度计算函数类型
pub type PaddingLengthFn = Box<dyn Fn(usize) -> (usize, bool)>;

/// KeyShare 条目，对应 Go uTLS 的 `tls.KeyShare`
#[derive(Debug, Clone)]
pub struct KeyShare {
    pub group: CurveID,
    pub data: Vec<u8>,
}

/// TLS 扩展 trait，对应 Go uTLS 的 `tls.TLSExtension` 接口
pub trait TLSExtension: std::fmt::Debug + Any {
    /// 扩展序列化后的长度（含扩展头）
    fn len(&self) -> usize;

    /// 长度为 0 即视为空扩展
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 把扩展写入 `buf`，返回写入字节数
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// 扩展号
    fn extension_id(&self) -> ExtensionID;

    /// 向下转型用
    fn as_any(&self) -> &dyn Any;
}

/// 支持原地改写内容的扩展，对应 Go uTLS 的 `tls.TLSExtensionWriter`
pub trait TLSExtensionWriter: TLSExtension {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// GREASE 扩展
#[derive(Debug, Clone)]
pub struct UtlsGREASEExtension {
    pub value: u16,
}

impl UtlsGREASEExtension {
    pub fn new() -> Self {
        Self { value: pick_distinct_grease_values(1)[0] }
    }
}

impl Default for UtlsGREASEExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl TLSExtension for UtlsGREASEExtension {
    fn len(&self) -> usize {
        4
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.len() < self.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (self.value >> 8) as u8;
        buf[1] = (self.value & 0xff) as u8;
        buf[2] = 0;
        buf[3] = 0;
        Ok(self.len())
    }

    fn extension_id(&self) -> ExtensionID {
        self.value
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// SNI 扩展
#[derive(Debug, Clone)]
pub struct SNIExtension {
    pub server_name: String,
}

impl SNIExtension {
    pub fn new(server_name: String) -> Self {
        Self { server_name }
    }
}

impl TLSExtension for SNIExtension {
    fn len(&self) -> usize {
        if self.server_name.is_empty() {
            return 0;
        }
        4 + 2 + 1 + 2 + self.server_name.len()
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if self.server_name.is_empty() {
            return Ok(0);
        }
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }

        buf[0] = (EXT_TYPE_SERVER_NAME >> 8) as u8;
        buf[1] = (EXT_TYPE_SERVER_NAME & 0xff) as u8;

        let host_name_len = self.server_name.len();
        let total_len = 5 + host_name_len;
        buf[2] = (total_len >> 8) as u8;
        buf[3] = (total_len & 0xff) as u8;

        buf[4] = ((host_name_len + 3) >> 8) as u8;
        buf[5] = ((host_name_len + 3) & 0xff) as u8;

        buf[6] = 0; // name_type: host_name
        buf[7] = (host_name_len >> 8) as u8;
        buf[8] = (host_name_len & 0xff) as u8;
        buf[9..9 + host_name_len].copy_from_slice(self.server_name.as_bytes());

        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_SERVER_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl TLSExtensionWriter for SNIExtension {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SNI 交给调用方在握手时填入真实域名，这里不做处理
        Ok(buf.len())
    }
}

/// Status Request 扩展
#[derive(Debug, Clone)]
pub struct StatusRequestExtension;

impl TLSExtension for StatusRequestExtension {
    fn len(&self) -> usize {
        9
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.len() < self.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_STATUS_REQUEST >> 8) as u8;
        buf[1] = (EXT_TYPE_STATUS_REQUEST & 0xff) as u8;
        buf[2] = 0;
        buf[3] = 5;
        buf[4] = 1; // status_type: OCSP
        buf[5] = 0;
        buf[6] = 0;
        buf[7] = 0;
        buf[8] = 0;
        Ok(self.len())
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_STATUS_REQUEST
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Supported Curves（即 supported_groups）扩展
#[derive(Debug, Clone)]
pub struct SupportedCurvesExtension {
    pub curves: Vec<CurveID>,
}

impl SupportedCurvesExtension {
    pub fn new(curves: Vec<CurveID>) -> Self {
        Self { curves }
    }
}

impl TLSExtension for SupportedCurvesExtension {
    fn len(&self) -> usize {
        6 + 2 * self.curves.len()
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_SUPPORTED_GROUPS >> 8) as u8;
        buf[1] = (EXT_TYPE_SUPPORTED_GROUPS & 0xff) as u8;

        let curves_len = 2 * self.curves.len();
        let total_len = 2 + curves_len;
        buf[2] = (total_len >> 8) as u8;
        buf[3] = (total_len & 0xff) as u8;
        buf[4] = (curves_len >> 8) as u8;
        buf[5] = (curves_len & 0xff) as u8;

        for (i, curve) in self.curves.iter().enumerate() {
            buf[6 + 2 * i] = (curve >> 8) as u8;
            buf[7 + 2 * i] = (curve & 0xff) as u8;
        }
        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_SUPPORTED_GROUPS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Supported Points（EC point format）扩展
#[derive(Debug, Clone)]
pub struct SupportedPointsExtension {
    pub supported_points: Vec<u8>,
}

impl SupportedPointsExtension {
    pub fn new(supported_points: Vec<u8>) -> Self {
        Self { supported_points }
    }
}

impl TLSExtension for SupportedPointsExtension {
    fn len(&self) -> usize {
        5 + self.supported_points.len()
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_EC_POINT_FORMATS >> 8) as u8;
        buf[1] = (EXT_TYPE_EC_POINT_FORMATS & 0xff) as u8;

        let total_len = 1 + self.supported_points.len();
        buf[2] = (total_len >> 8) as u8;
        buf[3] = (total_len & 0xff) as u8;
        buf[4] = self.supported_points.len() as u8;
        buf[5..5 + self.supported_points.len()].copy_from_slice(&self.supported_points);
        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_EC_POINT_FORMATS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Signature Algorithms 扩展
#[derive(Debug, Clone)]
pub struct SignatureAlgorithmsExtension {
    pub supported_signature_algorithms: Vec<SignatureScheme>,
}

impl SignatureAlgorithmsExtension {
    pub fn new(supported_signature_algorithms: Vec<SignatureScheme>) -> Self {
        Self { supported_signature_algorithms }
    }
}

impl TLSExtension for SignatureAlgorithmsExtension {
    fn len(&self) -> usize {
        6 + 2 * self.supported_signature_algorithms.len()
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_SIGNATURE_ALGORITHMS >> 8) as u8;
        buf[1] = (EXT_TYPE_SIGNATURE_ALGORITHMS & 0xff) as u8;

        let algorithms_len = 2 * self.supported_signature_algorithms.len();
        let total_len = 2 + algorithms_len;
        buf[2] = (total_len >> 8) as u8;
        buf[3] = (total_len & 0xff) as u8;
        buf[4] = (algorithms_len >> 8) as u8;
        buf[5] = (algorithms_len & 0xff) as u8;

        for (i, scheme) in self.supported_signature_algorithms.iter().enumerate() {
            buf[6 + 2 * i] = (scheme >> 8) as u8;
            buf[7 + 2 * i] = (scheme & 0xff) as u8;
        }
        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_SIGNATURE_ALGORITHMS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// ALPN 扩展
#[derive(Debug, Clone)]
pub struct ALPNExtension {
    pub alpn_protocols: Vec<String>,
}

impl ALPNExtension {
    pub fn new(alpn_protocols: Vec<String>) -> Self {
        Self { alpn_protocols }
    }
}

impl TLSExtension for ALPNExtension {
    fn len(&self) -> usize {
        let mut total = 2 + 2 + 2;
        for protocol in &self.alpn_protocols {
            total += 1 + protocol.len();
        }
        total
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_APPLICATION_LAYER_PROTOCOL_NEGOTIATION >> 8) as u8;
        buf[1] = (EXT_TYPE_APPLICATION_LAYER_PROTOCOL_NEGOTIATION & 0xff) as u8;

        let mut protocol_name_list_len = 0;
        for protocol in &self.alpn_protocols {
            protocol_name_list_len += 1 + protocol.len();
        }
        let total_len = 2 + protocol_name_list_len;
        buf[2] = (total_len >> 8) as u8;
        buf[3] = (total_len & 0xff) as u8;
        buf[4] = (protocol_name_list_len >> 8) as u8;
        buf[5] = (protocol_name_list_len & 0xff) as u8;

        let mut offset = 6;
        for protocol in &self.alpn_protocols {
            buf[offset] = protocol.len() as u8;
            offset += 1;
            buf[offset..offset + protocol.len()].copy_from_slice(protocol.as_bytes());
            offset += protocol.len();
        }
        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_APPLICATION_LAYER_PROTOCOL_NEGOTIATION
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Extended Master Secret 扩展
#[derive(Debug, Clone)]
pub struct ExtendedMasterSecretExtension;

impl TLSExtension for ExtendedMasterSecretExtension {
    fn len(&self) -> usize {
        4
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.len() < self.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_EXTENDED_MASTER_SECRET >> 8) as u8;
        buf[1] = (EXT_TYPE_EXTENDED_MASTER_SECRET & 0xff) as u8;
        buf[2] = 0;
        buf[3] = 0;
        Ok(self.len())
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_EXTENDED_MASTER_SECRET
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Session Ticket 扩展
#[derive(Debug, Clone)]
pub struct SessionTicketExtension;

impl TLSExtension for SessionTicketExtension {
    fn len(&self) -> usize {
        4
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.len() < self.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_SESSION_TICKET >> 8) as u8;
        buf[1] = (EXT_TYPE_SESSION_TICKET & 0xff) as u8;
        buf[2] = 0;
        buf[3] = 0;
        Ok(self.len())
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_SESSION_TICKET
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Supported Versions 扩展
#[derive(Debug, Clone)]
pub struct SupportedVersionsExtension {
    pub versions: Vec<u16>,
}

impl SupportedVersionsExtension {
    pub fn new(versions: Vec<u16>) -> Self {
        Self { versions }
    }
}

impl TLSExtension for SupportedVersionsExtension {
    fn len(&self) -> usize {
        5 + 2 * self.versions.len()
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_SUPPORTED_VERSIONS >> 8) as u8;
        buf[1] = (EXT_TYPE_SUPPORTED_VERSIONS & 0xff) as u8;

        let versions_len = 1 + 2 * self.versions.len();
        buf[2] = (versions_len >> 8) as u8;
        buf[3] = (versions_len & 0xff) as u8;
        buf[4] = (2 * self.versions.len()) as u8;

        for (i, version) in self.versions.iter().enumerate() {
            buf[5 + 2 * i] = (version >> 8) as u8;
            buf[6 + 2 * i] = (version & 0xff) as u8;
        }
        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_SUPPORTED_VERSIONS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// PSK Key Exchange Modes 扩展
#[derive(Debug, Clone)]
pub struct PSKKeyExchangeModesExtension {
    pub modes: Vec<u8>,
}

impl PSKKeyExchangeModesExtension {
    pub fn new(modes: Vec<u8>) -> Self {
        Self { modes }
    }
}

impl TLSExtension for PSKKeyExchangeModesExtension {
    fn len(&self) -> usize {
        5 + self.modes.len()
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_PSK_KEY_EXCHANGE_MODES >> 8) as u8;
        buf[1] = (EXT_TYPE_PSK_KEY_EXCHANGE_MODES & 0xff) as u8;

        let total_len = 1 + self.modes.len();
        buf[2] = (total_len >> 8) as u8;
        buf[3] = (total_len & 0xff) as u8;
        buf[4] = self.modes.len() as u8;
        buf[5..5 + self.modes.len()].copy_from_slice(&self.modes);
        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_PSK_KEY_EXCHANGE_MODES
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Key Share 扩展
#[derive(Debug, Clone)]
pub struct KeyShareExtension {
    pub key_shares: Vec<KeyShare>,
}

impl KeyShareExtension {
    pub fn new(key_shares: Vec<KeyShare>) -> Self {
        Self { key_shares }
    }

    fn key_shares_len(&self) -> usize {
        self.key_shares.iter().map(|ks| 4 + ks.data.len()).sum()
    }
}

impl TLSExtension for KeyShareExtension {
    fn len(&self) -> usize {
        6 + self.key_shares_len()
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_KEY_SHARE >> 8) as u8;
        buf[1] = (EXT_TYPE_KEY_SHARE & 0xff) as u8;

        let key_shares_len = self.key_shares_len();
        let total_len = 2 + key_shares_len;
        buf[2] = (total_len >> 8) as u8;
        buf[3] = (total_len & 0xff) as u8;
        buf[4] = (key_shares_len >> 8) as u8;
        buf[5] = (key_shares_len & 0xff) as u8;

        let mut offset = 6;
        for ks in &self.key_shares {
            buf[offset] = (ks.group >> 8) as u8;
            buf[offset + 1] = (ks.group & 0xff) as u8;
            buf[offset + 2] = (ks.data.len() >> 8) as u8;
            buf[offset + 3] = (ks.data.len() & 0xff) as u8;
            buf[offset + 4..offset + 4 + ks.data.len()].copy_from_slice(&ks.data);
            offset += 4 + ks.data.len();
        }
        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_KEY_SHARE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Signed Certificate Timestamp 扩展
#[derive(Debug, Clone)]
pub struct SCTExtension;

impl TLSExtension for SCTExtension {
    fn len(&self) -> usize {
        4
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.len() < self.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_SIGNED_CERTIFICATE_TIMESTAMP >> 8) as u8;
        buf[1] = (EXT_TYPE_SIGNED_CERTIFICATE_TIMESTAMP & 0xff) as u8;
        buf[2] = 0;
        buf[3] = 0;
        Ok(self.len())
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_SIGNED_CERTIFICATE_TIMESTAMP
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Renegotiation Info 扩展
#[derive(Debug, Clone)]
pub struct RenegotiationInfoExtension {
    pub renegotiation: u8,
}

impl RenegotiationInfoExtension {
    pub fn new(renegotiation: u8) -> Self {
        Self { renegotiation }
    }
}

impl TLSExtension for RenegotiationInfoExtension {
    fn len(&self) -> usize {
        5
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.len() < self.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_RENEGOTIATION_INFO >> 8) as u8;
        buf[1] = (EXT_TYPE_RENEGOTIATION_INFO & 0xff) as u8;
        buf[2] = 0;
        buf[3] = 1;
        buf[4] = self.renegotiation;
        Ok(self.len())
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_RENEGOTIATION_INFO
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// ALPS（Application Settings）新版本扩展号
#[derive(Debug, Clone)]
pub struct ApplicationSettingsExtensionNew {
    pub supported_protocols: Vec<String>,
}

impl ApplicationSettingsExtensionNew {
    pub fn new(supported_protocols: Vec<String>) -> Self {
        Self { supported_protocols }
    }
}

impl TLSExtension for ApplicationSettingsExtensionNew {
    fn len(&self) -> usize {
        let mut total = 2 + 2 + 2;
        for protocol in &self.supported_protocols {
            total += 1 + protocol.len();
        }
        total
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_APPLICATION_SETTINGS_NEW >> 8) as u8;
        buf[1] = (EXT_TYPE_APPLICATION_SETTINGS_NEW & 0xff) as u8;

        let mut protocol_list_len = 0;
        for protocol in &self.supported_protocols {
            protocol_list_len += 1 + protocol.len();
        }
        let total_len = 2 + protocol_list_len;
        buf[2] = (total_len >> 8) as u8;
        buf[3] = (total_len & 0xff) as u8;
        buf[4] = (protocol_list_len >> 8) as u8;
        buf[5] = (protocol_list_len & 0xff) as u8;

        let mut offset = 6;
        for protocol in &self.supported_protocols {
            buf[offset] = protocol.len() as u8;
            offset += 1;
            buf[offset..offset + protocol.len()].copy_from_slice(protocol.as_bytes());
            offset += protocol.len();
        }
        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_APPLICATION_SETTINGS_NEW
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Certificate Compression 扩展
#[derive(Debug, Clone)]
pub struct UtlsCompressCertExtension {
    pub algorithms: Vec<u16>,
}

impl UtlsCompressCertExtension {
    pub fn new(algorithms: Vec<u16>) -> Self {
        Self { algorithms }
    }
}

impl TLSExtension for UtlsCompressCertExtension {
    fn len(&self) -> usize {
        6 + 2 * self.algorithms.len()
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_COMPRESS_CERTIFICATE >> 8) as u8;
        buf[1] = (EXT_TYPE_COMPRESS_CERTIFICATE & 0xff) as u8;

        let algorithms_len = 2 * self.algorithms.len();
        let total_len = 2 + algorithms_len;
        buf[2] = (total_len >> 8) as u8;
        buf[3] = (total_len & 0xff) as u8;
        buf[4] = (algorithms_len >> 8) as u8;
        buf[5] = (algorithms_len & 0xff) as u8;

        for (i, alg) in self.algorithms.iter().enumerate() {
            buf[6 + 2 * i] = (*alg >> 8) as u8;
            buf[7 + 2 * i] = (*alg & 0xff) as u8;
        }
        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_COMPRESS_CERTIFICATE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Pre-Shared Key 扩展（占位；真实值在握手阶段按 RFC 8446 §4.2.11 填充）
#[derive(Debug, Clone)]
pub struct UtlsPreSharedKeyExtension;

impl TLSExtension for UtlsPreSharedKeyExtension {
    fn len(&self) -> usize {
        4
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.len() < self.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_PRE_SHARED_KEY >> 8) as u8;
        buf[1] = (EXT_TYPE_PRE_SHARED_KEY & 0xff) as u8;
        buf[2] = 0;
        buf[3] = 0;
        Ok(self.len())
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_PRE_SHARED_KEY
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// GREASE ECH 扩展，对应 Go uTLS 的 `tls.BoringGREASEECH()`
#[derive(Debug, Clone)]
pub struct GREASEEncryptedClientHelloExtension {
    pub value: u16,
}

impl GREASEEncryptedClientHelloExtension {
    pub fn new() -> Self {
        Self { value: EXT_TYPE_ECH }
    }
}

impl Default for GREASEEncryptedClientHelloExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl TLSExtension for GREASEEncryptedClientHelloExtension {
    fn len(&self) -> usize {
        4
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.len() < self.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (self.value >> 8) as u8;
        buf[1] = (self.value & 0xff) as u8;
        buf[2] = 0;
        buf[3] = 0;
        Ok(self.len())
    }

    fn extension_id(&self) -> ExtensionID {
        self.value
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Padding 扩展，持有一个函数指针所以不能 `#[derive(Debug, Clone)]`
pub struct UtlsPaddingExtension {
    pub padding_len: usize,
    pub will_pad: bool,
    pub get_padding_len: Option<PaddingLengthFn>,
}

impl std::fmt::Debug for UtlsPaddingExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtlsPaddingExtension")
            .field("padding_len", &self.padding_len)
            .field("will_pad", &self.will_pad)
            .field("get_padding_len", &self.get_padding_len.is_some())
            .finish()
    }
}

impl Clone for UtlsPaddingExtension {
    fn clone(&self) -> Self {
        Self { padding_len: self.padding_len, will_pad: self.will_pad, get_padding_len: None }
    }
}

impl Default for UtlsPaddingExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl UtlsPaddingExtension {
    pub fn new() -> Self {
        Self { padding_len: 0, will_pad: false, get_padding_len: None }
    }

    /// Chrome/BoringSSL 的 padding 策略：把 ClientHello 撑到 [0x200, 0x2ff]
    /// 区间之外不做任何事，否则补到刚好跨过 0x200 字节边界
    pub fn boring_padding_style(unpadded_len: usize) -> (usize, bool) {
        if unpadded_len > 0xff && unpadded_len < 0x200 {
            let mut padding_len = 0x200 - unpadded_len;
            if padding_len > 4 {
                padding_len -= 4;
            } else {
                padding_len = 1;
            }
            return (padding_len, true);
        }
        (0, false)
    }
}

impl TLSExtension for UtlsPaddingExtension {
    fn len(&self) -> usize {
        if self.will_pad {
            4 + self.padding_len
        } else {
            0
        }
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.will_pad {
            return Ok(0);
        }
        let len = self.len();
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer too short"));
        }
        buf[0] = (EXT_TYPE_PADDING >> 8) as u8;
        buf[1] = (EXT_TYPE_PADDING & 0xff) as u8;
        buf[2] = (self.padding_len >> 8) as u8;
        buf[3] = (self.padding_len & 0xff) as u8;
        for b in buf.iter_mut().skip(4).take(self.padding_len) {
            *b = 0;
        }
        Ok(len)
    }

    fn extension_id(&self) -> ExtensionID {
        EXT_TYPE_PADDING
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl TLSExtensionWriter for UtlsPaddingExtension {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.get_padding_len = Some(Box::new(Self::boring_padding_style));
        Ok(buf.len())
    }
}

/// 按扩展号构造一个空壳扩展实例，对应 Go uTLS 的 `ExtensionFromID`
pub fn extension_from_id(id: ExtensionID) -> Option<Box<dyn TLSExtension>> {
    match id {
        EXT_TYPE_SERVER_NAME => Some(Box::new(SNIExtension::new(String::new()))),
        EXT_TYPE_STATUS_REQUEST => Some(Box::new(StatusRequestExtension)),
        EXT_TYPE_SUPPORTED_GROUPS => Some(Box::new(SupportedCurvesExtension::new(vec![]))),
        EXT_TYPE_EC_POINT_FORMATS => Some(Box::new(SupportedPointsExtension::new(vec![]))),
        EXT_TYPE_SIGNATURE_ALGORITHMS => Some(Box::new(SignatureAlgorithmsExtension::new(vec![]))),
        EXT_TYPE_APPLICATION_LAYER_PROTOCOL_NEGOTIATION => Some(Box::new(ALPNExtension::new(vec![]))),
        EXT_TYPE_EXTENDED_MASTER_SECRET => Some(Box::new(ExtendedMasterSecretExtension)),
        EXT_TYPE_SESSION_TICKET => Some(Box::new(SessionTicketExtension)),
        EXT_TYPE_SUPPORTED_VERSIONS => Some(Box::new(SupportedVersionsExtension::new(vec![]))),
        EXT_TYPE_PSK_KEY_EXCHANGE_MODES => Some(Box::new(PSKKeyExchangeModesExtension::new(vec![]))),
        EXT_TYPE_KEY_SHARE => Some(Box::new(KeyShareExtension::new(vec![]))),
        EXT_TYPE_SIGNED_CERTIFICATE_TIMESTAMP => Some(Box::new(SCTExtension)),
        EXT_TYPE_RENEGOTIATION_INFO => Some(Box::new(RenegotiationInfoExtension::new(1))),
        EXT_TYPE_APPLICATION_SETTINGS_NEW => Some(Box::new(ApplicationSettingsExtensionNew::new(vec![]))),
        EXT_TYPE_COMPRESS_CERTIFICATE => Some(Box::new(UtlsCompressCertExtension::new(vec![]))),
        EXT_TYPE_PRE_SHARED_KEY => Some(Box::new(UtlsPreSharedKeyExtension)),
        EXT_TYPE_ECH => Some(Box::new(GREASEEncryptedClientHelloExtension::new())),
        _ => {
            if is_grease_uint16(id) {
                Some(Box::new(UtlsGREASEExtension::new()))
            } else {
                None
            }
        }
    }
}

/// 判断一个 16 位值是否落在 GREASE 集合（0x?a?a 模式）
fn is_grease_uint16(v: u16) -> bool {
    let low = v & 0xff;
    let high = (v >> 8) & 0xff;
    low == high && (low & 0x0f) == 0x0a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(ext: &dyn TLSExtension) -> Vec<u8> {
        let mut buf = vec![0u8; ext.len()];
        ext.read(&mut buf).unwrap();
        buf
    }

    #[test]
    fn sni_extension_empty_name_has_zero_length() {
        let ext = SNIExtension::new(String::new());
        assert_eq!(ext.len(), 0);
        assert!(ext.read(&mut []).unwrap() == 0);
    }

    #[test]
    fn sni_extension_encodes_host_name() {
        let ext = SNIExtension::new("example.com".to_string());
        let bytes = read_all(&ext);
        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), EXT_TYPE_SERVER_NAME);
        assert_eq!(&bytes[9..], b"example.com");
    }

    #[test]
    fn key_share_extension_encodes_groups_and_data() {
        let ext = KeyShareExtension::new(vec![KeyShare { group: 29, data: vec![1, 2, 3] }]);
        let bytes = read_all(&ext);
        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), EXT_TYPE_KEY_SHARE);
        assert_eq!(bytes.len(), ext.len());
    }

    #[test]
    fn padding_extension_respects_boring_style() {
        let (padding_len, will_pad) = UtlsPaddingExtension::boring_padding_style(0x1fd);
        assert!(will_pad);
        assert_eq!(padding_len, 1);

        let (_, will_pad) = UtlsPaddingExtension::boring_padding_style(0x300);
        assert!(!will_pad);
    }

    #[test]
    fn extension_from_id_recognizes_grease() {
        assert!(extension_from_id(0x0a0a).is_some());
        assert!(extension_from_id(EXT_TYPE_SUPPORTED_GROUPS).is_some());
        assert!(extension_from_id(0x1234).is_none());
    }
}
