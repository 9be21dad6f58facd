//! TLS 记录层 (Record Layer)
//!
//! ```text
//! struct {
//!     ContentType type;       // 1 byte
//!     ProtocolVersion version; // 2 bytes
//!     uint16 length;           // 2 bytes
//!     opaque fragment[length];
//! } TLSPlaintext;
//! ```
//!
//! 记录层的 `version` 字段历史上固定写 TLS 1.0 (0x0301)，即使协商的是更高
//! 版本，这是握手首包的常见做法，我们在这里保留这个约定。

/// TLS 记录类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TLSRecordType {
    ChangeCipherSpec = 20,
    Alert = 21,
    Handshake = 22,
    ApplicationData = 23,
}

impl TLSRecordType {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            20 => Ok(Self::ChangeCipherSpec),
            21 => Ok(Self::Alert),
            22 => Ok(Self::Handshake),
            23 => Ok(Self::ApplicationData),
            other => Err(format!("未知的记录类型: {other}")),
        }
    }
}

/// 记录层里历史遗留的固定版本号，与实际协商版本无关
pub const RECORD_LAYER_VERSION: u16 = 0x0301;

/// TLS 记录
#[derive(Debug, Clone)]
pub struct TLSRecord {
    pub record_type: TLSRecordType,
    pub version: u16,
    pub payload: Vec<u8>,
}

impl TLSRecord {
    pub fn new(record_type: TLSRecordType, version: u16, payload: Vec<u8>) -> Self {
        Self { record_type, version, payload }
    }

    /// 包裹一段握手层字节为一条握手记录，version 固定写 `RECORD_LAYER_VERSION`
    pub fn handshake(payload: Vec<u8>) -> Self {
        Self::new(TLSRecordType::Handshake, RECORD_LAYER_VERSION, payload)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(5 + self.payload.len());
        bytes.push(self.record_type.as_u8());
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), String> {
        if data.len() < 5 {
            return Err("数据太短，无法解析记录头".to_string());
        }
        let record_type = TLSRecordType::from_u8(data[0])?;
        let version = u16::from_be_bytes([data[1], data[2]]);
        let length = u16::from_be_bytes([data[3], data[4]]) as usize;

        if data.len() < 5 + length {
            return Err(format!(
                "记录数据不完整，需要 {} 字节，实际只有 {} 字节",
                5 + length,
                data.len()
            ));
        }

        let payload = data[5..5 + length].to_vec();
        Ok((Self::new(record_type, version, payload), 5 + length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_handshake_payload_with_legacy_version() {
        let record = TLSRecord::handshake(vec![1, 2, 3]);
        let bytes = record.to_bytes();
        assert_eq!(bytes[0], TLSRecordType::Handshake.as_u8());
        assert_eq!(u16::from_be_bytes([bytes[1], bytes[2]]), RECORD_LAYER_VERSION);
        assert_eq!(u16::from_be_bytes([bytes[3], bytes[4]]), 3);
    }

    #[test]
    fn round_trips_through_bytes() {
        let record = TLSRecord::new(TLSRecordType::Alert, 0x0303, vec![2, 10]);
        let bytes = record.to_bytes();
        let (parsed, consumed) = TLSRecord::from_bytes(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(parsed.record_type, TLSRecordType::Alert);
        assert_eq!(parsed.payload, vec![2, 10]);
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(TLSRecord::from_bytes(&[22, 3, 1, 0, 10]).is_err());
    }
}
