//! TLS 版本表示
//!
//! 独立于 `spec::ClientHelloSpec` 使用的数值版本，用于签名/比较/统计模块。

use std::fmt;

/// TLS 协议版本，用于签名提取与展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TlsVersion {
    V1_0,
    V1_1,
    V1_2,
    V1_3,
    /// 未知/自定义版本号，原样保留
    Other(u16),
}

impl TlsVersion {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0301 => Self::V1_0,
            0x0302 => Self::V1_1,
            0x0303 => Self::V1_2,
            0x0304 => Self::V1_3,
            other => Self::Other(other),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            Self::V1_0 => 0x0301,
            Self::V1_1 => 0x0302,
            Self::V1_2 => 0x0303,
            Self::V1_3 => 0x0304,
            Self::Other(v) => v,
        }
    }
}

/// 格式化为 JA4 的两位十进制版本号（"10"/"11"/"12"/"13"）
impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1_0 => write!(f, "10"),
            Self::V1_1 => write!(f, "11"),
            Self::V1_2 => write!(f, "12"),
            Self::V1_3 => write!(f, "13"),
            Self::Other(v) => write!(f, "{:02x}", v & 0x00ff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_versions() {
        for v in [TlsVersion::V1_0, TlsVersion::V1_1, TlsVersion::V1_2, TlsVersion::V1_3] {
            assert_eq!(TlsVersion::from_u16(v.to_u16()), v);
        }
    }

    #[test]
    fn formats_ja4_style() {
        assert_eq!(format!("{}", TlsVersion::V1_3), "13");
        assert_eq!(format!("{}", TlsVersion::V1_2), "12");
    }
}
