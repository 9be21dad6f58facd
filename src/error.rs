//! 错误分类
//!
//! 引擎内部始终返回这里定义的 `EngineError`；在边界层（`boundary`/
//! `dispatcher`）被转换为 `status = 0` 的诊断响应，绝不 panic 穿透。

use thiserror::Error;

/// 单个握手尝试失败的具体原因，供重试策略（§4.3）按变体匹配，而不是匹配
/// 错误信息字符串。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeFailureReason {
    /// 对端声明不支持提供的椭圆曲线/密钥交换组
    UnsupportedCurve,
    /// 对端拒绝了 ALPN 协商（例如拒绝 h2）
    AlpnRejected,
    /// 对端要求回退到更低的协议版本
    ProtocolVersionAlert,
    /// 其他握手失败，原始描述保留在 `TLSError::cause`
    Other,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("fingerprint parse error in field `{field}` at position {position}: {reason}")]
    FingerprintParseError { field: String, position: usize, reason: String },

    #[error("incoherent transport spec: {detail}")]
    SpecIncoherent { detail: String },

    #[error("TLS handshake failed after attempting versions {attempted_versions:?}: {cause}")]
    TLSError { cause: String, attempted_versions: Vec<String> },

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("proxy error: {0}")]
    ProxyError(String),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("protocol error: {0}")]
    ProtocolError(String),

    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: u32 },

    #[error("request cancelled")]
    Cancelled,
}

impl EngineError {
    /// 用于 §6 边界响应的诊断 body 文本
    pub fn diagnostic_body(&self) -> String {
        self.to_string()
    }

    /// 错误类别的稳定字符串名，用于日志字段与测试断言
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::FingerprintParseError { .. } => "FingerprintParseError",
            EngineError::SpecIncoherent { .. } => "SpecIncoherent",
            EngineError::TLSError { .. } => "TLSError",
            EngineError::ConnectionError(_) => "ConnectionError",
            EngineError::ProxyError(_) => "ProxyError",
            EngineError::Timeout(_) => "Timeout",
            EngineError::ProtocolError(_) => "ProtocolError",
            EngineError::TooManyRedirects { .. } => "TooManyRedirects",
            EngineError::Cancelled => "Cancelled",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_stable_for_each_variant() {
        let err = EngineError::SpecIncoherent { detail: "x".into() };
        assert_eq!(err.kind(), "SpecIncoherent");
    }
}
