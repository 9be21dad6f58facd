//! TLS 密码套件常量
//!
//! 来源：https://www.iana.org/assignments/tls-parameters/tls-parameters.xhtml#tls-parameters-4

/// GREASE 占位符（密码套件位置使用同一族常量，实际取值见 tls_config::grease）
pub const GREASE_PLACEHOLDER: u16 = 0x0A0A;

// TLS 1.3 密码套件
pub const TLS_AES_128_GCM_SHA256: u16 = 0x1301;
pub const TLS_AES_256_GCM_SHA384: u16 = 0x1302;
pub const TLS_CHACHA20_POLY1305_SHA256: u16 = 0x1303;

// TLS 1.2 ECDHE 密码套件
pub const TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256: u16 = 0xC02B;
pub const TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256: u16 = 0xC02F;
pub const TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384: u16 = 0xC02C;
pub const TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384: u16 = 0xC030;
pub const TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256: u16 = 0xCCA9;
pub const TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256: u16 = 0xCCA8;
pub const TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA: u16 = 0xC013;
pub const TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA: u16 = 0xC014;

// TLS 1.2 RSA 密码套件
pub const TLS_RSA_WITH_AES_128_GCM_SHA256: u16 = 0x009C;
pub const TLS_RSA_WITH_AES_256_GCM_SHA384: u16 = 0x009D;
pub const TLS_RSA_WITH_AES_128_CBC_SHA: u16 = 0x002F;
pub const TLS_RSA_WITH_AES_256_CBC_SHA: u16 = 0x0035;
