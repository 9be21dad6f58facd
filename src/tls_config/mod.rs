//! TLS 配置模块
//!
//! 提供真实的 TLS Client Hello 配置，对应 Go 版本的 utls.ClientHelloID
//!
//! ## 使用示例
//!
//! ### 使用预定义的指纹
//! ```rust,no_run
//! use fingerprint::tls_config::ClientHelloSpec;
//! let spec = ClientHelloSpec::chrome_133();
//! ```
//!
//! ### 使用 Builder 模式自定义配置
//! ```rust,no_run
//! use fingerprint::tls_config::ClientHelloSpecBuilder;
//! let spec = ClientHelloSpecBuilder::new()
//!     .cipher_suites(ClientHelloSpecBuilder::chrome_cipher_suites())
//!     .compression_methods(vec![0])
//!     .build();
//! ```

pub mod builder;
pub mod comparison;
pub mod extract;
pub mod grease;
pub mod ja4;
pub mod metadata;
pub mod observable;
pub mod signature;
pub mod spec;
pub mod stats;
pub mod version;

pub use builder::ClientHelloSpecBuilder;
pub use comparison::{compare_signatures, compare_specs, find_best_match, FingerprintMatch};
pub use extract::extract_signature;
pub use grease::{
    filter_grease_values, is_grease_value, pick_distinct_grease_values, remove_grease_values,
    TLS_GREASE_VALUES,
};
pub use ja4::{
    first_last_alpn, hash12, parse_ja4r, Ja4Fingerprint, Ja4Payload, Ja4RawFingerprint,
    Ja4Signature, ParsedJa4r,
};
pub use metadata::{ExtensionMetadata, SpecMetadata};
pub use observable::TlsClientObserved;
pub use signature::ClientHelloSignature;
pub use spec::{
    chrome_103_spec, chrome_133_spec, firefox_133_spec, safari_16_0_spec, CipherSuiteID,
    ClientHelloSpec, CERT_COMPRESSION_BROTLI, COMPRESSION_NONE, POINT_FORMAT_UNCOMPRESSED,
    PSK_MODE_DHE, RENEGOTIATE_ONCE_AS_CLIENT, VERSION_TLS10, VERSION_TLS11, VERSION_TLS12,
    VERSION_TLS13,
};
pub use stats::FingerprintStats;
pub use version::TlsVersion;
