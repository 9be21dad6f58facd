//! 浏览器 profile 注册表
//!
//! 三种来源：代码内置常量、JSON/YAML 目录、环境变量指定的目录。
//! 进程级单例，首次查询时惰性初始化；目录内文件按字典序加载，
//! 后出现的同名 profile 覆盖先出现的。

use crate::error::EngineError;
use crate::fingerprint::transport_spec::BrowserProfile;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{OnceLock, RwLock};

/// `FINGERPRINT_PROFILE_DIR` 指向一个 profile 文件目录，在注册表初始化时加载
pub const PROFILE_DIR_ENV_VAR: &str = "FINGERPRINT_PROFILE_DIR";

#[derive(Debug, Deserialize)]
struct ProfileFile {
    name: String,
    ja3: String,
    #[serde(default)]
    ja4r: Option<String>,
    #[serde(default)]
    http2_fingerprint: Option<String>,
    #[serde(default)]
    quic_fingerprint: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    header_order: Option<Vec<String>>,
    #[serde(default)]
    disable_grease: bool,
    #[serde(default)]
    force_http1: bool,
    #[serde(default)]
    force_http3: bool,
}

impl From<ProfileFile> for BrowserProfile {
    fn from(f: ProfileFile) -> Self {
        BrowserProfile {
            name: f.name,
            ja3: f.ja3,
            ja4r: f.ja4r,
            http2_fingerprint: f.http2_fingerprint,
            quic_fingerprint: f.quic_fingerprint,
            user_agent: f.user_agent.unwrap_or_default(),
            header_order: f.header_order,
            is_mobile: false,
            disable_grease: f.disable_grease,
        }
    }
}

fn builtin_profiles() -> Vec<BrowserProfile> {
    vec![
        BrowserProfile {
            name: "chrome_133".to_string(),
            ja3: "771,4865-4866-4867-4868-49195-49199-49196-49200-52393-52392-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-13-18-51-45-43-27-17513,4588-29-23-24,0".to_string(),
            ja4r: None,
            http2_fingerprint: Some("1:65536;2:0;3:1000;4:6291456;5:16384;6:262144|15663105|0|m,a,s,p".to_string()),
            quic_fingerprint: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36".to_string(),
            header_order: None,
            is_mobile: false,
            disable_grease: false,
        },
        BrowserProfile {
            name: "firefox_133".to_string(),
            ja3: "771,4865-4867-4866-49195-49199-49196-49200-52393-52392-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-51-43-13-45-28-21,4588-29-23-24-25-256-257,0".to_string(),
            ja4r: None,
            http2_fingerprint: Some("1:65536;2:0;3:1000;4:131072;5:16384;6:262144|12517377|0|m,p,a,s".to_string()),
            quic_fingerprint: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0".to_string(),
            header_order: None,
            is_mobile: false,
            disable_grease: false,
        },
    ]
}

fn load_profile_directory(dir: &Path) -> Result<Vec<BrowserProfile>, EngineError> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| EngineError::ConnectionError(format!("cannot read profile directory {}: {e}", dir.display())))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            matches!(p.extension().and_then(|e| e.to_str()), Some("json") | Some("yaml") | Some("yml"))
        })
        .collect();
    entries.sort();

    let mut profiles = Vec::new();
    for path in entries {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            EngineError::ConnectionError(format!("cannot read profile file {}: {e}", path.display()))
        })?;
        let parsed: ProfileFile = if path.extension().and_then(|e| e.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(|e| EngineError::FingerprintParseError {
                field: path.display().to_string(),
                position: 0,
                reason: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| EngineError::FingerprintParseError {
                field: path.display().to_string(),
                position: 0,
                reason: e.to_string(),
            })?
        };
        profiles.push(BrowserProfile::from(parsed));
    }
    Ok(profiles)
}

fn init_registry() -> HashMap<String, BrowserProfile> {
    let mut map = HashMap::new();
    for profile in builtin_profiles() {
        map.insert(profile.name.clone(), profile);
    }
    if let Ok(dir) = std::env::var(PROFILE_DIR_ENV_VAR) {
        match load_profile_directory(Path::new(&dir)) {
            Ok(profiles) => {
                for profile in profiles {
                    map.insert(profile.name.clone(), profile);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, dir, "failed to load fingerprint profile directory");
            }
        }
    }
    map
}

static REGISTRY: OnceLock<RwLock<HashMap<String, BrowserProfile>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, BrowserProfile>> {
    REGISTRY.get_or_init(|| RwLock::new(init_registry()))
}

/// 按名称查找一个已注册的 profile
pub fn lookup_profile(name: &str) -> Option<BrowserProfile> {
    registry().read().expect("profile registry lock poisoned").get(name).cloned()
}

/// 注册或覆盖一个 profile，供程序在启动时补充内置集合之外的条目
pub fn register_profile(profile: BrowserProfile) {
    registry().write().expect("profile registry lock poisoned").insert(profile.name.clone(), profile);
}

/// 已注册的全部 profile 名称
pub fn registered_profile_names() -> Vec<String> {
    registry().read().expect("profile registry lock poisoned").keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_are_registered() {
        assert!(lookup_profile("chrome_133").is_some());
        assert!(lookup_profile("firefox_133").is_some());
    }

    #[test]
    fn unknown_profile_returns_none() {
        assert!(lookup_profile("does_not_exist").is_none());
    }

    #[test]
    fn register_profile_adds_a_lookup_entry() {
        register_profile(BrowserProfile {
            name: "test_custom_profile".to_string(),
            ja3: "771,4865,0,29,0".to_string(),
            ..Default::default()
        });
        assert!(lookup_profile("test_custom_profile").is_some());
    }
}
