//! 浏览器/操作系统/ User-Agent 模板的公共类型
//!
//! 这些类型被 `useragent`、`random`、`headers` 模块共用，用于在指纹名称、
//! User-Agent 字符串与标准 HTTP 请求头之间建立联系。

use std::fmt;

/// 浏览器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserType {
    Chrome,
    Firefox,
    Safari,
    Opera,
    Edge,
}

impl BrowserType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chrome" => Some(BrowserType::Chrome),
            "firefox" => Some(BrowserType::Firefox),
            "safari" => Some(BrowserType::Safari),
            "opera" => Some(BrowserType::Opera),
            "edge" => Some(BrowserType::Edge),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserType::Chrome => "chrome",
            BrowserType::Firefox => "firefox",
            BrowserType::Safari => "safari",
            BrowserType::Opera => "opera",
            BrowserType::Edge => "edge",
        }
    }
}

impl fmt::Display for BrowserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-Agent 模板中用于占位的操作系统描述
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Windows10,
    Windows11,
    MacOS13,
    MacOS14,
    MacOS15,
    Linux,
}

impl OperatingSystem {
    /// User-Agent 模板中 `%s` 占位符对应的片段，例如 `"Windows NT 10.0; Win64; x64"`
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Windows10 => "Windows NT 10.0; Win64; x64",
            OperatingSystem::Windows11 => "Windows NT 10.0; Win64; x64",
            OperatingSystem::MacOS13 => "Macintosh; Intel Mac OS X 13_6",
            OperatingSystem::MacOS14 => "Macintosh; Intel Mac OS X 14_5",
            OperatingSystem::MacOS15 => "Macintosh; Intel Mac OS X 15_0",
            OperatingSystem::Linux => "X11; Linux x86_64",
        }
    }
}

/// 所有受支持的桌面操作系统，供 `random_os` 均匀随机选取
pub const OPERATING_SYSTEMS: &[OperatingSystem] = &[
    OperatingSystem::Windows10,
    OperatingSystem::Windows11,
    OperatingSystem::MacOS13,
    OperatingSystem::MacOS14,
    OperatingSystem::MacOS15,
    OperatingSystem::Linux,
];

/// 单个 profile 名称对应的 User-Agent 模板
#[derive(Debug, Clone)]
pub struct UserAgentTemplate {
    pub browser: BrowserType,
    pub version: String,
    /// 包含 `%s` 占位符（当 `os_required` 为 true 时由操作系统片段替换）的模板字符串
    pub template: String,
    pub is_mobile: bool,
    pub os_required: bool,
}

impl UserAgentTemplate {
    pub fn new(
        browser: BrowserType,
        version: String,
        template: String,
        is_mobile: bool,
        os_required: bool,
    ) -> Self {
        Self { browser, version, template, is_mobile, os_required }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_type_round_trips_through_str() {
        assert_eq!(BrowserType::from_str("Chrome"), Some(BrowserType::Chrome));
        assert_eq!(BrowserType::Chrome.as_str(), "chrome");
    }

    #[test]
    fn operating_systems_table_is_non_empty() {
        assert!(!OPERATING_SYSTEMS.is_empty());
    }
}
