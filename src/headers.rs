//! 标准 HTTP 请求头生成
//!
//! 生成与指定浏览器/设备类型一致的请求头集合（`Accept`、`Sec-Fetch-*`、
//! `Sec-Ch-Ua-*` 等），供 `random` 模块与 HTTP 客户端在发出请求前附加。

use crate::types::BrowserType;
use crate::utils::{extract_chrome_version, extract_platform, random_choice};

/// 全球语言环境，供 `Accept-Language` 随机取值
const LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.9",
    "fr-FR,fr;q=0.9,en;q=0.8",
    "de-DE,de;q=0.9,en;q=0.8",
    "es-ES,es;q=0.9,en;q=0.8",
    "es-MX,es;q=0.9,en;q=0.8",
    "it-IT,it;q=0.9,en;q=0.8",
    "pt-BR,pt;q=0.9,en;q=0.8",
    "pt-PT,pt;q=0.9,en;q=0.8",
    "nl-NL,nl;q=0.9,en;q=0.8",
    "pl-PL,pl;q=0.9,en;q=0.8",
    "ru-RU,ru;q=0.9,en;q=0.8",
    "uk-UA,uk;q=0.9,en;q=0.8",
    "tr-TR,tr;q=0.9,en;q=0.8",
    "el-GR,el;q=0.9,en;q=0.8",
    "cs-CZ,cs;q=0.9,en;q=0.8",
    "sv-SE,sv;q=0.9,en;q=0.8",
    "da-DK,da;q=0.9,en;q=0.8",
    "fi-FI,fi;q=0.9,en;q=0.8",
    "nb-NO,nb;q=0.9,en;q=0.8",
    "hu-HU,hu;q=0.9,en;q=0.8",
    "ro-RO,ro;q=0.9,en;q=0.8",
    "sk-SK,sk;q=0.9,en;q=0.8",
    "ja-JP,ja;q=0.9,en;q=0.8",
    "ko-KR,ko;q=0.9,en;q=0.8",
    "zh-CN,zh;q=0.9,en;q=0.8",
    "zh-TW,zh;q=0.9,en;q=0.8",
    "zh-HK,zh;q=0.9,en;q=0.8",
    "th-TH,th;q=0.9,en;q=0.8",
    "vi-VN,vi;q=0.9,en;q=0.8",
    "id-ID,id;q=0.9,en;q=0.8",
    "ms-MY,ms;q=0.9,en;q=0.8",
    "hi-IN,hi;q=0.9,en;q=0.8",
    "ar-SA,ar;q=0.9,en;q=0.8",
    "he-IL,he;q=0.9,en;q=0.8",
];

/// 随机选择一种 `Accept-Language` 取值
pub fn random_language() -> String {
    random_choice(LANGUAGES).unwrap_or("en-US,en;q=0.9").to_string()
}

/// 标准 HTTP 请求头集合
///
/// `to_map` 返回的顺序即浏览器在真实请求中发送的顺序，调用方不应再重排。
#[derive(Debug, Clone)]
pub struct HTTPHeaders {
    pub accept: String,
    pub accept_language: String,
    pub accept_encoding: String,
    pub user_agent: String,
    pub sec_ch_ua: Option<String>,
    pub sec_ch_ua_mobile: Option<String>,
    pub sec_ch_ua_platform: Option<String>,
    pub upgrade_insecure_requests: bool,
    pub sec_fetch_site: String,
    pub sec_fetch_mode: String,
    pub sec_fetch_user: Option<String>,
    pub sec_fetch_dest: String,
}

impl Default for HTTPHeaders {
    fn default() -> Self {
        Self {
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8".to_string(),
            accept_language: random_language(),
            accept_encoding: "gzip, deflate, br".to_string(),
            user_agent: String::new(),
            sec_ch_ua: None,
            sec_ch_ua_mobile: None,
            sec_ch_ua_platform: None,
            upgrade_insecure_requests: true,
            sec_fetch_site: "none".to_string(),
            sec_fetch_mode: "navigate".to_string(),
            sec_fetch_user: Some("?1".to_string()),
            sec_fetch_dest: "document".to_string(),
        }
    }
}

impl HTTPHeaders {
    /// 按浏览器发送请求时的字段顺序展开成键值对列表
    pub fn to_map(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("Accept".to_string(), self.accept.clone()),
            ("Accept-Language".to_string(), self.accept_language.clone()),
            ("Accept-Encoding".to_string(), self.accept_encoding.clone()),
        ];

        if let Some(ref value) = self.sec_ch_ua {
            pairs.push(("Sec-Ch-Ua".to_string(), value.clone()));
        }
        if let Some(ref value) = self.sec_ch_ua_mobile {
            pairs.push(("Sec-Ch-Ua-Mobile".to_string(), value.clone()));
        }
        if let Some(ref value) = self.sec_ch_ua_platform {
            pairs.push(("Sec-Ch-Ua-Platform".to_string(), value.clone()));
        }
        if self.upgrade_insecure_requests {
            pairs.push(("Upgrade-Insecure-Requests".to_string(), "1".to_string()));
        }
        pairs.push(("User-Agent".to_string(), self.user_agent.clone()));
        pairs.push(("Sec-Fetch-Site".to_string(), self.sec_fetch_site.clone()));
        pairs.push(("Sec-Fetch-Mode".to_string(), self.sec_fetch_mode.clone()));
        if let Some(ref value) = self.sec_fetch_user {
            pairs.push(("Sec-Fetch-User".to_string(), value.clone()));
        }
        pairs.push(("Sec-Fetch-Dest".to_string(), self.sec_fetch_dest.clone()));

        pairs
    }
}

/// 根据浏览器类型、User-Agent 与是否移动端生成一套标准请求头
pub fn generate_headers(browser: BrowserType, user_agent: &str, is_mobile: bool) -> HTTPHeaders {
    let mut headers = HTTPHeaders { user_agent: user_agent.to_string(), ..Default::default() };

    headers.sec_ch_ua_platform = Some(extract_platform(user_agent));
    headers.sec_ch_ua_mobile = Some(if is_mobile { "?1".to_string() } else { "?0".to_string() });

    if let BrowserType::Chrome | BrowserType::Edge | BrowserType::Opera = browser {
        let version = extract_chrome_version(user_agent);
        let major = version.split('.').next().unwrap_or(&version);
        let brand = match browser {
            BrowserType::Edge => "Microsoft Edge",
            BrowserType::Opera => "Opera",
            _ => "Google Chrome",
        };
        headers.sec_ch_ua = Some(format!(
            "\"Chromium\";v=\"{major}\", \"Not_A Brand\";v=\"8\", \"{brand}\";v=\"{major}\""
        ));
    }

    if is_mobile {
        headers.sec_fetch_dest = "document".to_string();
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_have_standard_fields_in_order() {
        let headers = HTTPHeaders::default();
        let map = headers.to_map();
        assert_eq!(map[0].0, "Accept");
        assert_eq!(map[1].0, "Accept-Language");
        assert_eq!(map[2].0, "Accept-Encoding");
    }

    #[test]
    fn generate_headers_sets_chrome_hints() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        let headers = generate_headers(BrowserType::Chrome, ua, false);
        assert!(headers.sec_ch_ua.unwrap().contains("Chromium"));
        assert_eq!(headers.sec_ch_ua_mobile.unwrap(), "?0");
    }

    #[test]
    fn random_language_returns_a_known_value() {
        let lang = random_language();
        assert!(LANGUAGES.contains(&lang.as_str()));
    }
}
