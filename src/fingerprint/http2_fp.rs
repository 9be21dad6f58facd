//! HTTP/2 指纹字符串解析
//!
//! 格式：`settings|window_update|priority|pseudo_order`
//! - settings: `k:v;k:v;...`，保持插入顺序
//! - window_update: 十进制增量，0 表示不在默认值之外发送连接级 WINDOW_UPDATE
//! - priority: `streamID:exclusive:depends:weight`，或 `0` 表示无优先级
//! - pseudo_order: `:method`/`:path`/`:authority`/`:scheme` 的排列，用 `m,p,a,s` 编码

use crate::error::EngineError;
use crate::fingerprint::transport_spec::Http2Shape;

fn pseudo_code_to_header(code: char, position: usize) -> Result<String, EngineError> {
    match code {
        'm' => Ok(":method".to_string()),
        'p' => Ok(":path".to_string()),
        'a' => Ok(":authority".to_string()),
        's' => Ok(":scheme".to_string()),
        other => Err(EngineError::FingerprintParseError {
            field: "pseudo_order".to_string(),
            position,
            reason: format!("unknown pseudo-header code `{other}`, expected one of m,p,a,s"),
        }),
    }
}

/// 解析 HTTP/2 指纹字符串为 [`Http2Shape`]
pub fn parse_http2_fingerprint(input: &str) -> Result<Http2Shape, EngineError> {
    let parts: Vec<&str> = input.split('|').collect();
    if parts.len() != 4 {
        return Err(EngineError::FingerprintParseError {
            field: "http2_fingerprint".to_string(),
            position: 0,
            reason: format!("expected 4 pipe-separated fields, got {}", parts.len()),
        });
    }
    let (settings_raw, window_update_raw, priority_raw, pseudo_order_raw) =
        (parts[0], parts[1], parts[2], parts[3]);

    let mut settings = Vec::new();
    if !settings_raw.is_empty() {
        for (i, entry) in settings_raw.split(';').enumerate() {
            let (k, v) = entry.split_once(':').ok_or_else(|| EngineError::FingerprintParseError {
                field: "settings".to_string(),
                position: i,
                reason: format!("expected `key:value`, got `{entry}`"),
            })?;
            let key = k.parse::<u16>().map_err(|e| EngineError::FingerprintParseError {
                field: "settings.key".to_string(),
                position: i,
                reason: format!("invalid setting id `{k}`: {e}"),
            })?;
            let value = v.parse::<u32>().map_err(|e| EngineError::FingerprintParseError {
                field: "settings.value".to_string(),
                position: i,
                reason: format!("invalid setting value `{v}`: {e}"),
            })?;
            settings.push((key, value));
        }
    }

    let window_update = window_update_raw.parse::<u32>().map_err(|e| {
        EngineError::FingerprintParseError {
            field: "window_update".to_string(),
            position: 0,
            reason: format!("invalid decimal value `{window_update_raw}`: {e}"),
        }
    })?;

    let priority = if priority_raw == "0" {
        None
    } else {
        let fields: Vec<&str> = priority_raw.split(':').collect();
        if fields.len() != 4 {
            return Err(EngineError::FingerprintParseError {
                field: "priority".to_string(),
                position: 0,
                reason: format!("expected `streamID:exclusive:depends:weight`, got `{priority_raw}`"),
            });
        }
        let stream_id = fields[0].parse::<u32>().map_err(|e| EngineError::FingerprintParseError {
            field: "priority.stream_id".to_string(),
            position: 0,
            reason: e.to_string(),
        })?;
        let exclusive = match fields[1] {
            "1" | "true" => true,
            "0" | "false" => false,
            other => {
                return Err(EngineError::FingerprintParseError {
                    field: "priority.exclusive".to_string(),
                    position: 1,
                    reason: format!("expected boolean flag, got `{other}`"),
                })
            }
        };
        let depends = fields[2].parse::<u32>().map_err(|e| EngineError::FingerprintParseError {
            field: "priority.depends".to_string(),
            position: 2,
            reason: e.to_string(),
        })?;
        let weight = fields[3].parse::<u8>().map_err(|e| EngineError::FingerprintParseError {
            field: "priority.weight".to_string(),
            position: 3,
            reason: e.to_string(),
        })?;
        Some((stream_id, exclusive, depends, weight))
    };

    let pseudo_header_order = pseudo_order_raw
        .split(',')
        .enumerate()
        .map(|(i, code)| {
            let ch = code.chars().next().ok_or_else(|| EngineError::FingerprintParseError {
                field: "pseudo_order".to_string(),
                position: i,
                reason: "empty pseudo-header code".to_string(),
            })?;
            pseudo_code_to_header(ch, i)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Http2Shape { settings, window_update, pseudo_header_order, priority })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_http2_fingerprint() {
        let shape = parse_http2_fingerprint("1:65536;3:1000;4:6291456|15663105|0|m,a,s,p").unwrap();
        assert_eq!(shape.settings, vec![(1, 65536), (3, 1000), (4, 6291456)]);
        assert_eq!(shape.window_update, 15663105);
        assert!(shape.priority.is_none());
        assert_eq!(shape.pseudo_header_order, vec![":method", ":authority", ":scheme", ":path"]);
    }

    #[test]
    fn parses_a_priority_field() {
        let shape = parse_http2_fingerprint("1:65536|0|3:1:0:255|m,p,a,s").unwrap();
        assert_eq!(shape.priority, Some((3, true, 0, 255)));
    }

    #[test]
    fn rejects_unknown_pseudo_header_code() {
        assert!(parse_http2_fingerprint("1:1|0|0|m,x,a,s").is_err());
    }
}
