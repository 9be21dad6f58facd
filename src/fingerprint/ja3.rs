//! JA3 字符串解析
//!
//! JA3 格式：五个逗号分隔字段——TLSVersion、以短横线分隔的 Ciphers、
//! Extensions、SupportedGroups、ECPointFormats，均为十进制数字。

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ja3Components {
    pub tls_version: u16,
    pub ciphers: Vec<u16>,
    pub extensions: Vec<u16>,
    pub supported_groups: Vec<u16>,
    pub ec_point_formats: Vec<u8>,
}

fn parse_dash_list_u16(field: &str, name: &str) -> Result<Vec<u16>, EngineError> {
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split('-')
        .enumerate()
        .map(|(i, token)| {
            token.parse::<u16>().map_err(|e| EngineError::FingerprintParseError {
                field: name.to_string(),
                position: i,
                reason: format!("invalid decimal value `{token}`: {e}"),
            })
        })
        .collect()
}

fn parse_dash_list_u8(field: &str, name: &str) -> Result<Vec<u8>, EngineError> {
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split('-')
        .enumerate()
        .map(|(i, token)| {
            token.parse::<u8>().map_err(|e| EngineError::FingerprintParseError {
                field: name.to_string(),
                position: i,
                reason: format!("invalid decimal value `{token}`: {e}"),
            })
        })
        .collect()
}

/// 解析 JA3 字符串。结构不合法时返回 `FingerprintParseError`。
pub fn parse_ja3(input: &str) -> Result<Ja3Components, EngineError> {
    let fields: Vec<&str> = input.split(',').collect();
    if fields.len() != 5 {
        return Err(EngineError::FingerprintParseError {
            field: "ja3".to_string(),
            position: 0,
            reason: format!("expected 5 comma-separated fields, got {}", fields.len()),
        });
    }

    let tls_version = fields[0].parse::<u16>().map_err(|e| EngineError::FingerprintParseError {
        field: "tls_version".to_string(),
        position: 0,
        reason: format!("invalid decimal value `{}`: {e}", fields[0]),
    })?;

    Ok(Ja3Components {
        tls_version,
        ciphers: parse_dash_list_u16(fields[1], "ciphers")?,
        extensions: parse_dash_list_u16(fields[2], "extensions")?,
        supported_groups: parse_dash_list_u16(fields[3], "supported_groups")?,
        ec_point_formats: parse_dash_list_u8(fields[4], "ec_point_formats")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_ja3_string() {
        let components = parse_ja3("771,4865-4866-4867,0-23-65281-10-11,29-23-24,0").unwrap();
        assert_eq!(components.tls_version, 771);
        assert_eq!(components.ciphers, vec![4865, 4866, 4867]);
        assert_eq!(components.extensions, vec![0, 23, 65281, 10, 11]);
        assert_eq!(components.supported_groups, vec![29, 23, 24]);
        assert_eq!(components.ec_point_formats, vec![0]);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(parse_ja3("771,4865,0-23").is_err());
    }

    #[test]
    fn empty_dash_fields_parse_to_empty_lists() {
        let components = parse_ja3("771,,,,").unwrap();
        assert!(components.ciphers.is_empty());
        assert!(components.ec_point_formats.is_empty());
    }
}
